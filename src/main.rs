use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use hgb_template::cli;
use hgb_template::error::TemplateResult;
use hgb_template::template::Variant;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hgb-template")]
#[command(about = "Generates the HGB consolidation import template (.xlsx)")]
#[command(long_about = "HGB-Konsolidierung Import-Template generator

Writes a pre-formatted workbook for collecting balance sheet, P&L, entity,
participation, inter-company, equity, currency and deferred tax data of a
group consolidation under the German commercial code (HGB).

Sheet 0 is always 'Bilanzdaten', the sheet import tooling reads first.

COMMANDS:
  build   - Write the template (default when no command is given)
  check   - Verify an existing workbook against the import contract
  schema  - Print a variant's sheet definitions as YAML

EXAMPLES:
  hgb-template                                  # templates/Konsolidierung_Muster.xlsx
  hgb-template build -o out/muster.xlsx --variant hgb
  hgb-template check templates/Konsolidierung_Muster.xlsx
  hgb-template schema --variant basic")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    build: BuildArgs,
}

#[derive(Args)]
struct BuildArgs {
    /// Output .xlsx path (parent directories are created)
    #[arg(short, long, env = "HGB_TEMPLATE_OUTPUT", default_value = cli::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Template generation to write
    #[arg(long, env = "HGB_TEMPLATE_VARIANT", value_enum, default_value_t = Variant::Extended)]
    variant: Variant,

    /// As-of date (YYYY-MM-DD) for the document properties and instructions; defaults to today
    #[arg(long, env = "HGB_TEMPLATE_AS_OF")]
    as_of: Option<NaiveDate>,

    /// Show per-sheet details and debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the template workbook
    Build(BuildArgs),

    #[command(long_about = "Verify an existing workbook.

Checks that sheet 0 is 'Bilanzdaten', that its header is the first row
without gaps and that it carries every mandatory column label. Findings are
printed as warnings; the exit code stays 0 unless the file cannot be read.")]
    /// Verify an existing workbook against the import contract
    Check {
        /// Path to the .xlsx file
        file: PathBuf,

        /// Show debug logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print a variant's sheet definitions as YAML
    Schema {
        #[arg(long, env = "HGB_TEMPLATE_VARIANT", value_enum, default_value_t = Variant::Extended)]
        variant: Variant,

        /// As-of date (YYYY-MM-DD); defaults to today
        #[arg(long, env = "HGB_TEMPLATE_AS_OF")]
        as_of: Option<NaiveDate>,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "hgb_template=debug"
    } else {
        "hgb_template=warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn main() -> TemplateResult<()> {
    let cli = Cli::parse();

    match cli.command {
        None => run_build(cli.build),

        Some(Commands::Build(args)) => run_build(args),

        Some(Commands::Check { file, verbose }) => {
            init_tracing(verbose);
            cli::check(file, verbose)
        }

        Some(Commands::Schema { variant, as_of }) => {
            init_tracing(false);
            cli::schema(variant, as_of.unwrap_or_else(today))
        }
    }
}

fn run_build(args: BuildArgs) -> TemplateResult<()> {
    init_tracing(args.verbose);
    cli::build(
        args.output,
        args.variant,
        args.as_of.unwrap_or_else(today),
        args.verbose,
    )
}
