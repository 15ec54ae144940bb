use crate::builder::{self, BuildReport};
use crate::core::Diagnostic;
use crate::error::TemplateResult;
use crate::template::{workbook_spec, Variant};
use chrono::NaiveDate;
use colored::Colorize;
use std::path::PathBuf;

/// Default output path, relative to the working directory
pub const DEFAULT_OUTPUT: &str = "templates/Konsolidierung_Muster.xlsx";

/// Format an amount for display with two decimal places
fn format_number(n: f64) -> String {
    let rounded = (n * 1e6).round() / 1e6;
    format!("{:.2}", rounded)
}

/// Execute the build command
pub fn build(output: PathBuf, variant: Variant, as_of: NaiveDate, verbose: bool) -> TemplateResult<()> {
    println!("{}", "📊 HGB Template - Building workbook".bold().green());
    println!("   Variant: {} (Version {})", variant.to_string().bright_yellow().bold(), variant.version());
    println!("   As of:   {}", as_of);
    println!("   Output:  {}\n", output.display());

    let spec = workbook_spec(variant, as_of);
    let report = builder::build(&spec, &output)?;

    if verbose {
        print_sheets(&report);
    }

    report_diagnostics(&report.diagnostics);

    println!("{}", "✅ Template written!".bold().green());
    println!("   Excel file: {}", report.path.display());
    println!("   Sheets:     {}", report.sheets.len());
    for (label, value) in &report.primary_totals {
        println!("   {:<10} {}", format!("{}:", label), format_number(*value).bright_blue());
    }
    println!();

    Ok(())
}

/// Execute the check command
pub fn check(file: PathBuf, verbose: bool) -> TemplateResult<()> {
    println!("{}", "🔍 HGB Template - Checking workbook".bold().green());
    println!("   File: {}\n", file.display());

    let diagnostics = builder::check(&file)?;

    if verbose {
        println!("{}", "📖 Primary sheet contract: position 0, dense header, mandatory labels".cyan());
    }

    report_diagnostics(&diagnostics);
    if diagnostics.is_empty() {
        println!("{}", "✅ Workbook matches the import contract".bold().green());
    }
    println!();

    Ok(())
}

/// Execute the schema command
pub fn schema(variant: Variant, as_of: NaiveDate) -> TemplateResult<()> {
    let spec = workbook_spec(variant, as_of);
    print!("{}", serde_yaml::to_string(&spec)?);
    Ok(())
}

/// Print verification findings; they never change the exit code
pub fn report_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    println!(
        "{}",
        format!("⚠️  {} warning(s) found:", diagnostics.len()).bold().yellow()
    );
    for diagnostic in diagnostics {
        println!("   {}", diagnostic.to_string().yellow());
    }
    println!();
}

fn print_sheets(report: &BuildReport) {
    println!("{}", "📋 Sheets:".cyan());
    for sheet in &report.sheets {
        println!(
            "   {:>2}. {:<32} {:>2} columns  {:>2} rows  {} dropdown(s)",
            sheet.position + 1,
            sheet.name.bold(),
            sheet.columns,
            sheet.data_rows,
            sheet.validations
        );
    }
    println!();
}
