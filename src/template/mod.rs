//! Static sheet definitions for each template variant
//!
//! Every variant is a list of `SheetSpec` values; there is one sheet builder
//! and no per-version code path. Bilanzdaten is the primary import sheet and
//! always sits at position 0.

use crate::types::{SheetSpec, WorkbookSpec};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// `cells!["Kasse", 5000.0, ""]` → `vec![Cell::from("Kasse"), ...]`
macro_rules! cells {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::types::Cell::from($value)),*]
    };
}

mod balance;
mod group;
mod instructions;
mod intercompany;
mod reference;
mod valuation;

/// Name of the sheet downstream import tooling reads from position 0
pub const PRIMARY_SHEET: &str = "Bilanzdaten";

/// Header labels the importer looks up on the primary sheet
pub const MANDATORY_HEADERS: &[&str] = &["Unternehmen", "Kontonummer", "Kontoname", "Soll", "Haben"];

pub const DEFAULT_TITLE: &str = "HGB-Konsolidierung Import-Template";

pub(crate) const PARENT: &str = "Mutterunternehmen H";
pub(crate) const SUBSIDIARY_1: &str = "Tochterunternehmen TU1";
pub(crate) const SUBSIDIARY_2: &str = "Tochterunternehmen TU2";

pub(crate) const YES_NO: &[&str] = &["Ja", "Nein"];

/// Template generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Six sheets, static balances
    Basic,
    /// Adds P&L, reference sheets, formulas and dropdowns
    Hgb,
    /// Adds currency translation and deferred taxes
    #[default]
    Extended,
}

impl Variant {
    pub fn version(&self) -> &'static str {
        match self {
            Variant::Basic => "1.0",
            Variant::Hgb => "2.0",
            Variant::Extended => "3.0",
        }
    }

    pub fn all() -> [Variant; 3] {
        [Variant::Basic, Variant::Hgb, Variant::Extended]
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variant::Basic => "basic",
            Variant::Hgb => "hgb",
            Variant::Extended => "extended",
        };
        write!(f, "{}", name)
    }
}

/// Assemble the workbook definition of a variant
pub fn workbook_spec(variant: Variant, as_of: NaiveDate) -> WorkbookSpec {
    let sheets: Vec<SheetSpec> = match variant {
        Variant::Basic => vec![
            balance::balance_sheet_basic(0),
            group::companies(1),
            group::participations(2),
            intercompany::transactions_basic(3),
            group::equity_split(4, false),
            reference::consolidation_overview(5),
        ],
        Variant::Hgb | Variant::Extended => {
            let extended = variant == Variant::Extended;
            let mut sheets = vec![
                balance::balance_sheet(0),
                balance::income_statement(1),
                group::companies(2),
                group::participations(3),
                intercompany::transactions(4),
                group::equity_split(5, extended),
            ];
            if extended {
                let next = sheets.len();
                sheets.push(valuation::currency_translation(next));
                sheets.push(valuation::deferred_taxes(next + 1));
            }
            let next = sheets.len();
            sheets.push(reference::balance_structure(next));
            sheets.push(reference::chart_of_accounts(next + 1));

            let guide = instructions::guide(sheets.len(), variant, as_of, &sheets);
            sheets.push(guide);
            sheets
        }
    };

    let mut spec = WorkbookSpec::new(
        &format!("{} (Version {})", DEFAULT_TITLE, variant.version()),
        as_of,
        PRIMARY_SHEET,
    )
    .mandatory(MANDATORY_HEADERS);
    for sheet in sheets {
        spec.add_sheet(sheet);
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
    }

    #[test]
    fn test_primary_sheet_first_in_every_variant() {
        for variant in Variant::all() {
            let spec = workbook_spec(variant, as_of());
            let first = spec.ordered_sheets()[0];
            assert_eq!(first.name, PRIMARY_SHEET, "variant {}", variant);
            assert_eq!(first.position, 0);
        }
    }

    #[test]
    fn test_positions_are_sequential() {
        for variant in Variant::all() {
            let spec = workbook_spec(variant, as_of());
            let positions: Vec<usize> = spec.sheets.iter().map(|s| s.position).collect();
            let expected: Vec<usize> = (0..spec.sheets.len()).collect();
            assert_eq!(positions, expected, "variant {}", variant);
        }
    }

    #[test]
    fn test_sheet_counts() {
        assert_eq!(workbook_spec(Variant::Basic, as_of()).sheets.len(), 6);
        assert_eq!(workbook_spec(Variant::Hgb, as_of()).sheets.len(), 9);
        assert_eq!(workbook_spec(Variant::Extended, as_of()).sheets.len(), 11);
    }

    #[test]
    fn test_instructions_sheet_goes_last() {
        for variant in [Variant::Hgb, Variant::Extended] {
            let spec = workbook_spec(variant, as_of());
            let last = spec.ordered_sheets().last().map(|s| s.name.clone());
            assert_eq!(last.as_deref(), Some("Anleitung"));
        }
    }

    #[test]
    fn test_variant_display_and_default() {
        assert_eq!(Variant::default(), Variant::Extended);
        assert_eq!(Variant::Hgb.to_string(), "hgb");
        assert_eq!(Variant::Basic.version(), "1.0");
    }

    #[test]
    fn test_title_carries_version() {
        let spec = workbook_spec(Variant::Hgb, as_of());
        assert!(spec.title.ends_with("(Version 2.0)"));
    }
}
