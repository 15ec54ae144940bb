//! Zwischengesellschaftsgeschäfte (HGB § 303, § 305)

use super::{PARENT, SUBSIDIARY_1};
use crate::types::{ColumnSpec, SheetSpec};

const SHEET_NAME: &str = "Zwischengesellschaftsgeschäfte";
const DESCRIPTION: &str = "Für Schulden- und Zwischenergebniseliminierung (HGB § 303, § 305)";

const TRANSACTION_TYPES: &[&str] = &[
    "Forderung",
    "Verbindlichkeit",
    "Lieferung",
    "Dienstleistung",
    "Zinsen",
    "Dividenden",
];
const ELIMINATION_METHODS: &[&str] = &["Vollständig", "Teilweise", "Zeitanteilig"];
const HGB_REFERENCES: &[&str] = &["§ 303", "§ 305"];

pub fn transactions_basic(position: usize) -> SheetSpec {
    SheetSpec::new(SHEET_NAME, position)
        .describe(DESCRIPTION)
        .column(ColumnSpec::text("Von Unternehmen").width(25.0).required())
        .column(ColumnSpec::text("An Unternehmen").width(25.0).required())
        .column(ColumnSpec::text("Transaktionstyp").width(20.0))
        .column(ColumnSpec::amount("Betrag"))
        .column(ColumnSpec::text("Kontonummer"))
        .column(ColumnSpec::text("Kontoname").width(30.0))
        .column(ColumnSpec::amount("Gewinnmarge"))
        .column(ColumnSpec::text("Bemerkung").width(30.0).optional())
        .row(cells![
            PARENT,
            SUBSIDIARY_1,
            "Forderung",
            50000.0,
            "1200",
            "Forderungen a. LL",
            "",
            "Zu eliminieren"
        ])
        .row(cells![
            SUBSIDIARY_1,
            PARENT,
            "Verbindlichkeit",
            50000.0,
            "1600",
            "Verbindlichkeiten a. LL",
            "",
            "Zu eliminieren"
        ])
        .row(cells![
            PARENT,
            SUBSIDIARY_1,
            "Lieferung",
            100000.0,
            "8000",
            "Umsatzerlöse",
            20.0,
            "Zwischengewinn zu eliminieren"
        ])
}

/// Twelve columns, with a transaction id pairing both sides of a balance
pub fn transactions(position: usize) -> SheetSpec {
    SheetSpec::new(SHEET_NAME, position)
        .describe(DESCRIPTION)
        .column(ColumnSpec::text("Transaktions-ID").width(18.0).required())
        .column(ColumnSpec::text("Von Unternehmen").width(25.0).required())
        .column(ColumnSpec::text("An Unternehmen").width(25.0).required())
        .column(ColumnSpec::choice("Transaktionstyp", TRANSACTION_TYPES).width(18.0))
        .column(ColumnSpec::amount("Betrag").width(18.0))
        .column(ColumnSpec::text("Kontonummer").width(18.0))
        .column(ColumnSpec::text("Kontoname").width(25.0))
        .column(ColumnSpec::amount("Gewinnmarge").width(18.0))
        .column(ColumnSpec::choice("Eliminierungsmethode", ELIMINATION_METHODS).width(18.0))
        .column(ColumnSpec::amount("Eliminierungsbetrag").width(18.0).warning())
        .column(ColumnSpec::choice("HGB-Referenz", HGB_REFERENCES).width(18.0))
        .column(ColumnSpec::text("Bemerkung").width(30.0).optional())
        .row(cells![
            "T001",
            PARENT,
            SUBSIDIARY_1,
            "Forderung",
            50000.0,
            "1200",
            "Forderungen a. LL",
            "",
            "Vollständig",
            50000.0,
            "§ 303",
            "Zu eliminieren"
        ])
        .row(cells![
            "T001",
            SUBSIDIARY_1,
            PARENT,
            "Verbindlichkeit",
            50000.0,
            "1600",
            "Verbindlichkeiten a. LL",
            "",
            "Vollständig",
            50000.0,
            "§ 303",
            "Zu eliminieren"
        ])
        .row(cells![
            "T002",
            PARENT,
            SUBSIDIARY_1,
            "Lieferung",
            100000.0,
            "8000",
            "Umsatzerlöse",
            20.0,
            "Vollständig",
            20000.0,
            "§ 305",
            "Zwischengewinn zu eliminieren"
        ])
        .freeze_header()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_counts() {
        assert_eq!(transactions_basic(3).column_count(), 8);
        assert_eq!(transactions(4).column_count(), 12);
    }

    #[test]
    fn test_example_rows_fill_header_width() {
        for sheet in [transactions_basic(3), transactions(4)] {
            let width = sheet.column_count();
            assert!(sheet.rows.iter().all(|r| r.cells.len() == width), "{}", sheet.name);
        }
    }

    #[test]
    fn test_three_dropdowns_in_full_version() {
        let sheet = transactions(4);
        let choices = sheet.columns.iter().filter(|c| c.choices().is_some()).count();
        assert_eq!(choices, 3);
    }
}
