//! Bilanzdaten and GuV-Daten

use super::{PARENT, PRIMARY_SHEET, SUBSIDIARY_1, YES_NO};
use crate::types::{ColumnSpec, SheetSpec, SummarySpec};

const ACCOUNT_TYPES: &[&str] = &["asset", "liability", "equity"];

const INCOME_TYPES: &[&str] = &[
    "revenue",
    "cost_of_sales",
    "operating_expense",
    "financial_income",
    "financial_expense",
    "income_tax",
    "net_income",
];

/// First-generation balance sheet: seven columns, Saldo entered by hand
pub fn balance_sheet_basic(position: usize) -> SheetSpec {
    SheetSpec::new(PRIMARY_SHEET, position)
        .describe("Bilanzpositionen für alle Unternehmen")
        .column(ColumnSpec::text("Unternehmen").width(25.0).required())
        .column(ColumnSpec::text("Kontonummer"))
        .column(ColumnSpec::text("Kontoname").width(30.0))
        .column(ColumnSpec::amount("Soll"))
        .column(ColumnSpec::amount("Haben"))
        .column(ColumnSpec::amount("Saldo"))
        .column(ColumnSpec::text("Bemerkung").width(40.0).optional())
        .row(cells![PARENT, "1000", "Kasse", 5000.0, 0.0, 5000.0, ""])
        .row(cells![PARENT, "1200", "Forderungen a. LL", 100000.0, 0.0, 100000.0, ""])
        .row(cells![
            PARENT,
            "1400",
            "Beteiligung TU1",
            500000.0,
            0.0,
            500000.0,
            "Beteiligung an Tochterunternehmen"
        ])
        .row(cells![SUBSIDIARY_1, "1000", "Kasse", 2000.0, 0.0, 2000.0, ""])
        .row(cells![
            SUBSIDIARY_1,
            "1600",
            "Verbindlichkeiten a. LL",
            0.0,
            50000.0,
            -50000.0,
            "Gegenpartei: Mutterunternehmen H"
        ])
        .footnote("HINWEIS: Bitte füllen Sie alle Bilanzpositionen für jedes Unternehmen aus.")
}

/// Primary import sheet with HGB position, Saldo formula and dropdowns
pub fn balance_sheet(position: usize) -> SheetSpec {
    SheetSpec::new(PRIMARY_SHEET, position)
        .describe("Bilanzpositionen für alle Unternehmen (HGB § 266)")
        .column(ColumnSpec::text("Unternehmen").width(25.0).required())
        .column(ColumnSpec::text("Kontonummer").required())
        .column(ColumnSpec::text("Kontoname").width(30.0).required())
        .column(ColumnSpec::text("HGB-Position"))
        .column(ColumnSpec::choice("Kontotyp", ACCOUNT_TYPES))
        .column(ColumnSpec::amount("Soll").required())
        .column(ColumnSpec::amount("Haben").required())
        .column(ColumnSpec::formula("Saldo", "={Soll}-{Haben}"))
        .column(ColumnSpec::choice("Zwischengesellschaft", YES_NO).width(20.0))
        .column(ColumnSpec::text("Gegenpartei").width(20.0).optional())
        .column(ColumnSpec::text("Bemerkung").width(40.0).optional())
        .row(cells![PARENT, "1000", "Kasse", "B.IV", "asset", 5000.0, 0.0, "", "Nein", "", ""])
        .row(cells![
            PARENT,
            "1200",
            "Forderungen a. LL",
            "B.II",
            "asset",
            100000.0,
            0.0,
            "",
            "Ja",
            "TU1",
            "Zwischengesellschaftsgeschäft"
        ])
        .row(cells![
            PARENT,
            "1400",
            "Beteiligung TU1",
            "A.III",
            "asset",
            500000.0,
            0.0,
            "",
            "Nein",
            "",
            "Beteiligung an Tochterunternehmen"
        ])
        .row(cells![
            PARENT,
            "3000",
            "Gezeichnetes Kapital",
            "A.I",
            "equity",
            0.0,
            1000000.0,
            "",
            "Nein",
            "",
            ""
        ])
        .row(cells![SUBSIDIARY_1, "1000", "Kasse", "B.IV", "asset", 2000.0, 0.0, "", "Nein", "", ""])
        .row(cells![
            SUBSIDIARY_1,
            "1600",
            "Verbindlichkeiten a. LL",
            "C",
            "liability",
            0.0,
            50000.0,
            "",
            "Ja",
            "Mutter H",
            "Gegenpartei: Mutterunternehmen H"
        ])
        .summary(SummarySpec::new("Summe", 2, &["Soll", "Haben", "Saldo"]))
        .freeze_header()
}

pub fn income_statement(position: usize) -> SheetSpec {
    SheetSpec::new("GuV-Daten", position)
        .describe("Gewinn- und Verlustrechnung (HGB § 275)")
        .column(ColumnSpec::text("Unternehmen").width(25.0).required())
        .column(ColumnSpec::text("Kontonummer").required())
        .column(ColumnSpec::text("Kontoname").width(30.0).required())
        .column(ColumnSpec::choice("Kontotyp", INCOME_TYPES).width(20.0))
        .column(ColumnSpec::amount("Betrag").width(18.0).required())
        .column(ColumnSpec::choice("Zwischengesellschaft", YES_NO).width(20.0))
        .column(ColumnSpec::text("Gegenpartei").width(20.0).optional())
        .column(ColumnSpec::text("Bemerkung").width(30.0).optional())
        .row(cells![PARENT, "8000", "Umsatzerlöse", "revenue", 1000000.0, "Nein", "", ""])
        .row(cells![
            PARENT,
            "8000",
            "Umsatzerlöse (an TU1)",
            "revenue",
            100000.0,
            "Ja",
            "TU1",
            "Zwischenumsatz"
        ])
        .row(cells![PARENT, "4000", "Materialaufwand", "cost_of_sales", 600000.0, "Nein", "", ""])
        .row(cells![PARENT, "6000", "Personalaufwand", "operating_expense", 200000.0, "Nein", "", ""])
        .row(cells![SUBSIDIARY_1, "8000", "Umsatzerlöse", "revenue", 500000.0, "Nein", "", ""])
        .row(cells![SUBSIDIARY_1, "4000", "Materialaufwand", "cost_of_sales", 300000.0, "Nein", "", ""])
        .row(cells![
            SUBSIDIARY_1,
            "4000",
            "Materialaufwand (von Mutter H)",
            "cost_of_sales",
            80000.0,
            "Ja",
            "Mutter H",
            "Zwischenaufwand"
        ])
        .freeze_header()
}
