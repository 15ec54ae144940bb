//! Reference and overview sheets

use crate::types::{Cell, ColumnSpec, SheetSpec};

const ASSETS: &[(&str, &str)] = &[
    ("A", "Anlagevermögen"),
    ("", "I. Immaterielle Vermögensgegenstände"),
    ("", "II. Sachanlagen"),
    ("", "III. Finanzanlagen"),
    ("B", "Umlaufvermögen"),
    ("", "I. Vorräte"),
    ("", "II. Forderungen und sonstige Vermögensgegenstände"),
    ("", "III. Wertpapiere"),
    ("", "IV. Kassenbestand, Bundesbankguthaben, Guthaben bei Kreditinstituten"),
    ("C", "Rechnungsabgrenzungsposten"),
    ("D", "Aktive latente Steuern"),
    ("E", "Aktiver Unterschiedsbetrag aus der Vermögensverrechnung"),
];

const LIABILITIES: &[(&str, &str)] = &[
    ("A", "Eigenkapital"),
    ("", "I. Gezeichnetes Kapital"),
    ("", "II. Kapitalrücklage"),
    ("", "III. Gewinnrücklagen"),
    ("", "IV. Gewinnvortrag/Verlustvortrag"),
    ("", "V. Jahresüberschuss/Jahresfehlbetrag"),
    ("B", "Rückstellungen"),
    ("C", "Verbindlichkeiten"),
    ("D", "Rechnungsabgrenzungsposten"),
    ("E", "Passive latente Steuern"),
];

const ACCOUNT_RANGES: &[[&str; 4]] = &[
    ["0000-0999", "asset", "Anlagevermögen (Immaterielle Vermögensgegenstände)", "A.I"],
    ["1000-1499", "asset", "Anlagevermögen (Sachanlagen, Finanzanlagen)", "A.II, A.III"],
    ["1500-1999", "asset", "Umlaufvermögen (Vorräte, Forderungen)", "B.I, B.II"],
    ["2000-2999", "asset", "Umlaufvermögen (Wertpapiere, Kasse, Bank)", "B.III, B.IV"],
    ["3000-3999", "equity", "Eigenkapital", "A"],
    ["4000-4999", "liability", "Verbindlichkeiten", "C"],
    ["5000-5999", "liability", "Rückstellungen", "B"],
    ["6000-6999", "expense", "Aufwendungen (Material, Personal)", "GuV"],
    ["7000-7999", "expense", "Aufwendungen (Abschreibungen, Zinsen)", "GuV"],
    ["8000-8999", "revenue", "Erträge (Umsatzerlöse, sonstige Erträge)", "GuV"],
    ["9000-9999", "equity", "GuV-Abschluss", "A.V"],
];

const CONSOLIDATION_STEPS: &[&str] = &[
    "Zwischenergebniseliminierung",
    "Schuldenkonsolidierung",
    "Kapitalkonsolidierung",
    "Minderheitsanteile",
];

/// Balance sheet outline per § 266 HGB; main positions are section rows
pub fn balance_structure(position: usize) -> SheetSpec {
    let mut sheet = SheetSpec::new("HGB-Bilanzstruktur", position)
        .describe("Referenz zur HGB-Bilanzgliederung (HGB § 266)")
        .banner("HGB-Bilanzgliederung nach § 266 HGB")
        .column(ColumnSpec::text("Position").width(10.0))
        .column(ColumnSpec::text("Bezeichnung").width(60.0))
        .column(ColumnSpec::text("Seite").width(15.0));

    for (side, entries) in [("Aktivseite", ASSETS), ("Passivseite", LIABILITIES)] {
        for (pos, name) in entries {
            let cells = cells![*pos, *name, side];
            sheet = if pos.is_empty() {
                sheet.row(cells)
            } else {
                sheet.section_row(cells)
            };
        }
    }
    sheet
}

pub fn chart_of_accounts(position: usize) -> SheetSpec {
    let mut sheet = SheetSpec::new("Kontenplan-Referenz", position)
        .describe("Typische Kontonummern-Bereiche")
        .banner("Typische Kontonummern-Bereiche (SKR-Referenz)")
        .column(ColumnSpec::text("Kontonummer-Bereich").width(20.0))
        .column(ColumnSpec::text("Kontotyp"))
        .column(ColumnSpec::text("Beschreibung").width(50.0))
        .column(ColumnSpec::text("HGB-Position"));
    for range in ACCOUNT_RANGES {
        sheet = sheet.row(range.iter().map(|v| Cell::from(*v)).collect());
    }
    sheet
}

/// First-generation overview of the consolidation steps
pub fn consolidation_overview(position: usize) -> SheetSpec {
    let mut sheet = SheetSpec::new("Konsolidierungsübersicht", position)
        .describe("Übersicht über alle Konsolidierungsschritte")
        .banner("Konsolidierungsübersicht nach HGB")
        .column(ColumnSpec::text("Position").width(25.0))
        .column(ColumnSpec::amount("Betrag").width(25.0))
        .column(ColumnSpec::amount("Eliminierung").width(25.0))
        .column(ColumnSpec::text("Bemerkung").width(25.0));
    for step in CONSOLIDATION_STEPS {
        sheet = sheet
            .section_row(cells![*step, "", "", ""])
            .row(cells!["Beispiel", 0.0, 0.0, "Bitte ausfüllen"]);
    }
    sheet.footnote("HINWEIS: Dieses Blatt dient zur Übersicht über alle Konsolidierungsschritte.")
}
