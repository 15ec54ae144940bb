//! Group structure: entities, participations, equity split

use super::{PARENT, SUBSIDIARY_1, SUBSIDIARY_2};
use crate::types::{Cell, ColumnSpec, NumberFormat, SheetSpec};

const ENTITY_TYPES: &[&str] = &[
    "Mutterunternehmen (H)",
    "Tochterunternehmen (TU)",
    "Gemeinschaftsunternehmen (GU)",
    "Assoziiertes Unternehmen (AU)",
];

pub fn companies(position: usize) -> SheetSpec {
    SheetSpec::new("Unternehmensinformationen", position)
        .describe("Basis-Informationen zu allen Unternehmen")
        .column(ColumnSpec::text("Unternehmensname").width(25.0).required())
        .column(ColumnSpec::choice("Typ", ENTITY_TYPES).width(25.0).required())
        .column(ColumnSpec::percentage("Beteiligungs-%"))
        .column(ColumnSpec::date("Erwerbsdatum"))
        .column(ColumnSpec::amount("Anschaffungskosten").width(18.0))
        .column(ColumnSpec::text("Bemerkung").width(40.0).optional())
        .row(cells![PARENT, "Mutterunternehmen (H)", 100.0, "", "", "Hauptunternehmen"])
        .row(cells![
            SUBSIDIARY_1,
            "Tochterunternehmen (TU)",
            80.0,
            "2020-01-15",
            500000.0,
            "80% Beteiligung"
        ])
        .row(cells![
            SUBSIDIARY_2,
            "Tochterunternehmen (TU)",
            60.0,
            "2021-06-01",
            300000.0,
            "60% Beteiligung"
        ])
}

pub fn participations(position: usize) -> SheetSpec {
    SheetSpec::new("Beteiligungsverhältnisse", position)
        .describe("Für Kapitalkonsolidierung (HGB § 301)")
        .column(ColumnSpec::text("Mutterunternehmen").width(25.0).required())
        .column(ColumnSpec::text("Tochterunternehmen").width(25.0).required())
        .column(ColumnSpec::percentage("Beteiligungs-%").required())
        .column(ColumnSpec::amount("Anschaffungskosten").width(18.0))
        .column(ColumnSpec::date("Erwerbsdatum"))
        .column(ColumnSpec::amount("Beteiligungsbuchwert").width(18.0))
        .column(ColumnSpec::text("Bemerkung").width(30.0).optional())
        .row(cells![
            PARENT,
            SUBSIDIARY_1,
            80.0,
            500000.0,
            "2020-01-15",
            500000.0,
            "Nach HGB § 301"
        ])
        .row(cells![
            PARENT,
            SUBSIDIARY_2,
            60.0,
            300000.0,
            "2021-06-01",
            300000.0,
            "Nach HGB § 301"
        ])
}

/// Equity components per entity
///
/// With `with_formulas` the total and the minority share are derived; the
/// example values for those columns are then ignored.
pub fn equity_split(position: usize, with_formulas: bool) -> SheetSpec {
    let total = if with_formulas {
        ColumnSpec::formula(
            "Gesamt Eigenkapital",
            "={Gezeichnetes Kapital}+{Kapitalrücklagen}+{Gewinnrücklagen}+{Jahresüberschuss}",
        )
    } else {
        ColumnSpec::amount("Gesamt Eigenkapital")
    };
    let minority = if with_formulas {
        ColumnSpec::formula_with_format("Anteil Minderheit", "=100-{Anteil Mutter}", NumberFormat::Percentage)
    } else {
        ColumnSpec::percentage("Anteil Minderheit")
    };

    let mut sheet = SheetSpec::new("Eigenkapital-Aufteilung", position)
        .describe("Für Minderheitsanteile (HGB § 307)")
        .column(ColumnSpec::text("Unternehmen").width(25.0).required());
    for label in ["Gezeichnetes Kapital", "Kapitalrücklagen", "Gewinnrücklagen", "Jahresüberschuss"] {
        sheet = sheet.column(ColumnSpec::amount(label).width(18.0));
    }
    sheet = sheet
        .column(total.width(18.0))
        .column(ColumnSpec::percentage("Anteil Mutter").width(18.0))
        .column(minority.width(18.0));

    let rows: [Vec<Cell>; 2] = [
        cells![PARENT, 1000000.0, 200000.0, 300000.0, 150000.0, 1650000.0, 100.0, 0.0],
        cells![SUBSIDIARY_1, 500000.0, 100000.0, 80000.0, 50000.0, 730000.0, 80.0, 20.0],
    ];
    for row in rows {
        sheet = sheet.row(row);
    }
    sheet
}
