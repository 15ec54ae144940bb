//! Currency translation (HGB § 308a) and deferred taxes (HGB § 274, § 306)

use super::{PARENT, SUBSIDIARY_1, SUBSIDIARY_2};
use crate::types::{ColumnSpec, NumberFormat, SheetSpec, SummarySpec};

const CURRENCIES: &[&str] = &["EUR", "USD", "GBP", "CHF", "PLN", "CZK", "CNY"];
const TAX_DIRECTIONS: &[&str] = &["Aktiv", "Passiv"];

pub fn currency_translation(position: usize) -> SheetSpec {
    SheetSpec::new("Währungsumrechnung", position)
        .describe("Umrechnungskurse für Abschlüsse in fremder Währung (HGB § 308a)")
        .column(ColumnSpec::text("Unternehmen").width(25.0).required())
        .column(ColumnSpec::choice("Landeswährung", CURRENCIES).required())
        .column(ColumnSpec::date("Stichtag"))
        .column(ColumnSpec::rate("Stichtagskurs").width(16.0).required())
        .column(ColumnSpec::rate("Durchschnittskurs").width(18.0))
        .column(ColumnSpec::rate("Historischer Kurs").width(18.0))
        .column(ColumnSpec::amount("Bilanzsumme (LW)").width(18.0))
        .column(
            ColumnSpec::formula("Bilanzsumme (EUR)", "={Bilanzsumme (LW)}/{Stichtagskurs}")
                .width(18.0),
        )
        .column(ColumnSpec::text("Bemerkung").width(40.0).optional())
        .row(cells![
            PARENT,
            "EUR",
            "2025-12-31",
            1.0,
            1.0,
            1.0,
            2500000.0,
            "",
            "Konzernwährung"
        ])
        .row(cells![
            SUBSIDIARY_1,
            "EUR",
            "2025-12-31",
            1.0,
            1.0,
            1.0,
            780000.0,
            "",
            ""
        ])
        .row(cells![
            SUBSIDIARY_2,
            "USD",
            "2025-12-31",
            1.25,
            1.2,
            1.1,
            500000.0,
            "",
            "Aktiva/Passiva zum Stichtagskurs, GuV zum Durchschnittskurs, EK historisch"
        ])
        .freeze_header()
}

pub fn deferred_taxes(position: usize) -> SheetSpec {
    SheetSpec::new("Latente Steuern", position)
        .describe("Temporäre Differenzen und latente Steuern (HGB § 274, § 306)")
        .column(ColumnSpec::text("Unternehmen").width(25.0).required())
        .column(ColumnSpec::text("Position").width(30.0).required())
        .column(ColumnSpec::amount("Handelsbilanzwert").width(18.0))
        .column(ColumnSpec::amount("Steuerbilanzwert").width(18.0))
        .column(ColumnSpec::formula("Differenz", "={Handelsbilanzwert}-{Steuerbilanzwert}"))
        .column(ColumnSpec::percentage("Steuersatz"))
        .column(ColumnSpec::formula_with_format(
            "Latente Steuer",
            "={Differenz}*{Steuersatz}/100",
            NumberFormat::Amount,
        ))
        .column(ColumnSpec::choice("Art", TAX_DIRECTIONS).width(12.0))
        .column(ColumnSpec::text("Bemerkung").width(35.0).optional())
        .row(cells![PARENT, "Rückstellungen", 0.0, 20000.0, "", 30.0, "", "Aktiv", "§ 274"])
        .row(cells![SUBSIDIARY_1, "Sachanlagen", 320000.0, 300000.0, "", 30.0, "", "Passiv", "§ 274"])
        .row(cells![
            "Konzern",
            "Zwischengewinn Vorräte",
            80000.0,
            100000.0,
            "",
            30.0,
            "",
            "Aktiv",
            "§ 306, aus Zwischenergebniseliminierung"
        ])
        .summary(SummarySpec::new("Summe", 1, &["Differenz", "Latente Steuer"]))
        .freeze_header()
}
