//! Anleitung: sheet overview, steps, HGB references and colour legend

use super::{Variant, DEFAULT_TITLE, PRIMARY_SHEET};
use crate::types::{ColumnSpec, SheetSpec};
use chrono::NaiveDate;

pub const SHEET_NAME: &str = "Anleitung";

/// (sheet the step refers to, step text)
const STEPS: &[(&str, &str)] = &[
    ("Unternehmensinformationen", "Füllen Sie 'Unternehmensinformationen' aus"),
    ("Bilanzdaten", "Füllen Sie 'Bilanzdaten' für alle Unternehmen aus"),
    ("GuV-Daten", "Füllen Sie 'GuV-Daten' für alle Unternehmen aus"),
    ("Beteiligungsverhältnisse", "Definieren Sie 'Beteiligungsverhältnisse'"),
    ("Zwischengesellschaftsgeschäfte", "Erfassen Sie alle 'Zwischengesellschaftsgeschäfte'"),
    ("Eigenkapital-Aufteilung", "Prüfen Sie 'Eigenkapital-Aufteilung'"),
    ("Währungsumrechnung", "Tragen Sie die Kurse in 'Währungsumrechnung' ein"),
    ("Latente Steuern", "Erfassen Sie temporäre Differenzen in 'Latente Steuern'"),
];

const HGB_REFERENCES: &[(&str, &str)] = &[
    ("§ 266 HGB", "Bilanzgliederung"),
    ("§ 275 HGB", "Gewinn- und Verlustrechnung"),
    ("§ 301 HGB", "Kapitalkonsolidierung"),
    ("§ 303 HGB", "Schuldenkonsolidierung"),
    ("§ 305 HGB", "Zwischenergebniseliminierung"),
    ("§ 274 HGB", "Latente Steuern"),
];

const EXTENDED_REFERENCES: &[(&str, &str)] = &[
    ("§ 306 HGB", "Latente Steuern aus Konsolidierungsmaßnahmen"),
    ("§ 307 HGB", "Anteile anderer Gesellschafter"),
    ("§ 308a HGB", "Umrechnung von auf fremde Währung lautenden Abschlüssen"),
];

const LEGEND: &[(&str, &str)] = &[
    ("Blau", "Pflichtfeld"),
    ("Gelb", "Optionales Feld"),
    ("Grün", "Berechnet (Formel, nicht überschreiben)"),
    ("Orange", "Prüfen vor dem Import"),
];

/// Build the instructions sheet from the sheets that precede it
pub fn guide(position: usize, variant: Variant, as_of: NaiveDate, sheets: &[SheetSpec]) -> SheetSpec {
    let mut sheet = SheetSpec::new(SHEET_NAME, position)
        .describe("Übersicht und Anleitung")
        .banner(&format!("{} - {}", DEFAULT_TITLE, SHEET_NAME))
        .banner(&format!(
            "Version {} - Stand: {}",
            variant.version(),
            as_of.format("%Y-%m-%d")
        ))
        .column(ColumnSpec::text("Thema").width(30.0))
        .column(ColumnSpec::text("Beschreibung").width(80.0));

    sheet = sheet.section_row(cells!["ÜBERSICHT DER BLÄTTER", ""]);
    for (idx, other) in sheets.iter().enumerate() {
        sheet = sheet.row(cells![format!("{}. {}", idx + 1, other.name), other.description.as_str()]);
    }
    sheet = sheet.row(cells![format!("{}. {}", sheets.len() + 1, SHEET_NAME), "Dieses Blatt"]);

    sheet = sheet.section_row(cells!["SCHRITT-FÜR-SCHRITT-ANLEITUNG", ""]);
    let present = STEPS
        .iter()
        .filter(|(name, _)| sheets.iter().any(|s| s.name == *name));
    let mut step = 0;
    for (_, text) in present {
        step += 1;
        sheet = sheet.row(cells![format!("Schritt {}:", step), *text]);
    }
    sheet = sheet.row(cells![
        format!("Schritt {}:", step + 1),
        "Importieren Sie die Datei im System"
    ]);
    sheet = sheet.row(cells![
        "WICHTIG:",
        format!(
            "Das Blatt '{}' muss das erste Blatt bleiben; Spaltenüberschriften nicht umbenennen",
            PRIMARY_SHEET
        )
    ]);

    sheet = sheet.section_row(cells!["HGB-REFERENZEN", ""]);
    let extra: &[(&str, &str)] = if variant == Variant::Extended {
        EXTENDED_REFERENCES
    } else {
        &[]
    };
    for (paragraph, topic) in HGB_REFERENCES.iter().chain(extra) {
        sheet = sheet.row(cells![*paragraph, *topic]);
    }

    sheet = sheet.section_row(cells!["FARBLEGENDE", ""]);
    for (colour, meaning) in LEGEND {
        sheet = sheet.row(cells![*colour, *meaning]);
    }

    sheet
}
