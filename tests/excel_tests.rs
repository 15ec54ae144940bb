//! Excel export and read-back tests
//!
//! Files are built into scratch directories and read back with calamine.

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDate;
use hgb_template::builder::{build, check};
use hgb_template::core::{verify_primary, DiagnosticKind, PrimarySnapshot};
use hgb_template::error::TemplateError;
use hgb_template::excel::{render, ExcelExporter, ExcelImporter, InspectedCell};
use hgb_template::template::{workbook_spec, Variant, PRIMARY_SHEET};
use hgb_template::types::{Cell, ColumnSpec, SheetSpec, SummarySpec, WorkbookSpec};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
}

fn build_variant(dir: &TempDir, variant: Variant) -> PathBuf {
    let path = dir.path().join(format!("{}.xlsx", variant));
    build(&workbook_spec(variant, as_of()), &path).unwrap();
    path
}

fn open(path: &Path) -> Xlsx<std::io::BufReader<fs::File>> {
    open_workbook(path).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// WORKBOOK LAYOUT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_sheet_order_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = build_variant(&dir, Variant::Extended);

    let workbook = open(&path);
    let names = workbook.sheet_names().to_vec();
    assert_eq!(names.len(), 11);
    assert_eq!(names[0], PRIMARY_SHEET);
    assert_eq!(names.last().map(String::as_str), Some("Anleitung"));
}

#[test]
fn test_primary_sheet_rows_header_data_summary() {
    let dir = TempDir::new().unwrap();
    let path = build_variant(&dir, Variant::Extended);

    let mut workbook = open(&path);
    let range = workbook.worksheet_range(PRIMARY_SHEET).unwrap();

    // 1 header + 6 example rows + 1 summary row
    assert_eq!(range.get_size(), (8, 11));
    assert_eq!(range.get_value((0, 0)), Some(&Data::String("Unternehmen".to_string())));
    assert_eq!(range.get_value((0, 7)), Some(&Data::String("Saldo".to_string())));
    assert_eq!(range.get_value((7, 2)), Some(&Data::String("Summe".to_string())));
}

#[test]
fn test_saldo_formulas_row_relative_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = build_variant(&dir, Variant::Hgb);

    let mut workbook = open(&path);
    let formulas = workbook.worksheet_formula(PRIMARY_SHEET).unwrap();

    for row in 1..=6u32 {
        let expected = format!("F{}-G{}", row + 1, row + 1);
        let actual = formulas.get_value((row, 7)).map(|f| f.trim_start_matches('=').to_string());
        assert_eq!(actual, Some(expected));
    }
    let total = formulas.get_value((7, 5)).map(|f| f.trim_start_matches('=').to_string());
    assert_eq!(total, Some("SUM(F2:F7)".to_string()));
}

#[test]
fn test_cached_results_match_evaluation() {
    let dir = TempDir::new().unwrap();
    let path = build_variant(&dir, Variant::Extended);

    let mut workbook = open(&path);
    let range = workbook.worksheet_range(PRIMARY_SHEET).unwrap();

    let number = |row: u32, col: u32| match range.get_value((row, col)) {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        other => panic!("expected a number at ({}, {}), got {:?}", row, col, other),
    };

    // Saldo per row is debit minus credit
    for row in 1..=6 {
        assert_eq!(number(row, 7), number(row, 5) - number(row, 6));
    }
    // Summary totals are the sums of the example rows
    assert_eq!(number(7, 5), 607000.0);
    assert_eq!(number(7, 6), 1050000.0);
    assert_eq!(number(7, 7), -443000.0);
}

#[test]
fn test_cent_amounts_cached_exactly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cent.xlsx");

    let mut spec = WorkbookSpec::new("Test", as_of(), PRIMARY_SHEET);
    spec.add_sheet(
        SheetSpec::new(PRIMARY_SHEET, 0)
            .column(ColumnSpec::text("Kontoname"))
            .column(ColumnSpec::amount("Soll"))
            .column(ColumnSpec::amount("Haben"))
            .column(ColumnSpec::formula("Saldo", "={Soll}-{Haben}"))
            .row(vec![Cell::from("Beteiligungen"), Cell::from(1234567.89), Cell::from(0.0)])
            .row(vec![Cell::from("Grundstücke"), Cell::from(20000000.01), Cell::from(0.0)])
            .summary(SummarySpec::new("Summe", 0, &["Soll", "Saldo"])),
    );
    let report = build(&spec, &path).unwrap();
    assert_eq!(
        report.primary_totals,
        vec![("Soll".to_string(), 21234567.9), ("Saldo".to_string(), 21234567.9)]
    );

    let mut workbook = open(&path);
    let range = workbook.worksheet_range(PRIMARY_SHEET).unwrap();
    assert_eq!(range.get_value((1, 3)), Some(&Data::Float(1234567.89)));
    assert_eq!(range.get_value((2, 3)), Some(&Data::Float(20000000.01)));
    assert_eq!(range.get_value((3, 1)), Some(&Data::Float(21234567.9)));
    assert_eq!(range.get_value((3, 3)), Some(&Data::Float(21234567.9)));
}

#[test]
fn test_reference_sheet_banner_precedes_header() {
    let dir = TempDir::new().unwrap();
    let path = build_variant(&dir, Variant::Hgb);

    let mut workbook = open(&path);
    let range = workbook.worksheet_range("Kontenplan-Referenz").unwrap();
    assert_eq!(
        range.get_value((0, 0)),
        Some(&Data::String("Typische Kontonummern-Bereiche (SKR-Referenz)".to_string()))
    );
    assert_eq!(
        range.get_value((1, 0)),
        Some(&Data::String("Kontonummer-Bereich".to_string()))
    );
    assert_eq!(range.get_value((2, 0)), Some(&Data::String("0000-0999".to_string())));
}

#[test]
fn test_dates_written_as_dates() {
    let dir = TempDir::new().unwrap();
    let path = build_variant(&dir, Variant::Basic);

    let mut workbook = open(&path);
    let range = workbook.worksheet_range("Unternehmensinformationen").unwrap();
    let value = range.get_value((2, 3));
    assert!(
        matches!(value, Some(Data::DateTime(_)) | Some(Data::Float(_))),
        "got {:?}",
        value
    );
    assert_eq!(range.get_value((2, 2)), Some(&Data::Float(80.0)));
}

#[test]
fn test_out_of_set_choice_value_still_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("choice.xlsx");

    let mut spec = WorkbookSpec::new("Test", as_of(), PRIMARY_SHEET);
    spec.add_sheet(
        SheetSpec::new(PRIMARY_SHEET, 0)
            .column(ColumnSpec::text("Unternehmen"))
            .column(ColumnSpec::choice("Zwischengesellschaft", &["Ja", "Nein"]))
            .row(vec![Cell::from("H"), Cell::from("Vielleicht")]),
    );
    build(&spec, &path).unwrap();

    let mut workbook = open(&path);
    let range = workbook.worksheet_range(PRIMARY_SHEET).unwrap();
    assert_eq!(range.get_value((1, 1)), Some(&Data::String("Vielleicht".to_string())));
}

// ═══════════════════════════════════════════════════════════════════════════
// CHECK / READ-BACK
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_check_fresh_file_has_no_diagnostics() {
    let dir = TempDir::new().unwrap();
    for variant in Variant::all() {
        let path = build_variant(&dir, variant);
        assert_eq!(check(&path).unwrap(), vec![], "variant {}", variant);
    }
}

#[test]
fn test_check_reports_instructions_first() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("anleitung_zuerst.xlsx");

    let mut spec = workbook_spec(Variant::Hgb, as_of());
    for sheet in &mut spec.sheets {
        sheet.position = if sheet.name == "Anleitung" { 0 } else { sheet.position + 1 };
    }
    let report = build(&spec, &path).unwrap();
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::PrimaryNotFirst));

    let diagnostics = check(&path).unwrap();
    let kinds: Vec<DiagnosticKind> = diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::PrimaryNotFirst]);
}

#[test]
fn test_check_reports_missing_mandatory_column() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ohne_haben.xlsx");

    let mut spec = WorkbookSpec::new("Test", as_of(), PRIMARY_SHEET);
    spec.add_sheet(
        SheetSpec::new(PRIMARY_SHEET, 0)
            .column(ColumnSpec::text("Unternehmen"))
            .column(ColumnSpec::text("Kontonummer"))
            .column(ColumnSpec::text("Kontoname"))
            .column(ColumnSpec::amount("Soll")),
    );
    build(&spec, &path).unwrap();

    let diagnostics = check(&path).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingMandatoryColumn);
    assert!(diagnostics[0].message.contains("Haben"));
}

#[test]
fn test_importer_reads_values_and_formulas() {
    let dir = TempDir::new().unwrap();
    let path = build_variant(&dir, Variant::Extended);

    let workbook = ExcelImporter::new(&path).inspect().unwrap();
    let sheet = workbook.sheet(PRIMARY_SHEET).unwrap();

    assert_eq!(sheet.cell(1, 2), &InspectedCell::Text("Kasse".to_string()));
    assert_eq!(sheet.cell(1, 5).as_number(), Some(5000.0));
    assert_eq!(sheet.formula(1, 7), Some("=F2-G2".to_string()));
    assert_eq!(sheet.populated_width(0), 11);
}

#[test]
fn test_ragged_header_detected_from_snapshot() {
    let snapshot = PrimarySnapshot {
        sheet_names: vec![PRIMARY_SHEET.to_string()],
        header_row: Some(2),
        header: vec![Some("Unternehmen".to_string()), None, Some("Soll".to_string())],
        row_widths: vec![(3, 5)],
    };
    let kinds: Vec<DiagnosticKind> = verify_primary(&snapshot, PRIMARY_SHEET, &["Unternehmen".to_string()])
        .into_iter()
        .map(|d| d.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::HeaderNotFirstRow,
            DiagnosticKind::HeaderGap,
            DiagnosticKind::RaggedRow,
        ]
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// FAILURES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_unwritable_output_leaves_no_file() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("templates");
    fs::write(&blocker, b"kein Verzeichnis").unwrap();
    let path = blocker.join("Konsolidierung_Muster.xlsx");

    let result = build(&workbook_spec(Variant::Extended, as_of()), &path);

    assert!(matches!(result, Err(TemplateError::WriteFailure(_))));
    assert!(!path.exists());
    assert_eq!(fs::read(&blocker).unwrap(), b"kein Verzeichnis");
}

#[test]
fn test_invalid_formula_aborts_before_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kaputt.xlsx");

    let mut spec = WorkbookSpec::new("Test", as_of(), PRIMARY_SHEET);
    spec.add_sheet(
        SheetSpec::new(PRIMARY_SHEET, 0)
            .column(ColumnSpec::amount("Soll"))
            .column(ColumnSpec::formula("Saldo", "={Soll}-{Kredit}")),
    );

    let result = build(&spec, &path);
    assert!(matches!(result, Err(TemplateError::InvalidSchema(_))));
    assert!(!path.exists());
}

#[test]
fn test_rebuild_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("muster.xlsx");
    fs::write(&path, b"alt").unwrap();

    let rendered = render(&workbook_spec(Variant::Basic, as_of())).unwrap();
    ExcelExporter::new(&rendered).export(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn test_check_unreadable_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kein.xlsx");
    fs::write(&path, b"not a zip").unwrap();

    assert!(matches!(check(&path), Err(TemplateError::Read(_))));
}
