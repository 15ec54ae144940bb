//! Template build pipeline: render, verify, export

use crate::core::{verify, verify_primary, Diagnostic, Evaluator};
use crate::error::TemplateResult;
use crate::excel::{render, ExcelExporter, ExcelImporter};
use crate::template::{MANDATORY_HEADERS, PRIMARY_SHEET};
use crate::types::{CellValue, RenderedSheet, RowRole, WorkbookSpec};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Per-sheet line of a build report
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSummary {
    pub name: String,
    pub position: usize,
    pub columns: usize,
    pub data_rows: usize,
    pub validations: usize,
}

impl SheetSummary {
    fn from_rendered(sheet: &RenderedSheet) -> Self {
        Self {
            name: sheet.name.clone(),
            position: sheet.position,
            columns: sheet.column_count(),
            data_rows: sheet.data_row_count(),
            validations: sheet.validations.len(),
        }
    }
}

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub path: PathBuf,
    pub sheets: Vec<SheetSummary>,
    /// Verification findings; the file was written regardless
    pub diagnostics: Vec<Diagnostic>,
    /// (column label, value) of each total on the primary sheet's summary row
    pub primary_totals: Vec<(String, f64)>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Build the workbook described by `spec` and write it to `output`
///
/// Schema errors abort before anything is written. Verification findings
/// are logged and returned in the report but never stop the write.
pub fn build(spec: &WorkbookSpec, output: &Path) -> TemplateResult<BuildReport> {
    let rendered = render(spec)?;

    let diagnostics = verify(&rendered);
    for diagnostic in &diagnostics {
        warn!(code = diagnostic.kind.code(), "{}", diagnostic);
    }

    ExcelExporter::new(&rendered).export(output)?;
    info!(
        path = %output.display(),
        sheets = rendered.sheets.len(),
        diagnostics = diagnostics.len(),
        "template written"
    );

    let primary_totals = rendered
        .primary_sheet()
        .map(summary_totals)
        .unwrap_or_default();

    Ok(BuildReport {
        path: output.to_path_buf(),
        sheets: rendered.sheets.iter().map(SheetSummary::from_rendered).collect(),
        diagnostics,
        primary_totals,
    })
}

/// Re-run the primary sheet checks against a file on disk
pub fn check(path: &Path) -> TemplateResult<Vec<Diagnostic>> {
    let workbook = ExcelImporter::new(path).inspect()?;
    let mandatory: Vec<String> = MANDATORY_HEADERS.iter().map(|h| h.to_string()).collect();
    let snapshot = workbook.snapshot(PRIMARY_SHEET, &mandatory);

    let diagnostics = verify_primary(&snapshot, PRIMARY_SHEET, &mandatory);
    for diagnostic in &diagnostics {
        warn!(code = diagnostic.kind.code(), "{}", diagnostic);
    }
    info!(path = %path.display(), sheets = workbook.sheets.len(), "workbook checked");
    Ok(diagnostics)
}

fn summary_totals(sheet: &RenderedSheet) -> Vec<(String, f64)> {
    let Some(row) = sheet.row_indexes(RowRole::Summary).first().copied() else {
        return Vec::new();
    };
    let evaluator = Evaluator::new(sheet);
    let labels = sheet.header_labels();

    sheet.rows[row as usize]
        .cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| matches!(cell.value, CellValue::Formula(_) | CellValue::Number(_)))
        .filter_map(|(col, _)| {
            let label = labels.get(col).cloned().flatten()?;
            let value = evaluator.evaluate(row, col as u16).ok()?;
            Some((label, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DiagnosticKind;
    use crate::template::{workbook_spec, Variant};
    use crate::types::{ColumnSpec, SheetSpec};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
    }

    #[test]
    fn test_build_default_variant() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("templates").join("Konsolidierung_Muster.xlsx");

        let report = build(&workbook_spec(Variant::Extended, as_of()), &output).unwrap();

        assert!(output.exists());
        assert!(report.is_clean(), "{:?}", report.diagnostics);
        assert_eq!(report.sheets[0].name, PRIMARY_SHEET);
        assert_eq!(report.sheets[0].data_rows, 6);
        assert_eq!(report.sheets.len(), 11);
    }

    #[test]
    fn test_primary_totals() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("muster.xlsx");

        let report = build(&workbook_spec(Variant::Hgb, as_of()), &output).unwrap();
        assert_eq!(
            report.primary_totals,
            vec![
                ("Soll".to_string(), 607000.0),
                ("Haben".to_string(), 1050000.0),
                ("Saldo".to_string(), -443000.0),
            ]
        );
    }

    #[test]
    fn test_warnings_do_not_stop_build() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("muster.xlsx");

        let mut spec = WorkbookSpec::new("Test", as_of(), PRIMARY_SHEET);
        spec.add_sheet(SheetSpec::new("Anleitung", 0).column(ColumnSpec::text("Thema")));
        spec.add_sheet(SheetSpec::new(PRIMARY_SHEET, 1).column(ColumnSpec::text("Unternehmen")));

        let report = build(&spec, &output).unwrap();
        assert!(output.exists());
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::PrimaryNotFirst));
    }

    #[test]
    fn test_check_fresh_build_is_clean() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("muster.xlsx");
        for variant in Variant::all() {
            build(&workbook_spec(variant, as_of()), &output).unwrap();
            let diagnostics = check(&output).unwrap();
            assert!(diagnostics.is_empty(), "{}: {:?}", variant, diagnostics);
        }
    }
}
