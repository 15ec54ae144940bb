//! Post-build verification
//!
//! Every check produces `Diagnostic` records. None of them abort a build:
//! a usable file is preferred over a strict failure, and the caller decides
//! how to report what was found.

use super::evaluator::Evaluator;
use crate::excel::FormulaTranslator;
use crate::types::{CellValue, RenderedWorkbook, RowRole};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Sheet 0 is not the designated primary import sheet
    PrimaryNotFirst,
    /// The designated primary sheet does not exist
    PrimaryMissing,
    /// The primary sheet's header is not its first row
    HeaderNotFirstRow,
    /// Empty header cell between the first and last label
    HeaderGap,
    MissingMandatoryColumn,
    DuplicateSheetName,
    /// Data row wider or narrower than the header
    RaggedRow,
    /// Example row padded or truncated during rendering
    RowAdjusted,
    FormulaUnresolved,
}

impl DiagnosticKind {
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::PrimaryNotFirst => "primary-not-first",
            DiagnosticKind::PrimaryMissing => "primary-missing",
            DiagnosticKind::HeaderNotFirstRow => "header-not-first-row",
            DiagnosticKind::HeaderGap => "header-gap",
            DiagnosticKind::MissingMandatoryColumn => "missing-mandatory-column",
            DiagnosticKind::DuplicateSheetName => "duplicate-sheet-name",
            DiagnosticKind::RaggedRow => "ragged-row",
            DiagnosticKind::RowAdjusted => "row-adjusted",
            DiagnosticKind::FormulaUnresolved => "formula-unresolved",
        }
    }
}

/// A non-fatal verification finding
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub sheet: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, sheet: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            sheet: sheet.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(sheet) => write!(f, "[{}] {}: {}", self.kind.code(), sheet, self.message),
            None => write!(f, "[{}] {}", self.kind.code(), self.message),
        }
    }
}

/// What the position-0 contract needs to know about a workbook
///
/// Built from a rendered workbook or from a file read back from disk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrimarySnapshot {
    /// Sheet names in workbook order
    pub sheet_names: Vec<String>,
    /// Zero-based row holding the primary header, if the sheet exists
    pub header_row: Option<u32>,
    pub header: Vec<Option<String>>,
    /// (zero-based row, populated width) for each data row of the primary sheet
    pub row_widths: Vec<(u32, usize)>,
}

impl PrimarySnapshot {
    pub fn from_rendered(workbook: &RenderedWorkbook) -> Self {
        let sheet_names = workbook.sheet_names();
        match workbook.primary_sheet() {
            Some(sheet) => Self {
                sheet_names,
                header_row: Some(sheet.header_row),
                header: sheet.header_labels(),
                row_widths: sheet
                    .row_indexes(RowRole::Data)
                    .into_iter()
                    .map(|idx| (idx, sheet.rows[idx as usize].cells.len()))
                    .collect(),
            },
            None => Self {
                sheet_names,
                ..Default::default()
            },
        }
    }
}

/// Check the position-0 contract downstream import tooling relies on
pub fn verify_primary(
    snapshot: &PrimarySnapshot,
    primary: &str,
    mandatory: &[String],
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if !snapshot.sheet_names.iter().any(|n| n == primary) {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::PrimaryMissing,
            None,
            format!("Primary import sheet '{}' not found", primary),
        ));
        return diagnostics;
    }

    match snapshot.sheet_names.first() {
        Some(first) if first == primary => {}
        Some(first) => diagnostics.push(Diagnostic::new(
            DiagnosticKind::PrimaryNotFirst,
            Some(primary),
            format!(
                "Sheet at position 0 is '{}', expected the primary import sheet '{}'",
                first, primary
            ),
        )),
        None => {}
    }

    if let Some(row) = snapshot.header_row {
        if row != 0 {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::HeaderNotFirstRow,
                Some(primary),
                format!("Header found in row {}, expected row 1", row + 1),
            ));
        }
    }

    let last_label = snapshot.header.iter().rposition(|l| l.is_some());
    if let Some(last) = last_label {
        for (idx, label) in snapshot.header[..=last].iter().enumerate() {
            if label.is_none() {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::HeaderGap,
                    Some(primary),
                    format!(
                        "Header cell {}{} is empty",
                        FormulaTranslator::column_index_to_letter(idx),
                        snapshot.header_row.unwrap_or(0) + 1
                    ),
                ));
            }
        }
    }

    for label in mandatory {
        if !snapshot.header.iter().any(|h| h.as_deref() == Some(label.as_str())) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingMandatoryColumn,
                Some(primary),
                format!("Mandatory column '{}' missing from header", label),
            ));
        }
    }

    let header_width = last_label.map(|l| l + 1).unwrap_or(0);
    for (row, width) in &snapshot.row_widths {
        if *width > header_width {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::RaggedRow,
                Some(primary),
                format!(
                    "Row {} has {} cells, header has {}",
                    row + 1,
                    width,
                    header_width
                ),
            ));
        }
    }

    diagnostics
}

/// Full verification pass over a rendered workbook
pub fn verify(workbook: &RenderedWorkbook) -> Vec<Diagnostic> {
    let snapshot = PrimarySnapshot::from_rendered(workbook);
    let mut diagnostics = verify_primary(&snapshot, &workbook.primary, &workbook.mandatory_headers);

    let mut seen = HashSet::new();
    for sheet in &workbook.sheets {
        if !seen.insert(sheet.name.as_str()) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::DuplicateSheetName,
                Some(&sheet.name),
                "Sheet name used more than once",
            ));
        }
    }

    for sheet in &workbook.sheets {
        let header_width = sheet.header().map(|h| h.cells.len()).unwrap_or(0);
        for idx in sheet.row_indexes(RowRole::Data) {
            let width = sheet.rows[idx as usize].cells.len();
            if width != header_width {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::RaggedRow,
                    Some(&sheet.name),
                    format!("Row {} has {} cells, header has {}", idx + 1, width, header_width),
                ));
            }
        }

        for adjustment in &sheet.adjustments {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::RowAdjusted,
                Some(&sheet.name),
                format!(
                    "Example row {} declared {} cells, {} expected; {}",
                    adjustment.example_index + 1,
                    adjustment.declared,
                    adjustment.expected,
                    if adjustment.declared < adjustment.expected {
                        "padded with empty cells"
                    } else {
                        "truncated"
                    }
                ),
            ));
        }

        let evaluator = Evaluator::new(sheet);
        for (row_idx, row) in sheet.rows.iter().enumerate() {
            for (col_idx, cell) in row.cells.iter().enumerate() {
                if let CellValue::Formula(formula) = &cell.value {
                    if let Err(e) = evaluator.evaluate(row_idx as u32, col_idx as u16) {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::FormulaUnresolved,
                            Some(&sheet.name),
                            format!(
                                "{}{} '{}': {}",
                                FormulaTranslator::column_index_to_letter(col_idx),
                                row_idx + 1,
                                formula,
                                e
                            ),
                        ));
                    }
                }
            }
        }
    }

    diagnostics
}
