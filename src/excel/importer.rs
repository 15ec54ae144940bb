//! Excel importer implementation - reads a generated .xlsx back for inspection

use crate::core::PrimarySnapshot;
use crate::error::{TemplateError, TemplateResult};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::path::{Path, PathBuf};

/// A cell value as read from disk
#[derive(Debug, Clone, PartialEq)]
pub enum InspectedCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Dates, durations and error values, in their display form
    Other(String),
}

impl InspectedCell {
    pub fn is_empty(&self) -> bool {
        match self {
            InspectedCell::Empty => true,
            InspectedCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InspectedCell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            InspectedCell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&Data> for InspectedCell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => InspectedCell::Empty,
            Data::String(s) => InspectedCell::Text(s.clone()),
            Data::Float(f) => InspectedCell::Number(*f),
            Data::Int(i) => InspectedCell::Number(*i as f64),
            Data::Bool(b) => InspectedCell::Bool(*b),
            other => InspectedCell::Other(other.to_string()),
        }
    }
}

/// One worksheet, as a dense grid anchored at A1
#[derive(Debug, Clone, PartialEq)]
pub struct InspectedSheet {
    pub name: String,
    pub cells: Vec<Vec<InspectedCell>>,
    /// Formula text per cell, without the leading `=`; empty when none
    pub formulas: Vec<Vec<String>>,
}

impl InspectedSheet {
    pub fn cell(&self, row: usize, col: usize) -> &InspectedCell {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&InspectedCell::Empty)
    }

    /// Formula at a position with its `=` restored
    pub fn formula(&self, row: usize, col: usize) -> Option<String> {
        self.formulas
            .get(row)
            .and_then(|r| r.get(col))
            .filter(|f| !f.is_empty())
            .map(|f| {
                if f.starts_with('=') {
                    f.clone()
                } else {
                    format!("={}", f)
                }
            })
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of cells up to and including the last populated one
    pub fn populated_width(&self, row: usize) -> usize {
        let values = self
            .cells
            .get(row)
            .and_then(|r| r.iter().rposition(|c| !c.is_empty()))
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let formulas = self
            .formulas
            .get(row)
            .and_then(|r| r.iter().rposition(|f| !f.is_empty()))
            .map(|idx| idx + 1)
            .unwrap_or(0);
        values.max(formulas)
    }

    fn is_blank_row(&self, row: usize) -> bool {
        self.populated_width(row) == 0
    }

    /// Header row: the first row naming one of `labels`, else the first populated row
    pub fn header_row(&self, labels: &[String]) -> Option<usize> {
        let named = (0..self.row_count()).find(|&row| {
            self.cells[row]
                .iter()
                .filter_map(InspectedCell::as_text)
                .any(|text| labels.iter().any(|l| l == text.trim()))
        });
        named.or_else(|| (0..self.row_count()).find(|&row| !self.is_blank_row(row)))
    }

    pub fn header_labels(&self, row: usize) -> Vec<Option<String>> {
        let width = self.populated_width(row);
        (0..width)
            .map(|col| match self.cell(row, col) {
                InspectedCell::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                InspectedCell::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()
    }
}

/// A workbook read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct InspectedWorkbook {
    pub sheets: Vec<InspectedSheet>,
}

impl InspectedWorkbook {
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&InspectedSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Reduce the primary sheet to what the position-0 checks need
    pub fn snapshot(&self, primary: &str, mandatory: &[String]) -> PrimarySnapshot {
        let sheet_names = self.sheet_names();
        let Some(sheet) = self.sheet(primary) else {
            return PrimarySnapshot {
                sheet_names,
                ..Default::default()
            };
        };
        let Some(header_row) = sheet.header_row(mandatory) else {
            return PrimarySnapshot {
                sheet_names,
                ..Default::default()
            };
        };

        let row_widths = ((header_row + 1)..sheet.row_count())
            .filter(|&row| !sheet.is_blank_row(row))
            .map(|row| (row as u32, sheet.populated_width(row)))
            .collect();

        PrimarySnapshot {
            sheet_names,
            header_row: Some(header_row as u32),
            header: sheet.header_labels(header_row),
            row_widths,
        }
    }
}

/// Reads `.xlsx` files with calamine
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    /// Create a new Excel importer
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read every sheet in workbook order
    pub fn inspect(&self) -> TemplateResult<InspectedWorkbook> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| {
            TemplateError::Read(format!(
                "Failed to open Excel file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        let sheet_names = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(sheet_names.len());

        for name in sheet_names {
            let range = workbook.worksheet_range(&name).map_err(|e| {
                TemplateError::Read(format!("Failed to read sheet '{}': {}", name, e))
            })?;
            // Missing formula data is not fatal, the values are still usable
            let formula_range = workbook.worksheet_formula(&name).ok();

            sheets.push(InspectedSheet {
                cells: Self::value_grid(&range),
                formulas: formula_range
                    .as_ref()
                    .map(Self::formula_grid)
                    .unwrap_or_default(),
                name,
            });
        }

        Ok(InspectedWorkbook { sheets })
    }

    fn value_grid(range: &Range<Data>) -> Vec<Vec<InspectedCell>> {
        let Some((last_row, last_col)) = range.end() else {
            return Vec::new();
        };
        (0..=last_row)
            .map(|row| {
                (0..=last_col)
                    .map(|col| {
                        range
                            .get_value((row, col))
                            .map(InspectedCell::from)
                            .unwrap_or(InspectedCell::Empty)
                    })
                    .collect()
            })
            .collect()
    }

    fn formula_grid(range: &Range<String>) -> Vec<Vec<String>> {
        let Some((last_row, last_col)) = range.end() else {
            return Vec::new();
        };
        (0..=last_row)
            .map(|row| {
                (0..=last_col)
                    .map(|col| range.get_value((row, col)).cloned().unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, rows: Vec<Vec<&str>>) -> InspectedSheet {
        InspectedSheet {
            name: name.to_string(),
            cells: rows
                .iter()
                .map(|r| {
                    r.iter()
                        .map(|v| {
                            if v.is_empty() {
                                InspectedCell::Empty
                            } else {
                                InspectedCell::Text(v.to_string())
                            }
                        })
                        .collect()
                })
                .collect(),
            formulas: Vec::new(),
        }
    }

    fn mandatory() -> Vec<String> {
        vec!["Unternehmen".to_string(), "Soll".to_string()]
    }

    #[test]
    fn test_populated_width_ignores_trailing_empty() {
        let s = sheet("X", vec![vec!["a", "b", "", ""]]);
        assert_eq!(s.populated_width(0), 2);
        assert_eq!(s.populated_width(7), 0);
    }

    #[test]
    fn test_header_row_skips_banner() {
        let s = sheet(
            "Bilanzdaten",
            vec![vec!["Bilanzdaten Import", "", ""], vec![], vec!["Unternehmen", "Soll", "Haben"]],
        );
        assert_eq!(s.header_row(&mandatory()), Some(2));
    }

    #[test]
    fn test_snapshot_of_primary_sheet() {
        let workbook = InspectedWorkbook {
            sheets: vec![
                sheet("Anleitung", vec![vec!["Schritt"]]),
                sheet(
                    "Bilanzdaten",
                    vec![
                        vec!["Unternehmen", "", "Soll"],
                        vec!["MU", "x", "1", "extra"],
                        vec![],
                        vec!["TU"],
                    ],
                ),
            ],
        };

        let snapshot = workbook.snapshot("Bilanzdaten", &mandatory());
        assert_eq!(snapshot.sheet_names, vec!["Anleitung", "Bilanzdaten"]);
        assert_eq!(snapshot.header_row, Some(0));
        assert_eq!(
            snapshot.header,
            vec![Some("Unternehmen".to_string()), None, Some("Soll".to_string())]
        );
        assert_eq!(snapshot.row_widths, vec![(1, 4), (3, 1)]);
    }

    #[test]
    fn test_snapshot_without_primary() {
        let workbook = InspectedWorkbook {
            sheets: vec![sheet("Anleitung", vec![vec!["Schritt"]])],
        };
        let snapshot = workbook.snapshot("Bilanzdaten", &mandatory());
        assert_eq!(snapshot.header_row, None);
        assert!(snapshot.header.is_empty());
    }

    #[test]
    fn test_formula_gets_equals_restored() {
        let mut s = sheet("X", vec![vec!["1", "2"]]);
        s.formulas = vec![vec![String::new(), "A1*2".to_string()]];
        assert_eq!(s.formula(0, 1), Some("=A1*2".to_string()));
        assert_eq!(s.formula(0, 0), None);
    }

    #[test]
    fn test_open_missing_file_is_read_error() {
        let err = ExcelImporter::new("/definitely/not/here.xlsx")
            .inspect()
            .unwrap_err();
        assert!(matches!(err, TemplateError::Read(_)));
    }
}
