//! Row formula translation from column-label templates to Excel syntax

use crate::error::{TemplateError, TemplateResult};
use regex::Regex;
use std::collections::HashMap;

/// One piece of a compiled row formula
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    /// Column letter; the row number is filled in per row
    Column(String),
}

/// A row template bound to column letters, e.g. `=F{row}-G{row}`
#[derive(Debug, Clone, PartialEq)]
pub struct RowFormula {
    segments: Vec<Segment>,
}

impl RowFormula {
    /// Excel formula for a 1-indexed sheet row
    ///
    /// Example: `={Soll}-{Haben}` at row 3 → `=F3-G3`
    pub fn at_row(&self, excel_row: u32) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Column(letter) => {
                    out.push_str(letter);
                    out.push_str(&excel_row.to_string());
                }
            }
        }
        out
    }
}

/// Translates `{label}` row templates into Excel cell formulas
pub struct FormulaTranslator {
    /// Maps header labels to zero-based column indexes
    column_map: HashMap<String, usize>,
}

impl FormulaTranslator {
    /// Create a new formula translator for a sheet's header labels
    pub fn new(labels: &[String]) -> Self {
        let column_map = labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.clone(), idx))
            .collect();
        Self { column_map }
    }

    pub fn column_of(&self, label: &str) -> Option<usize> {
        self.column_map.get(label).copied()
    }

    /// Compile the template of the formula column at `column`
    ///
    /// Every `{label}` must name a column defined before `column`. Literal
    /// cell addresses are rejected so the result stays row-relative.
    pub fn compile(&self, template: &str, column: usize) -> TemplateResult<RowFormula> {
        if !template.starts_with('=') {
            return Err(TemplateError::InvalidSchema(format!(
                "Formula template '{}' must start with '='",
                template
            )));
        }

        let placeholder = Regex::new(r"\{([^{}]+)\}")
            .map_err(|e| TemplateError::InvalidSchema(format!("Regex error: {}", e)))?;

        let mut segments = Vec::new();
        let mut last_end = 0;

        for cap in placeholder.captures_iter(template) {
            let (Some(whole), Some(label)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            self.push_literal(&mut segments, &template[last_end..whole.start()])?;

            let label = label.as_str();
            let idx = self.column_of(label).ok_or_else(|| {
                TemplateError::InvalidSchema(format!(
                    "Formula '{}' references unknown column '{}'",
                    template, label
                ))
            })?;
            if idx >= column {
                return Err(TemplateError::InvalidSchema(format!(
                    "Formula '{}' references column '{}' which is not defined before it",
                    template, label
                )));
            }

            segments.push(Segment::Column(Self::column_index_to_letter(idx)));
            last_end = whole.end();
        }
        self.push_literal(&mut segments, &template[last_end..])?;

        Ok(RowFormula { segments })
    }

    fn push_literal(&self, segments: &mut Vec<Segment>, text: &str) -> TemplateResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        if text.contains('{') || text.contains('}') {
            return Err(TemplateError::InvalidSchema(format!(
                "Unbalanced placeholder in formula fragment '{}'",
                text
            )));
        }
        let address = Regex::new(r"\$?\b[A-Z]{1,3}\$?[0-9]+\b")
            .map_err(|e| TemplateError::InvalidSchema(format!("Regex error: {}", e)))?;
        if let Some(m) = address.find(text) {
            return Err(TemplateError::InvalidSchema(format!(
                "Formula fragment '{}' contains fixed cell address '{}'",
                text,
                m.as_str()
            )));
        }
        segments.push(Segment::Literal(text.to_string()));
        Ok(())
    }

    /// Total over a column's data range, 1-indexed inclusive rows
    ///
    /// Example: column 5, rows 2..=7 → `=SUM(F2:F7)`
    pub fn sum_range(column: usize, first_row: u32, last_row: u32) -> String {
        let letter = Self::column_index_to_letter(column);
        format!("=SUM({letter}{first_row}:{letter}{last_row})")
    }

    /// Convert a column index to an Excel column letter
    ///
    /// Examples:
    /// - 0 → A
    /// - 1 → B
    /// - 25 → Z
    /// - 26 → AA
    pub fn column_index_to_letter(index: usize) -> String {
        let mut result = String::new();
        let mut idx = index;

        loop {
            let remainder = idx % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if idx < 26 {
                break;
            }
            idx = idx / 26 - 1;
        }

        result
    }

    /// Convert an Excel column letter back to a zero-based index
    pub fn column_letter_to_index(letters: &str) -> Option<usize> {
        if letters.is_empty() {
            return None;
        }
        let mut idx = 0usize;
        for ch in letters.chars() {
            if !ch.is_ascii_uppercase() {
                return None;
            }
            idx = idx * 26 + (ch as usize - 'A' as usize + 1);
        }
        Some(idx - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance_labels() -> Vec<String> {
        ["Unternehmen", "Kontonummer", "Kontoname", "HGB-Position", "Kontotyp", "Soll", "Haben", "Saldo"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_column_index_to_letter() {
        assert_eq!(FormulaTranslator::column_index_to_letter(0), "A");
        assert_eq!(FormulaTranslator::column_index_to_letter(1), "B");
        assert_eq!(FormulaTranslator::column_index_to_letter(25), "Z");
        assert_eq!(FormulaTranslator::column_index_to_letter(26), "AA");
        assert_eq!(FormulaTranslator::column_index_to_letter(27), "AB");
        assert_eq!(FormulaTranslator::column_index_to_letter(701), "ZZ");
    }

    #[test]
    fn test_column_letter_round_trip() {
        for idx in [0, 7, 25, 26, 51, 701, 702] {
            let letter = FormulaTranslator::column_index_to_letter(idx);
            assert_eq!(FormulaTranslator::column_letter_to_index(&letter), Some(idx));
        }
        assert_eq!(FormulaTranslator::column_letter_to_index(""), None);
        assert_eq!(FormulaTranslator::column_letter_to_index("a"), None);
    }

    #[test]
    fn test_balance_formula_is_row_relative() {
        let translator = FormulaTranslator::new(&balance_labels());
        let formula = translator.compile("={Soll}-{Haben}", 7).unwrap();

        assert_eq!(formula.at_row(2), "=F2-G2");
        assert_eq!(formula.at_row(7), "=F7-G7");
        assert_eq!(formula.at_row(1048), "=F1048-G1048");
        assert_eq!(
            formula.segments,
            vec![
                Segment::Literal("=".to_string()),
                Segment::Column("F".to_string()),
                Segment::Literal("-".to_string()),
                Segment::Column("G".to_string()),
            ]
        );
    }

    #[test]
    fn test_literals_are_kept() {
        let labels = vec!["Anteil Mutter".to_string(), "Anteil Minderheit".to_string()];
        let translator = FormulaTranslator::new(&labels);
        let formula = translator.compile("=100-{Anteil Mutter}", 1).unwrap();
        assert_eq!(formula.at_row(3), "=100-A3");
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let translator = FormulaTranslator::new(&balance_labels());
        let err = translator.compile("={Soll}-{Kredit}", 7).unwrap_err();
        assert!(err.to_string().contains("Kredit"));
    }

    #[test]
    fn test_forward_and_self_reference_rejected() {
        let translator = FormulaTranslator::new(&balance_labels());
        assert!(translator.compile("={Saldo}+1", 7).is_err());
        assert!(translator.compile("={Haben}", 6).is_err());
    }

    #[test]
    fn test_fixed_address_rejected() {
        let translator = FormulaTranslator::new(&balance_labels());
        assert!(translator.compile("={Soll}-G2", 7).is_err());
        assert!(translator.compile("={Soll}-$G$2", 7).is_err());
    }

    #[test]
    fn test_missing_equals_rejected() {
        let translator = FormulaTranslator::new(&balance_labels());
        assert!(translator.compile("{Soll}-{Haben}", 7).is_err());
    }

    #[test]
    fn test_unbalanced_brace_rejected() {
        let translator = FormulaTranslator::new(&balance_labels());
        assert!(translator.compile("={Soll-{Haben}", 7).is_err());
    }

    #[test]
    fn test_sum_range() {
        assert_eq!(FormulaTranslator::sum_range(5, 2, 7), "=SUM(F2:F7)");
        assert_eq!(FormulaTranslator::sum_range(26, 3, 3), "=SUM(AA3:AA3)");
    }
}
