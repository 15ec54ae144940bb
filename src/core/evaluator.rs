//! Formula evaluation over a rendered sheet
//!
//! Formulas are parsed into an AST and evaluated in `f64` against the
//! materialised grid. References to formula cells are evaluated recursively.

use super::expression::{self, CellRef, Expr};
use crate::error::{TemplateError, TemplateResult};
use crate::excel::FormulaTranslator;
use crate::types::{CellValue, RenderedSheet};

/// Guards against reference cycles
const MAX_DEPTH: usize = 64;

/// Evaluates formula cells of one sheet
pub struct Evaluator<'a> {
    sheet: &'a RenderedSheet,
}

impl<'a> Evaluator<'a> {
    pub fn new(sheet: &'a RenderedSheet) -> Self {
        Self { sheet }
    }

    /// Numeric value of the cell at a zero-based grid position
    ///
    /// Empty cells count as 0, formula cells are evaluated recursively.
    pub fn evaluate(&self, row: u32, col: u16) -> TemplateResult<f64> {
        self.value_at(row, col, 0)
    }

    fn value_at(&self, row: u32, col: u16, depth: usize) -> TemplateResult<f64> {
        if depth > MAX_DEPTH {
            return Err(TemplateError::Eval(format!(
                "Circular reference at {} in sheet '{}'",
                Self::address(row, col),
                self.sheet.name
            )));
        }

        match self.sheet.cell(row, col).map(|c| &c.value) {
            None | Some(CellValue::Empty) => Ok(0.0),
            Some(CellValue::Number(n)) => Ok(*n),
            Some(CellValue::Formula(formula)) => self.evaluate_formula(formula, depth + 1),
            Some(CellValue::Text(text)) => Err(TemplateError::Eval(format!(
                "{} in sheet '{}' holds text '{}', expected a number",
                Self::address(row, col),
                self.sheet.name,
                text
            ))),
            Some(CellValue::Date(date)) => Err(TemplateError::Eval(format!(
                "{} in sheet '{}' holds date {}, expected a number",
                Self::address(row, col),
                self.sheet.name,
                date
            ))),
        }
    }

    fn evaluate_formula(&self, formula: &str, depth: usize) -> TemplateResult<f64> {
        let expr = expression::parse(formula)?;
        let value = self.eval_expr(&expr, formula, depth)?;
        if !value.is_finite() {
            return Err(TemplateError::Eval(format!(
                "Formula '{}' has no finite result",
                formula
            )));
        }
        // Drops binary noise such as 21234567.900000002
        Ok((value * 1e6).round() / 1e6)
    }

    fn eval_expr(&self, expr: &Expr, formula: &str, depth: usize) -> TemplateResult<f64> {
        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::Cell(cell) => self.value_at(cell.row, cell.col, depth),
            Expr::Negate(inner) => Ok(-self.eval_expr(inner, formula, depth)?),
            Expr::BinaryOp { op, left, right } => {
                let left = self.eval_expr(left, formula, depth)?;
                let right = self.eval_expr(right, formula, depth)?;
                match *op {
                    '+' => Ok(left + right),
                    '-' => Ok(left - right),
                    '*' => Ok(left * right),
                    '/' if right == 0.0 => Err(TemplateError::Eval(format!(
                        "Formula '{}' divides by zero",
                        formula
                    ))),
                    '/' => Ok(left / right),
                    '^' => Ok(left.powf(right)),
                    other => Err(TemplateError::Eval(format!(
                        "Unknown operator '{}' in '{}'",
                        other, formula
                    ))),
                }
            }
            Expr::FunctionCall { name, args } => self.call(name, args, formula, depth),
            Expr::Range { .. } => Err(TemplateError::Eval(format!(
                "Range outside a function call in '{}'",
                formula
            ))),
        }
    }

    fn call(&self, name: &str, args: &[Expr], formula: &str, depth: usize) -> TemplateResult<f64> {
        let values = self.collect_args(args, formula, depth)?;
        match name {
            "SUM" => Ok(values.iter().sum()),
            "MIN" | "MAX" | "AVERAGE" if values.is_empty() => Err(TemplateError::Eval(format!(
                "{} without values in '{}'",
                name, formula
            ))),
            "MIN" => Ok(values.iter().copied().fold(f64::INFINITY, f64::min)),
            "MAX" => Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            "AVERAGE" => Ok(values.iter().sum::<f64>() / values.len() as f64),
            "ABS" if values.len() == 1 => Ok(values[0].abs()),
            _ => Err(TemplateError::Eval(format!(
                "Unsupported function {}({} argument(s)) in '{}'",
                name,
                values.len(),
                formula
            ))),
        }
    }

    /// Flatten arguments, expanding ranges column by column
    fn collect_args(&self, args: &[Expr], formula: &str, depth: usize) -> TemplateResult<Vec<f64>> {
        let mut values = Vec::new();
        for arg in args {
            match arg {
                Expr::Range { start, end } => {
                    for cell in Self::range_cells(*start, *end) {
                        values.push(self.value_at(cell.row, cell.col, depth)?);
                    }
                }
                other => values.push(self.eval_expr(other, formula, depth)?),
            }
        }
        Ok(values)
    }

    fn range_cells(start: CellRef, end: CellRef) -> Vec<CellRef> {
        (start.col..=end.col)
            .flat_map(|col| (start.row..=end.row).map(move |row| CellRef { row, col }))
            .collect()
    }

    fn address(row: u32, col: u16) -> String {
        format!(
            "{}{}",
            FormulaTranslator::column_index_to_letter(col as usize),
            row + 1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::render_sheet;
    use crate::types::{Cell, ColumnSpec, SheetSpec, SummarySpec};

    fn sheet() -> RenderedSheet {
        let spec = SheetSpec::new("Bilanzdaten", 0)
            .column(ColumnSpec::text("Kontoname"))
            .column(ColumnSpec::amount("Soll"))
            .column(ColumnSpec::amount("Haben"))
            .column(ColumnSpec::formula("Saldo", "={Soll}-{Haben}"))
            .row(vec!["Kasse".into(), 5000.0.into(), 0.0.into()])
            .row(vec!["Kapital".into(), 0.0.into(), 1000000.0.into()])
            .row(vec!["Forderungen".into(), 100000.0.into(), 250.5.into()])
            .summary(SummarySpec::new("Summe", 0, &["Soll", "Haben", "Saldo"]));
        render_sheet(&spec).unwrap()
    }

    #[test]
    fn test_row_formula_every_row() {
        let sheet = sheet();
        let eval = Evaluator::new(&sheet);
        assert_eq!(eval.evaluate(1, 3).unwrap(), 5000.0);
        assert_eq!(eval.evaluate(2, 3).unwrap(), -1000000.0);
        assert!((eval.evaluate(3, 3).unwrap() - 99749.5).abs() < 0.01);
    }

    #[test]
    fn test_summary_sums_data_range() {
        let sheet = sheet();
        let eval = Evaluator::new(&sheet);
        assert_eq!(eval.evaluate(4, 1).unwrap(), 105000.0);
        assert!((eval.evaluate(4, 2).unwrap() - 1000250.5).abs() < 0.1);
        // Total over formula cells, some negative
        assert!((eval.evaluate(4, 3).unwrap() - (-895250.5)).abs() < 0.1);
    }

    #[test]
    fn test_literal_cells_and_empty() {
        let sheet = sheet();
        let eval = Evaluator::new(&sheet);
        assert_eq!(eval.evaluate(1, 1).unwrap(), 5000.0);
        // Outside the grid counts as empty
        assert_eq!(eval.evaluate(40, 9).unwrap(), 0.0);
    }

    #[test]
    fn test_text_reference_is_error() {
        let spec = SheetSpec::new("Test", 0)
            .column(ColumnSpec::text("Soll"))
            .column(ColumnSpec::formula("Saldo", "={Soll}*2"))
            .row(vec![Cell::Text("viel".to_string())]);
        let sheet = render_sheet(&spec).unwrap();
        let eval = Evaluator::new(&sheet);
        let err = eval.evaluate(1, 1).unwrap_err();
        assert!(err.to_string().contains("viel"));
    }

    #[test]
    fn test_range_cells_column_major() {
        let cells = Evaluator::range_cells(CellRef { row: 0, col: 0 }, CellRef { row: 1, col: 1 });
        let addresses: Vec<String> = cells.iter().map(|c| Evaluator::address(c.row, c.col)).collect();
        assert_eq!(addresses, vec!["A1", "A2", "B1", "B2"]);
    }

    #[test]
    fn test_cent_amounts_stay_exact() {
        let spec = SheetSpec::new("Bilanzdaten", 0)
            .column(ColumnSpec::text("Kontoname"))
            .column(ColumnSpec::amount("Soll"))
            .column(ColumnSpec::amount("Haben"))
            .column(ColumnSpec::formula("Saldo", "={Soll}-{Haben}"))
            .row(vec!["Beteiligungen".into(), 1234567.89.into(), 0.0.into()])
            .row(vec!["Grundstücke".into(), 20000000.01.into(), 0.0.into()])
            .row(vec!["Kasse".into(), 0.1.into(), 0.2.into()])
            .summary(SummarySpec::new("Summe", 0, &["Soll", "Saldo"]));
        let sheet = render_sheet(&spec).unwrap();
        let eval = Evaluator::new(&sheet);

        assert_eq!(eval.evaluate(1, 3).unwrap(), 1234567.89);
        assert_eq!(eval.evaluate(2, 3).unwrap(), 20000000.01);
        assert_eq!(eval.evaluate(3, 3).unwrap(), -0.1);
        assert_eq!(eval.evaluate(4, 1).unwrap(), 21234568.0);
        assert_eq!(eval.evaluate(4, 3).unwrap(), 21234567.8);
    }

    #[test]
    fn test_division_by_zero_is_error() {
        let spec = SheetSpec::new("Währungsumrechnung", 0)
            .column(ColumnSpec::amount("Bilanzsumme"))
            .column(ColumnSpec::rate("Kurs"))
            .column(ColumnSpec::formula("EUR", "={Bilanzsumme}/{Kurs}"))
            .row(vec![500000.0.into(), 0.0.into()]);
        let sheet = render_sheet(&spec).unwrap();
        let err = Evaluator::new(&sheet).evaluate(1, 2).unwrap_err();
        assert!(err.to_string().contains("divides by zero"));
    }

    #[test]
    fn test_circular_reference_is_error() {
        let mut sheet = sheet();
        sheet.rows[1].cells[1].value = CellValue::Formula("=D2".to_string());
        let err = Evaluator::new(&sheet).evaluate(1, 3).unwrap_err();
        assert!(err.to_string().contains("Circular reference"));
    }

    #[test]
    fn test_unsupported_function_is_error() {
        let mut sheet = sheet();
        sheet.rows[1].cells[3].value = CellValue::Formula("=VLOOKUP(B2,C2)".to_string());
        let err = Evaluator::new(&sheet).evaluate(1, 3).unwrap_err();
        assert!(err.to_string().contains("VLOOKUP"));
    }
}
