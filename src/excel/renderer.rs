//! Renders sheet schemas into a materialised workbook
//!
//! `render` is pure: it reads the static `WorkbookSpec` and returns a
//! `RenderedWorkbook` holding every cell, merge and validation the exporter
//! writes. Nothing here touches the filesystem.

use super::formula_translator::{FormulaTranslator, RowFormula};
use crate::error::{TemplateError, TemplateResult};
use crate::types::{
    Cell, CellStyle, CellValue, ColumnKind, ColumnSpec, ListValidation, MergedRange,
    NumberFormat, RenderedCell, RenderedRow, RenderedSheet, RenderedWorkbook, RowAdjustment,
    RowRole, RowStyle, SheetSpec, SummarySpec, WorkbookSpec,
};
use chrono::NaiveDate;
use tracing::debug;

/// Excel's limit on worksheet name length
const MAX_SHEET_NAME_LEN: usize = 31;

/// Render every sheet in ascending position order
pub fn render(spec: &WorkbookSpec) -> TemplateResult<RenderedWorkbook> {
    let mut sheets = Vec::with_capacity(spec.sheets.len());
    for sheet in spec.ordered_sheets() {
        let rendered = render_sheet(sheet)?;
        debug!(
            sheet = %rendered.name,
            rows = rendered.rows.len(),
            columns = rendered.column_count(),
            "rendered sheet"
        );
        sheets.push(rendered);
    }

    Ok(RenderedWorkbook {
        title: spec.title.clone(),
        as_of: spec.as_of,
        primary: spec.primary.clone(),
        mandatory_headers: spec.mandatory_headers.clone(),
        sheets,
    })
}

/// Render a single sheet
pub fn render_sheet(spec: &SheetSpec) -> TemplateResult<RenderedSheet> {
    validate_sheet_name(&spec.name)?;
    if spec.columns.is_empty() {
        return Err(TemplateError::InvalidSchema(format!(
            "Sheet '{}' defines no columns",
            spec.name
        )));
    }

    let width = spec.column_count();
    let last_col = (width - 1) as u16;
    let translator = FormulaTranslator::new(&spec.labels());

    let formulas = spec
        .columns
        .iter()
        .enumerate()
        .map(|(idx, col)| match &col.kind {
            ColumnKind::Formula { template, .. } => translator.compile(template, idx).map(Some),
            _ => Ok(None),
        })
        .collect::<TemplateResult<Vec<Option<RowFormula>>>>()
        .map_err(|e| match e {
            TemplateError::InvalidSchema(msg) => {
                TemplateError::InvalidSchema(format!("Sheet '{}': {}", spec.name, msg))
            }
            other => other,
        })?;

    let mut rows: Vec<RenderedRow> = Vec::new();
    let mut merges = Vec::new();

    for line in &spec.preamble {
        let row = rows.len() as u32;
        rows.push(spanning_row(RowRole::Banner, CellStyle::Banner, line, width));
        if width > 1 {
            merges.push(MergedRange {
                row,
                first_col: 0,
                last_col,
            });
        }
    }

    let header_row = rows.len() as u32;
    rows.push(header(spec)?);

    let first_data = rows.len() as u32;
    let mut adjustments = Vec::new();
    for (example_index, example) in spec.rows.iter().enumerate() {
        if example.cells.len() != width {
            adjustments.push(RowAdjustment {
                example_index,
                declared: example.cells.len(),
                expected: width,
            });
        }

        let excel_row = rows.len() as u32 + 1;
        let cells = spec
            .columns
            .iter()
            .zip(&formulas)
            .enumerate()
            .map(|(idx, (column, formula))| {
                let raw = example.cells.get(idx).unwrap_or(&Cell::Empty);
                data_cell(column, raw, formula.as_ref(), excel_row, example.style)
            })
            .collect();
        rows.push(RenderedRow {
            role: RowRole::Data,
            cells,
        });
    }
    let data_end = rows.len() as u32;

    let validations = if data_end > first_data {
        spec.columns
            .iter()
            .enumerate()
            .filter_map(|(idx, col)| {
                col.choices().map(|values| ListValidation {
                    column: idx as u16,
                    first_row: first_data,
                    last_row: data_end - 1,
                    values: values.to_vec(),
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    if let Some(summary) = &spec.summary {
        rows.push(summary_row(spec, summary, &translator, first_data, data_end)?);
    }

    if let Some(text) = &spec.footnote {
        rows.push(RenderedRow {
            role: RowRole::Blank,
            cells: Vec::new(),
        });
        let row = rows.len() as u32;
        rows.push(spanning_row(RowRole::Footnote, CellStyle::Footnote, text, width));
        if width > 1 {
            merges.push(MergedRange {
                row,
                first_col: 0,
                last_col,
            });
        }
    }

    Ok(RenderedSheet {
        name: spec.name.clone(),
        position: spec.position,
        widths: spec.columns.iter().map(|c| c.width).collect(),
        rows,
        header_row,
        validations,
        merges,
        adjustments,
        freeze_header: spec.freeze_header,
    })
}

fn validate_sheet_name(name: &str) -> TemplateResult<()> {
    if name.trim().is_empty() {
        return Err(TemplateError::InvalidSchema(
            "Sheet name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(TemplateError::InvalidSchema(format!(
            "Sheet name '{}' exceeds {} characters",
            name, MAX_SHEET_NAME_LEN
        )));
    }
    if let Some(ch) = name.chars().find(|c| "[]:*?/\\".contains(*c)) {
        return Err(TemplateError::InvalidSchema(format!(
            "Sheet name '{}' contains invalid character '{}'",
            name, ch
        )));
    }
    Ok(())
}

fn header(spec: &SheetSpec) -> TemplateResult<RenderedRow> {
    let mut cells = Vec::with_capacity(spec.column_count());
    for (idx, column) in spec.columns.iter().enumerate() {
        if column.label.trim().is_empty() {
            return Err(TemplateError::InvalidSchema(format!(
                "Sheet '{}': column {} has an empty header label",
                spec.name,
                FormulaTranslator::column_index_to_letter(idx)
            )));
        }
        cells.push(RenderedCell::new(
            CellValue::Text(column.label.clone()),
            CellStyle::Header,
            NumberFormat::General,
        ));
    }
    Ok(RenderedRow {
        role: RowRole::Header,
        cells,
    })
}

/// A row whose text sits in column A and whose other cells are blanks of the same style
fn spanning_row(role: RowRole, style: CellStyle, text: &str, width: usize) -> RenderedRow {
    let mut cells = Vec::with_capacity(width);
    cells.push(RenderedCell::new(
        CellValue::Text(text.to_string()),
        style,
        NumberFormat::General,
    ));
    for _ in 1..width {
        cells.push(RenderedCell::new(CellValue::Empty, style, NumberFormat::General));
    }
    RenderedRow { role, cells }
}

fn data_cell(
    column: &ColumnSpec,
    raw: &Cell,
    formula: Option<&RowFormula>,
    excel_row: u32,
    row_style: RowStyle,
) -> RenderedCell {
    let style = match row_style {
        RowStyle::Section => CellStyle::Section,
        RowStyle::Normal => CellStyle::Column(column.style),
    };
    let format = column.kind.number_format();

    if let Some(formula) = formula {
        return RenderedCell::new(CellValue::Formula(formula.at_row(excel_row)), style, format);
    }

    let value = match (&column.kind, raw) {
        (_, Cell::Empty) => CellValue::Empty,
        (_, Cell::Text(s)) if s.trim().is_empty() => CellValue::Empty,
        (ColumnKind::Date, Cell::Text(s)) => match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
            Ok(date) => CellValue::Date(date),
            Err(_) => CellValue::Text(s.clone()),
        },
        (kind, Cell::Text(s)) if kind.is_numeric() => match s.trim().parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(s.clone()),
        },
        (_, Cell::Text(s)) => CellValue::Text(s.clone()),
        (_, Cell::Number(n)) => CellValue::Number(*n),
    };

    RenderedCell::new(value, style, format)
}

fn summary_row(
    spec: &SheetSpec,
    summary: &SummarySpec,
    translator: &FormulaTranslator,
    first_data: u32,
    data_end: u32,
) -> TemplateResult<RenderedRow> {
    let width = spec.column_count();
    if summary.label_column >= width {
        return Err(TemplateError::InvalidSchema(format!(
            "Sheet '{}': summary label column {} is outside the {} defined columns",
            spec.name, summary.label_column, width
        )));
    }

    let mut cells: Vec<RenderedCell> = spec
        .columns
        .iter()
        .map(|col| RenderedCell::new(CellValue::Empty, CellStyle::Summary, col.kind.number_format()))
        .collect();
    cells[summary.label_column] = RenderedCell::new(
        CellValue::Text(summary.label.clone()),
        CellStyle::Summary,
        NumberFormat::General,
    );

    for label in &summary.totals {
        let idx = translator.column_of(label).ok_or_else(|| {
            TemplateError::InvalidSchema(format!(
                "Sheet '{}': summary totals unknown column '{}'",
                spec.name, label
            ))
        })?;
        if idx == summary.label_column {
            return Err(TemplateError::InvalidSchema(format!(
                "Sheet '{}': summary label and total share column '{}'",
                spec.name, label
            )));
        }
        let value = if data_end > first_data {
            // Grid rows are zero-based; Excel rows are 1-indexed
            CellValue::Formula(FormulaTranslator::sum_range(idx, first_data + 1, data_end))
        } else {
            CellValue::Number(0.0)
        };
        cells[idx].value = value;
    }

    Ok(RenderedRow {
        role: RowRole::Summary,
        cells,
    })
}
