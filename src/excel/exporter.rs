//! Excel exporter implementation

use crate::core::Evaluator;
use crate::error::{TemplateError, TemplateResult};
use crate::types::{
    CellStyle, CellValue, NumberFormat, RenderedSheet, RenderedWorkbook, StyleTag,
};
use chrono::Datelike;
use rust_xlsxwriter::{
    Color, DataValidation, DocProperties, ExcelDateTime, Format, FormatAlign, FormatBorder,
    Formula, Workbook, Worksheet,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const HEADER_FILL: u32 = 0x366092;
const SECTION_FILL: u32 = 0xD9E1F2;
const REQUIRED_FILL: u32 = 0xE7F3FF;
const OPTIONAL_FILL: u32 = 0xFFF9E6;
const CALCULATED_FILL: u32 = 0xE2EFDA;
const WARNING_FILL: u32 = 0xFCE4D6;
const FOOTNOTE_FONT: u32 = 0xFF0000;

/// Serializes a rendered workbook to .xlsx
pub struct ExcelExporter<'a> {
    workbook: &'a RenderedWorkbook,
}

impl<'a> ExcelExporter<'a> {
    /// Create a new Excel exporter
    pub fn new(workbook: &'a RenderedWorkbook) -> Self {
        Self { workbook }
    }

    /// Export to an .xlsx file, creating parent directories
    ///
    /// Bytes go to a temporary sibling first and are renamed into place, so a
    /// failed write never leaves a partial file at `output_path`.
    pub fn export(&self, output_path: &Path) -> TemplateResult<()> {
        let bytes = self.to_buffer()?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = Self::temp_path(output_path);
        if let Err(e) = fs::write(&temp_path, &bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, output_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        Ok(())
    }

    /// Build the complete .xlsx file in memory
    pub fn to_buffer(&self) -> TemplateResult<Vec<u8>> {
        let mut seen = HashSet::new();
        for sheet in &self.workbook.sheets {
            if !seen.insert(sheet.name.to_lowercase()) {
                return Err(TemplateError::InvalidSchema(format!(
                    "Sheet name '{}' is used more than once",
                    sheet.name
                )));
            }
        }

        let mut workbook = Workbook::new();
        workbook.set_properties(&self.properties()?);

        for sheet in &self.workbook.sheets {
            self.export_sheet(&mut workbook, sheet)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    fn properties(&self) -> TemplateResult<DocProperties> {
        let created = Self::excel_date(self.workbook.as_of)?;
        Ok(DocProperties::new()
            .set_title(&self.workbook.title)
            .set_subject("Konsolidierung nach HGB")
            .set_author("hgb-template")
            .set_keywords("HGB, Konsolidierung, Import-Template")
            .set_creation_datetime(&created))
    }

    /// Export a single rendered sheet to a worksheet
    fn export_sheet(&self, workbook: &mut Workbook, sheet: &RenderedSheet) -> TemplateResult<()> {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (col, width) in sheet.widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }

        let evaluator = Evaluator::new(sheet);

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_num = row_idx as u32;

            if let Some(merge) = sheet.merges.iter().find(|m| m.row == row_num) {
                if let Some(first) = row.cells.first() {
                    let text = match &first.value {
                        CellValue::Text(s) => s.as_str(),
                        _ => "",
                    };
                    worksheet.merge_range(
                        row_num,
                        merge.first_col,
                        row_num,
                        merge.last_col,
                        text,
                        &Self::cell_format(first.style, first.format),
                    )?;
                }
                continue;
            }

            for (col_idx, cell) in row.cells.iter().enumerate() {
                let col = col_idx as u16;
                let format = Self::cell_format(cell.style, cell.format);
                match &cell.value {
                    CellValue::Empty => {
                        worksheet.write_blank(row_num, col, &format)?;
                    }
                    CellValue::Text(text) => {
                        worksheet.write_string_with_format(row_num, col, text, &format)?;
                    }
                    CellValue::Number(value) => {
                        worksheet.write_number_with_format(row_num, col, *value, &format)?;
                    }
                    CellValue::Date(date) => {
                        let datetime = Self::excel_date(*date)?;
                        worksheet.write_datetime_with_format(row_num, col, &datetime, &format)?;
                    }
                    CellValue::Formula(expr) => {
                        let mut formula = Formula::new(expr);
                        // Cached result for readers that do not recalculate
                        if let Ok(value) = evaluator.evaluate(row_num, col) {
                            formula = formula.set_result(format_number(value));
                        }
                        worksheet.write_formula_with_format(row_num, col, formula, &format)?;
                    }
                }
            }
        }

        Self::add_validations(worksheet, sheet)?;

        if sheet.freeze_header {
            worksheet.set_freeze_panes(sheet.header_row + 1, 0)?;
        }

        Ok(())
    }

    fn add_validations(worksheet: &mut Worksheet, sheet: &RenderedSheet) -> TemplateResult<()> {
        for validation in &sheet.validations {
            let values: Vec<&str> = validation.values.iter().map(String::as_str).collect();
            let rule = DataValidation::new()
                .allow_list_strings(&values)?
                .set_error_title("Ungültiger Wert")?
                .set_error_message("Bitte einen Wert aus der Liste wählen.")?;
            worksheet.add_data_validation(
                validation.first_row,
                validation.column,
                validation.last_row,
                validation.column,
                &rule,
            )?;
        }
        Ok(())
    }

    fn cell_format(style: CellStyle, number_format: NumberFormat) -> Format {
        let mut format = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::VerticalCenter);

        format = match style {
            CellStyle::Banner => Format::new()
                .set_bold()
                .set_font_size(14)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            CellStyle::Header => format
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_align(FormatAlign::Center)
                .set_text_wrap(),
            CellStyle::Section => format
                .set_bold()
                .set_background_color(Color::RGB(SECTION_FILL)),
            CellStyle::Summary => format
                .set_bold()
                .set_border_top(FormatBorder::Double),
            CellStyle::Footnote => Format::new()
                .set_italic()
                .set_font_color(Color::RGB(FOOTNOTE_FONT)),
            CellStyle::Column(StyleTag::Required) => {
                format.set_background_color(Color::RGB(REQUIRED_FILL))
            }
            CellStyle::Column(StyleTag::Optional) => {
                format.set_background_color(Color::RGB(OPTIONAL_FILL))
            }
            CellStyle::Column(StyleTag::Calculated) => format
                .set_background_color(Color::RGB(CALCULATED_FILL))
                .set_italic(),
            CellStyle::Column(StyleTag::Warning) => {
                format.set_background_color(Color::RGB(WARNING_FILL))
            }
            CellStyle::Column(StyleTag::Plain) => format,
        };

        if let Some(pattern) = number_format.pattern() {
            format = format.set_num_format(pattern);
            if number_format != NumberFormat::Date {
                format = format.set_align(FormatAlign::Right);
            }
        }

        format
    }

    fn excel_date(date: chrono::NaiveDate) -> TemplateResult<ExcelDateTime> {
        let year = u16::try_from(date.year())
            .map_err(|_| TemplateError::InvalidSchema(format!("Date {} out of range", date)))?;
        Ok(ExcelDateTime::from_ymd(year, date.month() as u8, date.day() as u8)?)
    }

    fn temp_path(output_path: &Path) -> PathBuf {
        let file_name = output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workbook.xlsx".to_string());
        output_path.with_file_name(format!(".{}.tmp", file_name))
    }
}

/// Format a number for a cached formula result, without trailing zeros
fn format_number(n: f64) -> String {
    let rounded = (n * 1e6).round() / 1e6;
    format!("{:.6}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
