use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//==============================================================================
// Column Schema
//==============================================================================

/// Display format applied to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    General,
    /// Currency amount with thousands separator
    Amount,
    /// Percentage points (80.00 means 80%)
    Percentage,
    /// Exchange rate, four decimals
    Rate,
    Date,
}

impl NumberFormat {
    /// Excel number format pattern, `None` for the General format
    pub fn pattern(&self) -> Option<&'static str> {
        match self {
            NumberFormat::General => None,
            NumberFormat::Amount => Some("#,##0.00"),
            NumberFormat::Percentage => Some("0.00\"%\""),
            NumberFormat::Rate => Some("0.0000"),
            NumberFormat::Date => Some("yyyy-mm-dd"),
        }
    }
}

/// Semantic kind of a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Amount,
    Percentage,
    Rate,
    Date,
    /// Row formula such as `={Soll}-{Haben}`; `{label}` names a column of the same row
    Formula {
        template: String,
        format: NumberFormat,
    },
    /// Closed set of allowed values, offered as a dropdown
    Choice { values: Vec<String> },
}

impl ColumnKind {
    pub fn number_format(&self) -> NumberFormat {
        match self {
            ColumnKind::Text | ColumnKind::Choice { .. } => NumberFormat::General,
            ColumnKind::Amount => NumberFormat::Amount,
            ColumnKind::Percentage => NumberFormat::Percentage,
            ColumnKind::Rate => NumberFormat::Rate,
            ColumnKind::Date => NumberFormat::Date,
            ColumnKind::Formula { format, .. } => *format,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnKind::Amount | ColumnKind::Percentage | ColumnKind::Rate
        )
    }
}

/// Fill category of a column's data cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleTag {
    Required,
    Optional,
    Calculated,
    Warning,
    Plain,
}

/// Static definition of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub label: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
    pub width: f64,
    pub style: StyleTag,
}

impl ColumnSpec {
    pub fn new(label: &str, kind: ColumnKind) -> Self {
        let style = match kind {
            ColumnKind::Formula { .. } => StyleTag::Calculated,
            _ => StyleTag::Plain,
        };
        Self {
            label: label.to_string(),
            kind,
            width: 15.0,
            style,
        }
    }

    pub fn text(label: &str) -> Self {
        Self::new(label, ColumnKind::Text)
    }

    pub fn amount(label: &str) -> Self {
        Self::new(label, ColumnKind::Amount)
    }

    pub fn percentage(label: &str) -> Self {
        Self::new(label, ColumnKind::Percentage)
    }

    pub fn rate(label: &str) -> Self {
        Self::new(label, ColumnKind::Rate)
    }

    pub fn date(label: &str) -> Self {
        Self::new(label, ColumnKind::Date)
    }

    pub fn choice(label: &str, values: &[&str]) -> Self {
        Self::new(
            label,
            ColumnKind::Choice {
                values: values.iter().map(|v| v.to_string()).collect(),
            },
        )
    }

    /// Amount-formatted row formula
    pub fn formula(label: &str, template: &str) -> Self {
        Self::formula_with_format(label, template, NumberFormat::Amount)
    }

    pub fn formula_with_format(label: &str, template: &str, format: NumberFormat) -> Self {
        Self::new(
            label,
            ColumnKind::Formula {
                template: template.to_string(),
                format,
            },
        )
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn required(mut self) -> Self {
        self.style = StyleTag::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.style = StyleTag::Optional;
        self
    }

    pub fn warning(mut self) -> Self {
        self.style = StyleTag::Warning;
        self
    }

    /// Allowed values of a choice column
    pub fn choices(&self) -> Option<&[String]> {
        match &self.kind {
            ColumnKind::Choice { values } => Some(values),
            _ => None,
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self.kind, ColumnKind::Formula { .. })
    }
}

//==============================================================================
// Example Rows
//==============================================================================

/// A literal cell of an example row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::from(value.as_str())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStyle {
    #[default]
    Normal,
    /// Emphasised outline row (e.g. a main HGB position)
    Section,
}

impl RowStyle {
    fn is_normal(&self) -> bool {
        *self == RowStyle::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleRow {
    pub cells: Vec<Cell>,
    #[serde(default, skip_serializing_if = "RowStyle::is_normal")]
    pub style: RowStyle,
}

impl ExampleRow {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            style: RowStyle::Normal,
        }
    }

    pub fn section(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            style: RowStyle::Section,
        }
    }
}

/// Total row appended after the data rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySpec {
    pub label: String,
    /// Column index receiving the label
    pub label_column: usize,
    /// Labels of the columns to total
    pub totals: Vec<String>,
}

impl SummarySpec {
    pub fn new(label: &str, label_column: usize, totals: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            label_column,
            totals: totals.iter().map(|t| t.to_string()).collect(),
        }
    }
}

//==============================================================================
// Sheet & Workbook Schema
//==============================================================================

/// Static definition of one sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSpec {
    pub name: String,
    pub position: usize,
    pub description: String,
    /// Banner lines written above the header, each merged across the sheet
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preamble: Vec<String>,
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub rows: Vec<ExampleRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummarySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footnote: Option<String>,
    #[serde(default)]
    pub freeze_header: bool,
}

impl SheetSpec {
    pub fn new(name: &str, position: usize) -> Self {
        Self {
            name: name.to_string(),
            position,
            description: String::new(),
            preamble: Vec::new(),
            columns: Vec::new(),
            rows: Vec::new(),
            summary: None,
            footnote: None,
            freeze_header: false,
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn banner(mut self, line: &str) -> Self {
        self.preamble.push(line.to_string());
        self
    }

    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    pub fn row(mut self, cells: Vec<Cell>) -> Self {
        self.rows.push(ExampleRow::new(cells));
        self
    }

    pub fn section_row(mut self, cells: Vec<Cell>) -> Self {
        self.rows.push(ExampleRow::section(cells));
        self
    }

    pub fn summary(mut self, summary: SummarySpec) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn footnote(mut self, text: &str) -> Self {
        self.footnote = Some(text.to_string());
        self
    }

    pub fn freeze_header(mut self) -> Self {
        self.freeze_header = true;
        self
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.clone()).collect()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.label == label)
    }
}

/// Ordered collection of sheets making up one template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookSpec {
    pub title: String,
    pub as_of: NaiveDate,
    /// Name of the sheet downstream tooling reads by position 0
    pub primary: String,
    /// Header labels the primary sheet must contain
    pub mandatory_headers: Vec<String>,
    pub sheets: Vec<SheetSpec>,
}

impl WorkbookSpec {
    pub fn new(title: &str, as_of: NaiveDate, primary: &str) -> Self {
        Self {
            title: title.to_string(),
            as_of,
            primary: primary.to_string(),
            mandatory_headers: Vec::new(),
            sheets: Vec::new(),
        }
    }

    pub fn mandatory(mut self, labels: &[&str]) -> Self {
        self.mandatory_headers = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn add_sheet(&mut self, sheet: SheetSpec) {
        self.sheets.push(sheet);
    }

    /// Sheets in ascending position order (stable for equal positions)
    pub fn ordered_sheets(&self) -> Vec<&SheetSpec> {
        let mut sheets: Vec<&SheetSpec> = self.sheets.iter().collect();
        sheets.sort_by_key(|s| s.position);
        sheets
    }

    pub fn get_sheet(&self, name: &str) -> Option<&SheetSpec> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

//==============================================================================
// Rendered Workbook
//==============================================================================

/// What a materialised row is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRole {
    Banner,
    Header,
    Data,
    Summary,
    Blank,
    Footnote,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// Excel formula including the leading `=`
    Formula(String),
}

/// Visual style of a materialised cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStyle {
    Banner,
    Header,
    Section,
    Summary,
    Footnote,
    Column(StyleTag),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCell {
    pub value: CellValue,
    pub style: CellStyle,
    pub format: NumberFormat,
}

impl RenderedCell {
    pub fn new(value: CellValue, style: CellStyle, format: NumberFormat) -> Self {
        Self {
            value,
            style,
            format,
        }
    }

    pub fn formula(&self) -> Option<&str> {
        match &self.value {
            CellValue::Formula(f) => Some(f),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub role: RowRole,
    pub cells: Vec<RenderedCell>,
}

/// Dropdown list over a column of the data range (zero-based, inclusive rows)
#[derive(Debug, Clone, PartialEq)]
pub struct ListValidation {
    pub column: u16,
    pub first_row: u32,
    pub last_row: u32,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedRange {
    pub row: u32,
    pub first_col: u16,
    pub last_col: u16,
}

/// An example row that had to be padded or truncated to the header width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowAdjustment {
    pub example_index: usize,
    pub declared: usize,
    pub expected: usize,
}

/// Fully materialised sheet, ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSheet {
    pub name: String,
    pub position: usize,
    pub widths: Vec<f64>,
    pub rows: Vec<RenderedRow>,
    /// Zero-based index of the header row
    pub header_row: u32,
    pub validations: Vec<ListValidation>,
    pub merges: Vec<MergedRange>,
    pub adjustments: Vec<RowAdjustment>,
    pub freeze_header: bool,
}

impl RenderedSheet {
    pub fn column_count(&self) -> usize {
        self.widths.len()
    }

    pub fn header(&self) -> Option<&RenderedRow> {
        self.rows.get(self.header_row as usize)
    }

    pub fn header_labels(&self) -> Vec<Option<String>> {
        self.header()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|cell| match &cell.value {
                        CellValue::Text(s) if !s.trim().is_empty() => Some(s.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Zero-based indexes of the rows with the given role
    pub fn row_indexes(&self, role: RowRole) -> Vec<u32> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.role == role)
            .map(|(idx, _)| idx as u32)
            .collect()
    }

    pub fn data_row_count(&self) -> usize {
        self.rows.iter().filter(|r| r.role == RowRole::Data).count()
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&RenderedCell> {
        self.rows
            .get(row as usize)
            .and_then(|r| r.cells.get(col as usize))
    }

    pub fn column_index(&self, label: &str) -> Option<u16> {
        self.header_labels()
            .iter()
            .position(|l| l.as_deref() == Some(label))
            .map(|idx| idx as u16)
    }

    pub fn is_merged(&self, row: u32) -> bool {
        self.merges.iter().any(|m| m.row == row)
    }
}

/// The whole template in materialised form
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedWorkbook {
    pub title: String,
    pub as_of: NaiveDate,
    pub primary: String,
    pub mandatory_headers: Vec<String>,
    /// Sheets in output order
    pub sheets: Vec<RenderedSheet>,
}

impl RenderedWorkbook {
    pub fn sheet(&self, name: &str) -> Option<&RenderedSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn primary_sheet(&self) -> Option<&RenderedSheet> {
        self.sheet(&self.primary)
    }
}
