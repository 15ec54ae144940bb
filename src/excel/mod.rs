//! Excel rendering, export and read-back
//!
//! - Render: `WorkbookSpec` → `RenderedWorkbook`, a pure cell grid
//! - Export: `RenderedWorkbook` → .xlsx with formats, formulas and dropdowns
//! - Import: .xlsx → `InspectedWorkbook` for post-write checks

mod exporter;
mod formula_translator;
mod importer;
mod renderer;

pub use exporter::ExcelExporter;
pub use formula_translator::{FormulaTranslator, RowFormula};
pub use importer::{ExcelImporter, InspectedCell, InspectedSheet, InspectedWorkbook};
pub use renderer::{render, render_sheet};
