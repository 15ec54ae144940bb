//! HGB consolidation template generator
//!
//! Builds the xlsx import template used to collect financial-statement data
//! for a multi-entity consolidation under the German commercial code (HGB).
//!
//! # Features
//!
//! - Static sheet definitions per template variant (basic, hgb, extended)
//! - Pure rendering of definitions into a materialised cell grid
//! - Row-relative formulas with cached results, dropdown validations
//! - Non-fatal verification of the position-0 import contract
//! - Atomic xlsx export and read-back checks
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use hgb_template::builder::build;
//! use hgb_template::template::{workbook_spec, Variant};
//! use std::path::Path;
//!
//! let as_of = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
//! let spec = workbook_spec(Variant::Extended, as_of);
//! let report = build(&spec, Path::new("templates/Konsolidierung_Muster.xlsx"))?;
//!
//! println!("Sheets: {}", report.sheets.len());
//! println!("Warnings: {}", report.diagnostics.len());
//! # Ok::<(), hgb_template::error::TemplateError>(())
//! ```

pub mod builder;
pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod template;
pub mod types;

// Re-export commonly used types
pub use builder::{build, check, BuildReport};
pub use crate::core::{Diagnostic, DiagnosticKind, Evaluator};
pub use error::{TemplateError, TemplateResult};
pub use template::{workbook_spec, Variant};
pub use types::{ColumnSpec, RenderedWorkbook, SheetSpec, WorkbookSpec};
