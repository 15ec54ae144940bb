//! Formula evaluation and workbook verification

pub mod evaluator;
pub mod expression;
pub mod verifier;

pub use evaluator::Evaluator;
pub use verifier::{verify, verify_primary, Diagnostic, DiagnosticKind, PrimarySnapshot};
