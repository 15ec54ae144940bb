use thiserror::Error;

pub type TemplateResult<T> = Result<T, TemplateError>;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Write failure: {0}")]
    WriteFailure(#[from] std::io::Error),

    #[error("Excel write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Excel read error: {0}")]
    Read(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Formula evaluation error: {0}")]
    Eval(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
