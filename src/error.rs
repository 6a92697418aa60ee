use miette::Diagnostic;
use thiserror::Error;

/// Main error type for wmllint operations.
///
/// Content findings (bad nesting, unknown unit types, misspellings) are
/// never errors; they travel through [`crate::report::Reporter`] as advisory
/// diagnostics. This enum covers only environment failures.
#[derive(Error, Diagnostic, Debug)]
pub enum WmlError {
    #[error("IO error: {0}")]
    #[diagnostic(code(wmllint::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(wmllint::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("config error: {message}")]
    #[diagnostic(code(wmllint::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, WmlError>;
