//! Error types for the quantikz crate.

use std::path::PathBuf;

use qsip_ir::SemanticError;
use qsip_qasm::ParseError;
use thiserror::Error;

/// Invalid translation options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum OptionsError {
    /// Saving was requested without saying where.
    #[error("save_artifact requires a filename")]
    MissingFilename,

    /// A value that is not a TeX dimension such as `2pt` or `1.5mm`.
    #[error("Invalid TeX length for {option}: {value:?}")]
    InvalidLength { option: &'static str, value: String },

    /// Zero timeout for the backend.
    #[error("Timeout must be at least one second")]
    ZeroTimeout,
}

/// Failures of the external typesetting toolchain.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The program could not be started.
    #[error("{program} not found; install a TeX distribution or set QSIP_PDFLATEX")]
    ToolNotFound { program: String },

    /// The program ran and reported failure.
    #[error("LaTeX compilation failed (exit status {status:?}):\n{log}")]
    Failed { status: Option<i32>, log: String },

    /// The program did not finish in time.
    #[error("{program} timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    /// The program exited successfully but produced no output file.
    #[error("Expected output {0} was not produced")]
    MissingOutput(PathBuf),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for backend operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Any error of the translation pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranslateError {
    /// The source text is not well-formed.
    #[error("Syntax error: {0}")]
    Syntax(#[from] ParseError),

    /// The source is well-formed but cannot be drawn.
    #[error("Semantic error: {0}")]
    Semantic(#[from] SemanticError),

    /// The options are inconsistent.
    #[error("Invalid options: {0}")]
    Options(#[from] OptionsError),

    /// The backend failed. The LaTeX text is still valid.
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
}

/// Result type for the translation pipeline.
pub type TranslateResult<T> = Result<T, TranslateError>;
