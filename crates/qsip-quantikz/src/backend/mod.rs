//! Typesetting backends.
//!
//! A [`RenderBackend`] turns a complete LaTeX document into a PDF and,
//! optionally, a PNG preview. The toolchain is a black box: it either
//! returns the artifact or fails with its log.

mod latex;

pub use latex::{BackendConfig, LatexBackend, PDFLATEX_ENV, ToolStatus, Toolchain};

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CompileResult;

/// Parameters for one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileRequest {
    /// Upper bound for each external command.
    pub timeout: Duration,
    /// Also produce a PNG preview.
    pub preview: bool,
}

impl Default for CompileRequest {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            preview: false,
        }
    }
}

/// Output of a successful compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifact {
    /// PDF bytes.
    pub pdf: Vec<u8>,
    /// PNG preview, when requested and a converter was available.
    pub png: Option<Vec<u8>>,
    /// Where the PDF was saved, if it was.
    pub saved_to: Option<PathBuf>,
}

/// A typesetting toolchain.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Compile `document` into an artifact.
    async fn compile(&self, document: &str, request: &CompileRequest) -> CompileResult<Artifact>;
}
