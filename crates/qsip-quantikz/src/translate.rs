//! End-to-end pipeline: source text to LaTeX, and LaTeX to artifact.

use qsip_ir::{Circuit, Warning};
use qsip_qasm::Lowered;
use tracing::{info, warn};

use crate::backend::{Artifact, CompileRequest, RenderBackend};
use crate::document::standalone;
use crate::error::{CompileError, TranslateResult};
use crate::layout::{Grid, layout};
use crate::options::TranslateOptions;
use crate::render::render;

/// A translated circuit.
#[derive(Debug, Clone)]
pub struct Translation {
    /// The quantikz environment.
    pub latex: String,
    /// `latex` wrapped in a standalone document.
    pub document: String,
    /// Non-fatal diagnostics from building and rendering.
    pub warnings: Vec<Warning>,
    pub circuit: Circuit,
    pub grid: Grid,
}

/// What [`run`] produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// LaTeX only; the backend was not needed.
    Latex(Translation),
    /// LaTeX plus the compiled artifact.
    Rendered {
        translation: Translation,
        artifact: Artifact,
    },
}

impl Outcome {
    pub fn translation(&self) -> &Translation {
        match self {
            Outcome::Latex(translation) | Outcome::Rendered { translation, .. } => translation,
        }
    }
}

/// Translate program text into quantikz code.
///
/// Deterministic: the same source and options always yield byte-identical
/// output.
pub fn translate(source: &str, options: &TranslateOptions) -> TranslateResult<Translation> {
    options.validate()?;

    let program = qsip_qasm::parse(source)?;
    let Lowered {
        circuit,
        mut warnings,
    } = qsip_qasm::build(&program)?;

    let grid = layout(&circuit);
    let diagram = render(&circuit, &grid, options);
    for w in &diagram.warnings {
        warn!("{w}");
    }
    warnings.extend(diagram.warnings.iter().cloned());

    let latex = diagram.to_string();
    let document = standalone(&latex, &options.border);
    info!(
        "translated {} operations on {} wires into {} columns",
        circuit.operations().len(),
        grid.num_wires,
        grid.num_columns
    );

    Ok(Translation {
        latex,
        document,
        warnings,
        circuit,
        grid,
    })
}

/// Compile a translation with `backend`, saving the PDF if requested.
pub async fn render_artifact(
    translation: &Translation,
    options: &TranslateOptions,
    backend: &dyn RenderBackend,
) -> TranslateResult<Artifact> {
    options.validate()?;

    let request = CompileRequest {
        timeout: options.timeout(),
        preview: options.display_inline,
    };
    info!("compiling with {}", backend.name());
    let mut artifact = backend.compile(&translation.document, &request).await?;

    if options.save_artifact {
        if let Some(path) = &options.filename {
            tokio::fs::write(path, &artifact.pdf)
                .await
                .map_err(CompileError::Io)?;
            info!("circuit saved to {}", path.display());
            artifact.saved_to = Some(path.clone());
        }
    }

    Ok(artifact)
}

/// Translate, then compile when the options ask for an artifact.
pub async fn run(
    source: &str,
    options: &TranslateOptions,
    backend: &dyn RenderBackend,
) -> TranslateResult<Outcome> {
    let translation = translate(source, options)?;
    if !options.needs_backend() {
        return Ok(Outcome::Latex(translation));
    }
    let artifact = render_artifact(&translation, options, backend).await?;
    Ok(Outcome::Rendered {
        translation,
        artifact,
    })
}
