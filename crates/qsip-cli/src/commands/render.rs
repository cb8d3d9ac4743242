//! Render command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qsip_quantikz::{LatexBackend, Outcome, run};

use super::common::{load_config, read_source};

/// Execute the render command.
pub async fn execute(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    preview: bool,
    border: Option<String>,
    timeout: Option<u64>,
) -> Result<()> {
    let config = load_config(config)?;
    let mut options = config.options.with_filename(output);
    options.as_latex = false;
    options.display_inline |= preview;
    if let Some(border) = border {
        options.border = border;
    }
    if let Some(secs) = timeout {
        options.timeout_secs = secs;
    }

    eprintln!(
        "{} Rendering {} with {}",
        style("→").cyan().bold(),
        style(input.display()).green(),
        style(&config.backend.pdflatex).yellow()
    );

    let source = read_source(input).await?;
    let backend = LatexBackend::new(config.backend);
    let outcome = run(&source, &options, &backend)
        .await
        .with_context(|| format!("Failed to render {}", input.display()))?;

    let Outcome::Rendered {
        translation,
        artifact,
    } = outcome
    else {
        anyhow::bail!("No artifact was produced");
    };

    eprintln!(
        "  Circuit: {} wires, {} columns",
        translation.grid.num_wires, translation.grid.num_columns
    );
    eprintln!("{} Rendering complete", style("✓").green().bold());
    eprintln!("  Output: {}", style(output.display()).green());

    if let Some(png) = artifact.png {
        let png_path = output.with_extension("png");
        tokio::fs::write(&png_path, png)
            .await
            .with_context(|| format!("Failed to write file: {}", png_path.display()))?;
        eprintln!("  Preview: {}", style(png_path.display()).green());
    }

    Ok(())
}
