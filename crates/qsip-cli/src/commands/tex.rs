//! Tex command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qsip_quantikz::translate;

use super::common::{load_config, read_source};

/// Command-line overrides for the `tex` command.
#[derive(Debug, Default)]
pub struct Flags {
    pub document: bool,
    pub row_sep: Option<String>,
    pub col_sep: Option<String>,
    pub no_labels: bool,
}

/// Execute the tex command.
pub async fn execute(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    flags: Flags,
) -> Result<()> {
    let mut options = load_config(config)?.options;
    options.as_latex = true;
    if flags.row_sep.is_some() {
        options.row_spacing = flags.row_sep;
    }
    if flags.col_sep.is_some() {
        options.column_spacing = flags.col_sep;
    }
    if flags.no_labels {
        options.label_wires = false;
    }

    let source = read_source(input).await?;
    let translation = translate(&source, &options)
        .with_context(|| format!("Failed to translate {}", input.display()))?;

    let text = if flags.document {
        translation.document
    } else {
        format!("{}\n", translation.latex)
    };

    match output {
        Some(path) => {
            tokio::fs::write(path, &text)
                .await
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            eprintln!(
                "{} Wrote {} ({} operations, {} columns)",
                style("✓").green().bold(),
                style(path.display()).green(),
                translation.circuit.operations().len(),
                translation.grid.num_columns
            );
        }
        None => print!("{text}"),
    }

    Ok(())
}
