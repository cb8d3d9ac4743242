//! Doctor command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qsip_quantikz::{LatexBackend, ToolStatus};

use super::common::load_config;

/// Execute the doctor command.
pub async fn execute(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let backend = LatexBackend::new(config.backend);

    println!("{} Checking LaTeX toolchain", style("→").cyan().bold());
    let toolchain = backend.check_installation().await;

    report(&backend.config().pdflatex, &toolchain.pdflatex);
    report("quantikz", &toolchain.quantikz);
    report("converter", &toolchain.converter);

    if !toolchain.can_compile() {
        anyhow::bail!("pdflatex and the quantikz package are required to render circuits");
    }

    println!("{} Toolchain ready", style("✓").green().bold());
    if !toolchain.converter.is_found() {
        println!("  PNG previews need ImageMagick");
    }
    Ok(())
}

fn report(tool: &str, status: &ToolStatus) {
    match status {
        ToolStatus::Found(detail) => {
            println!("  {} {:<10} {}", style("✓").green(), tool, style(detail).dim());
        }
        ToolStatus::Missing(reason) => {
            println!("  {} {:<10} {}", style("✗").red(), tool, reason);
        }
    }
}
