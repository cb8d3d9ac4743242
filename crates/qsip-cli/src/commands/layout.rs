//! Layout command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use qsip_quantikz::{Placement, TranslateOptions, translate};

use super::common::read_source;

#[derive(Serialize)]
struct Report<'a> {
    num_wires: usize,
    num_columns: usize,
    operations: Vec<Entry<'a>>,
}

#[derive(Serialize)]
struct Entry<'a> {
    index: usize,
    operation: String,
    #[serde(flatten)]
    placement: &'a Placement,
}

/// Execute the layout command.
pub async fn execute(input: &Path) -> Result<()> {
    let source = read_source(input).await?;
    let translation = translate(&source, &TranslateOptions::latex())
        .with_context(|| format!("Failed to translate {}", input.display()))?;

    let grid = &translation.grid;
    let operations = translation
        .circuit
        .operations()
        .iter()
        .zip(&grid.placements)
        .enumerate()
        .map(|(index, (op, placement))| Entry {
            index,
            operation: op.to_string(),
            placement,
        })
        .collect();

    let report = Report {
        num_wires: grid.num_wires,
        num_columns: grid.num_columns,
        operations,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
