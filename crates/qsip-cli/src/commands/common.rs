//! Shared helpers for CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use qsip_quantikz::backend::PDFLATEX_ENV;
use qsip_quantikz::{BackendConfig, TranslateOptions};

/// Contents of the YAML options file.
///
/// ```yaml
/// options:
///   border: 4pt
///   row_spacing: 2mm
/// backend:
///   pdflatex: /opt/texlive/bin/pdflatex
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub options: TranslateOptions,
    pub backend: BackendConfig,
}

/// Default location of the options file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("qsip").join("config.yaml"))
}

/// Load the options file.
///
/// An explicit `path` must exist; the default location is optional.
/// `QSIP_PDFLATEX` takes precedence over the file's LaTeX program.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            read_config(path)?
        }
        None => match default_config_path() {
            Some(path) if path.exists() => read_config(&path)?,
            _ => Config::default(),
        },
    };

    if let Ok(program) = std::env::var(PDFLATEX_ENV) {
        if !program.trim().is_empty() {
            debug!("{PDFLATEX_ENV} overrides LaTeX program with {program}");
            config.backend.pdflatex = program;
        }
    }

    Ok(config)
}

fn read_config(path: &Path) -> Result<Config> {
    debug!("loading config from {}", path.display());
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml_ng::from_str(&text)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Read an OpenQASM source file.
pub async fn read_source(path: &Path) -> Result<String> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}
