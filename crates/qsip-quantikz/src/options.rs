//! Translation options.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

const TEX_UNITS: &[&str] = &[
    "pt", "mm", "cm", "in", "ex", "em", "bp", "pc", "dd", "cc", "sp", "mu",
];

/// Options controlling translation and rendering.
///
/// Every field has a default, so partial YAML or JSON documents
/// deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    /// Only produce LaTeX; never invoke the backend.
    pub as_latex: bool,
    /// Copy the compiled PDF to `filename`.
    pub save_artifact: bool,
    /// Destination of the saved PDF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
    /// Produce a PNG preview alongside the PDF.
    pub display_inline: bool,
    /// Border of the standalone document, a TeX length.
    pub border: String,
    /// `row sep` of the quantikz environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_spacing: Option<String>,
    /// `column sep` of the quantikz environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_spacing: Option<String>,
    /// Prefix each row with a ket label.
    pub label_wires: bool,
    /// Backend timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            as_latex: false,
            save_artifact: false,
            filename: None,
            display_inline: false,
            border: "2pt".to_string(),
            row_spacing: None,
            column_spacing: None,
            label_wires: true,
            timeout_secs: 60,
        }
    }
}

impl TranslateOptions {
    /// Options for LaTeX-only output.
    pub fn latex() -> Self {
        Self {
            as_latex: true,
            ..Self::default()
        }
    }

    /// Save the compiled PDF to `filename`.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.save_artifact = true;
        self.filename = Some(filename.into());
        self
    }

    /// Set row and column separation.
    #[must_use]
    pub fn with_spacing(mut self, row: Option<String>, column: Option<String>) -> Self {
        self.row_spacing = row;
        self.column_spacing = column;
        self
    }

    /// Backend timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether the backend has to run at all.
    pub fn needs_backend(&self) -> bool {
        !self.as_latex && (self.save_artifact || self.display_inline)
    }

    /// Check the options for consistency.
    pub fn validate(&self) -> Result<(), OptionsError> {
        check_length("border", &self.border)?;
        if let Some(row) = &self.row_spacing {
            check_length("row_spacing", row)?;
        }
        if let Some(column) = &self.column_spacing {
            check_length("column_spacing", column)?;
        }
        if self.timeout_secs == 0 {
            return Err(OptionsError::ZeroTimeout);
        }
        if self.save_artifact && self.filename.is_none() {
            return Err(OptionsError::MissingFilename);
        }
        Ok(())
    }
}

/// Accept a TeX dimension: optional sign, a decimal number, a unit.
fn check_length(option: &'static str, value: &str) -> Result<(), OptionsError> {
    let invalid = || OptionsError::InvalidLength {
        option,
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let unsigned = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
    let split = unsigned
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .ok_or_else(invalid)?;
    let (number, unit) = unsigned.split_at(split);

    let digits = number.chars().filter(char::is_ascii_digit).count();
    let dots = number.matches('.').count();
    if digits == 0 || dots > 1 || !TEX_UNITS.contains(&unit.trim()) {
        return Err(invalid());
    }
    Ok(())
}
