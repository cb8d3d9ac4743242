//! `pdflatex` backend.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{Artifact, CompileRequest, RenderBackend};
use crate::error::{CompileError, CompileResult};

/// Environment variable overriding the LaTeX program.
pub const PDFLATEX_ENV: &str = "QSIP_PDFLATEX";

/// Characters of compiler output kept in a failure report.
const LOG_TAIL: usize = 1000;

const JOB_NAME: &str = "circuit";

/// Timeout for toolchain probes.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Toolchain settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// LaTeX program.
    pub pdflatex: String,
    /// Program used to locate TeX packages.
    pub kpsewhich: String,
    /// Rasterization density of the PNG preview, in DPI.
    pub density: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            pdflatex: "pdflatex".to_string(),
            kpsewhich: "kpsewhich".to_string(),
            density: 150,
        }
    }
}

impl BackendConfig {
    /// Defaults, with the LaTeX program taken from `QSIP_PDFLATEX` if set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(program) = std::env::var(PDFLATEX_ENV) {
            if !program.trim().is_empty() {
                config.pdflatex = program;
            }
        }
        config
    }
}

/// Result of probing one external tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ToolStatus {
    Found(String),
    Missing(String),
}

impl ToolStatus {
    pub fn is_found(&self) -> bool {
        matches!(self, ToolStatus::Found(_))
    }
}

/// Availability of the external toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toolchain {
    pub pdflatex: ToolStatus,
    pub quantikz: ToolStatus,
    pub converter: ToolStatus,
}

impl Toolchain {
    /// Whether documents can be compiled to PDF.
    pub fn can_compile(&self) -> bool {
        self.pdflatex.is_found() && self.quantikz.is_found()
    }
}

/// Compiles documents with `pdflatex` in a scratch directory.
///
/// The directory lives for one call and is removed on every exit path.
#[derive(Debug, Clone, Default)]
pub struct LatexBackend {
    config: BackendConfig,
}

impl LatexBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Probe `pdflatex`, the quantikz package and an image converter.
    pub async fn check_installation(&self) -> Toolchain {
        let cwd = std::env::temp_dir();

        let pdflatex = match run(&self.config.pdflatex, &["--version"], &cwd, PROBE_TIMEOUT).await {
            Ok(out) if out.status.success() => ToolStatus::Found(first_line(&out.stdout)),
            Ok(out) => ToolStatus::Missing(format!("exit status {:?}", out.status.code())),
            Err(e) => ToolStatus::Missing(e.to_string()),
        };

        let quantikz =
            match run(&self.config.kpsewhich, &["quantikz.sty"], &cwd, PROBE_TIMEOUT).await {
                Ok(out) if out.status.success() && !first_line(&out.stdout).is_empty() => {
                    ToolStatus::Found(first_line(&out.stdout))
                }
                Ok(_) => ToolStatus::Missing("quantikz.sty not found by kpsewhich".to_string()),
                Err(e) => ToolStatus::Missing(e.to_string()),
            };

        let mut converter = ToolStatus::Missing("neither magick nor convert found".to_string());
        for program in ["magick", "convert"] {
            if let Ok(out) = run(program, &["-version"], &cwd, PROBE_TIMEOUT).await {
                if out.status.success() {
                    converter = ToolStatus::Found(first_line(&out.stdout));
                    break;
                }
            }
        }

        Toolchain {
            pdflatex,
            quantikz,
            converter,
        }
    }

    /// Rasterize the PDF in `dir`. Missing converters are not an error.
    async fn preview(&self, dir: &Path, timeout: Duration) -> Option<Vec<u8>> {
        let density = self.config.density.to_string();
        let pdf = format!("{JOB_NAME}.pdf");
        let png = format!("{JOB_NAME}.png");
        let attempts: [(&str, Vec<&str>); 3] = [
            ("magick", vec!["convert", "-density", density.as_str(), pdf.as_str(), png.as_str()]),
            ("magick", vec!["-density", density.as_str(), pdf.as_str(), png.as_str()]),
            ("convert", vec!["-density", density.as_str(), pdf.as_str(), png.as_str()]),
        ];

        for (program, args) in &attempts {
            match run(program, args, dir, timeout).await {
                Ok(out) if out.status.success() => match tokio::fs::read(dir.join(&png)).await {
                    Ok(bytes) => return Some(bytes),
                    Err(e) => debug!("{program} produced no preview: {e}"),
                },
                Ok(out) => debug!("{program} failed with status {:?}", out.status.code()),
                Err(e) => debug!("{program} unavailable: {e}"),
            }
        }

        warn!("Could not create a PNG preview; install ImageMagick");
        None
    }
}

#[async_trait]
impl RenderBackend for LatexBackend {
    fn name(&self) -> &str {
        "pdflatex"
    }

    async fn compile(&self, document: &str, request: &CompileRequest) -> CompileResult<Artifact> {
        let dir = tempfile::tempdir()?;
        let tex_name = format!("{JOB_NAME}.tex");
        tokio::fs::write(dir.path().join(&tex_name), document).await?;

        let output = run(
            &self.config.pdflatex,
            &["-interaction=nonstopmode", "-halt-on-error", tex_name.as_str()],
            dir.path(),
            request.timeout,
        )
        .await?;

        if !output.status.success() {
            return Err(CompileError::Failed {
                status: output.status.code(),
                log: tail(&String::from_utf8_lossy(&output.stdout), LOG_TAIL),
            });
        }

        let pdf_path = dir.path().join(format!("{JOB_NAME}.pdf"));
        let pdf = match tokio::fs::read(&pdf_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CompileError::MissingOutput(pdf_path));
            }
            Err(e) => return Err(e.into()),
        };
        info!("compiled {} byte PDF", pdf.len());

        let png = if request.preview {
            self.preview(dir.path(), request.timeout).await
        } else {
            None
        };

        Ok(Artifact {
            pdf,
            png,
            saved_to: None,
        })
    }
}

/// Run `program` in `cwd`, killing it if it outlives `timeout`.
async fn run(program: &str, args: &[&str], cwd: &Path, timeout: Duration) -> CompileResult<Output> {
    debug!("running {program} {}", args.join(" "));

    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| CompileError::Timeout {
            program: program.to_string(),
            secs: timeout.as_secs(),
        })?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CompileError::ToolNotFound {
                    program: program.to_string(),
                }
            } else {
                CompileError::Io(e)
            }
        })
}

fn first_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// The last `max` characters of `text`.
fn tail(text: &str, max: usize) -> String {
    let start = text
        .char_indices()
        .rev()
        .nth(max.saturating_sub(1))
        .map_or(0, |(i, _)| i);
    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail() {
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("ab", 10), "ab");
        assert_eq!(tail("ααβ", 2), "αβ");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line(b"pdfTeX 3.14\nmore"), "pdfTeX 3.14");
        assert_eq!(first_line(b""), "");
    }

    #[test]
    fn test_config_defaults() {
        let config: BackendConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BackendConfig::default());
        assert_eq!(config.density, 150);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let backend = LatexBackend::new(BackendConfig {
            pdflatex: "qsip-no-such-latex".to_string(),
            ..BackendConfig::default()
        });
        let err = backend
            .compile("\\documentclass{article}", &CompileRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::ToolNotFound { .. }));
    }

    #[tokio::test]
    async fn test_probe_reports_missing_tools() {
        let backend = LatexBackend::new(BackendConfig {
            pdflatex: "qsip-no-such-latex".to_string(),
            kpsewhich: "qsip-no-such-kpsewhich".to_string(),
            ..BackendConfig::default()
        });
        let toolchain = backend.check_installation().await;
        assert!(!toolchain.pdflatex.is_found());
        assert!(!toolchain.quantikz.is_found());
        assert!(!toolchain.can_compile());
    }
}
