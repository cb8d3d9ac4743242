//! quantikz diagrams for QSIP circuits
//!
//! Lays out a [`qsip_ir::Circuit`] on a wire × column grid and emits the
//! corresponding `quantikz` LaTeX, optionally compiling it with an external
//! toolchain.
//!
//! ```text
//!   source ──→ parse ──→ build ──→ layout ──→ render ──→ LaTeX ──→ backend
//!              (qsip-qasm)          (this crate)                  (pdflatex)
//! ```
//!
//! A measurement and the classically controlled gates reading its result
//! are drawn in the same column whenever their wires allow, joined by a
//! classical wire from the meter.
//!
//! # Example
//!
//! ```rust
//! use qsip_quantikz::{TranslateOptions, translate};
//!
//! let source = r#"
//!     OPENQASM 3.0;
//!     qubit[2] q;
//!     bit c;
//!     h q[0];
//!     c = measure q[0];
//!     if (c) x q[1];
//! "#;
//!
//! let translation = translate(source, &TranslateOptions::latex()).unwrap();
//! assert!(translation.latex.contains(r"\meter{}\wire[d][1]{c}"));
//! assert!(translation.latex.contains(r"\gate{X}"));
//! ```

pub mod backend;
pub mod document;
pub mod error;
pub mod format;
pub mod layout;
pub mod options;
pub mod render;
pub mod translate;

pub use backend::{
    Artifact, BackendConfig, CompileRequest, LatexBackend, RenderBackend, ToolStatus, Toolchain,
};
pub use error::{CompileError, CompileResult, OptionsError, TranslateError, TranslateResult};
pub use layout::{Grid, Placement, PlacementKind, layout};
pub use options::TranslateOptions;
pub use render::{Diagram, render};
pub use translate::{Outcome, Translation, render_artifact, run, translate};
