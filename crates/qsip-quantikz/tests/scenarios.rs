//! End-to-end translation tests.

use async_trait::async_trait;
use qsip_ir::{Operation, SemanticError};
use qsip_quantikz::{
    Artifact, CompileRequest, CompileResult, Outcome, PlacementKind, RenderBackend,
    TranslateError, TranslateOptions, render, run, translate,
};

fn latex(source: &str) -> String {
    translate(source, &TranslateOptions::latex()).unwrap().latex
}

/// Cells of each row, without the label.
fn rows(latex: &str) -> Vec<Vec<String>> {
    latex
        .lines()
        .filter(|line| line.starts_with("    "))
        .map(|line| {
            line.trim()
                .trim_end_matches(r"\\")
                .split(" & ")
                .skip(1)
                .map(|cell| cell.trim().to_string())
                .collect()
        })
        .collect()
}

#[test]
fn bell_pair() {
    let rows = rows(&latex("OPENQASM 3.0;\nqubit[2] q;\nh q[0];\ncx q[0], q[1];"));
    assert_eq!(rows[0], [r"\gate{H}", r"\ctrl{1}", r"\qw"]);
    assert_eq!(rows[1], [r"\qw", r"\targ{}", r"\qw"]);
}

#[test]
fn measurement_and_conditional_share_a_column() {
    let rows = rows(&latex(
        "qubit[2] q;\nbit c;\nh q[0];\nc = measure q[0];\nif (c) x q[1];",
    ));
    assert_eq!(
        rows[0],
        [r"\gate{H}", r"\meter{}\wire[d][1]{c}\setwiretype{c}", r"\cw"]
    );
    assert_eq!(rows[1], [r"\qw", r"\gate{X}", r"\qw"]);
}

#[test]
fn detached_gate_around_the_measured_wire() {
    let rows = rows(&latex(
        "qubit[3] q;\nbit c;\nc = measure q[1];\nif (c) cx q[0], q[2];",
    ));
    assert_eq!(rows[0], [r"\qw", r"\ctrl{2}", r"\qw"]);
    assert_eq!(
        rows[1],
        [r"\meter{}\setwiretype{c}", r"\cw\wire[d][1]{c}", r"\cw"]
    );
    assert_eq!(rows[2], [r"\qw", r"\targ{}", r"\qw"]);
}

#[test]
fn barrier_marks_only_named_wires() {
    let rows = rows(&latex(
        "qubit[3] q;\nh q[1];\nbarrier q[0], q[2];\nh q[1];",
    ));
    assert_eq!(rows[0], [r"\barrier{1}", r"\qw", r"\qw"]);
    assert_eq!(rows[1], [r"\gate{H}", r"\gate{H}", r"\qw"]);
    assert_eq!(rows[2], [r"\barrier{1}", r"\qw", r"\qw"]);
}

#[test]
fn reset_restarts_the_wire() {
    let rows = rows(&latex("qubit q;\nbit c;\nc = measure q;\nreset q;\nh q;"));
    assert_eq!(
        rows[0],
        [
            r"\meter{}\setwiretype{c}",
            r"\meter{}",
            r"\setwiretype{n}",
            r"\lstick{$|0\rangle$}\setwiretype{q}",
            r"\gate{H}",
            r"\qw"
        ]
    );
}

#[test]
fn condition_without_measurement_is_rejected() {
    let err = translate("qubit q;\nbit c;\nif (c) x q;", &TranslateOptions::latex()).unwrap_err();
    assert!(matches!(
        err,
        TranslateError::Semantic(SemanticError::UnboundCondition { .. })
    ));
}

#[test]
fn out_of_range_reference_is_rejected() {
    let err = translate("qubit[2] q;\ncx q[0], q[2];", &TranslateOptions::latex()).unwrap_err();
    assert!(matches!(
        err,
        TranslateError::Semantic(SemanticError::OutOfRange { index: 2, size: 2, .. })
    ));
}

#[test]
fn teleportation() {
    let source = r#"
        OPENQASM 3.0;
        include "stdgates.inc";
        qubit[3] q;
        bit[2] c;
        h q[1];
        cx q[1], q[2];
        cx q[0], q[1];
        h q[0];
        c[0] = measure q[0];
        c[1] = measure q[1];
        if (c[1] == 1) x q[2];
        if (c[0] == 1) z q[2];
    "#;
    let translation = translate(source, &TranslateOptions::latex()).unwrap();
    let grid = &translation.grid;

    // Each correction lands in the column of the measurement it reads.
    assert_eq!(grid.placements[6].kind, PlacementKind::CoPlaced { measure: 5 });
    assert_eq!(grid.placements[6].column, grid.placements[5].column);
    assert_eq!(grid.placements[7].kind, PlacementKind::CoPlaced { measure: 4 });
    assert_eq!(grid.placements[7].column, grid.placements[4].column);
    assert!(grid.placements[4].column > grid.placements[5].column);
    assert!(translation.latex.contains(r"\meter{}\wire[d][1]{c}"));
    assert!(translation.latex.contains(r"\meter{}\wire[d][2]{c}"));
    assert_eq!(translation.warnings.len(), 2);
}

#[test]
fn options_shape_the_document() {
    let options = TranslateOptions {
        border: "0pt".into(),
        row_spacing: Some("3mm".into()),
        column_spacing: Some("1em".into()),
        label_wires: false,
        ..TranslateOptions::latex()
    };
    let translation = translate("qubit q; h q;", &options).unwrap();
    assert!(
        translation
            .document
            .starts_with("\\documentclass[tikz,border=0pt]{standalone}")
    );
    assert!(
        translation
            .latex
            .starts_with("\\begin{quantikz}[row sep={3mm}, column sep={1em}]")
    );
    assert!(!translation.latex.contains("lstick"));
}

#[test]
fn rendering_is_repeatable() {
    let translation = translate(
        "qubit[3] q; bit[3] c; h q; c = measure q; if (c[2]) x q[0];",
        &TranslateOptions::latex(),
    )
    .unwrap();
    let again = render(
        &translation.circuit,
        &translation.grid,
        &TranslateOptions::latex(),
    );
    assert_eq!(again.to_string(), translation.latex);
}

struct FakeBackend;

#[async_trait]
impl RenderBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    async fn compile(&self, document: &str, request: &CompileRequest) -> CompileResult<Artifact> {
        Ok(Artifact {
            pdf: document.as_bytes().to_vec(),
            png: request.preview.then(|| vec![0x89, b'P', b'N', b'G']),
            saved_to: None,
        })
    }
}

#[tokio::test]
async fn latex_only_skips_backend() {
    let outcome = run("qubit q; x q;", &TranslateOptions::latex(), &FakeBackend)
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Latex(_)));
}

#[tokio::test]
async fn saved_artifact_lands_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bell.pdf");
    let options = TranslateOptions {
        display_inline: true,
        ..TranslateOptions::default().with_filename(&path)
    };

    let outcome = run("qubit[2] q; h q[0]; cx q[0], q[1];", &options, &FakeBackend)
        .await
        .unwrap();
    let Outcome::Rendered {
        translation,
        artifact,
    } = outcome
    else {
        panic!("expected a rendered outcome");
    };

    assert_eq!(artifact.saved_to.as_deref(), Some(path.as_path()));
    assert!(artifact.png.is_some());
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, translation.document);
}

#[test]
fn conditional_count_matches_links() {
    let translation = translate(
        "qubit[2] q; bit c; c = measure q[0]; if (c) x q[1]; if (c) h q[1];",
        &TranslateOptions::latex(),
    )
    .unwrap();
    let conditionals = translation
        .circuit
        .operations()
        .iter()
        .filter(|op| matches!(op, Operation::ConditionalGate { .. }))
        .count();
    assert_eq!(conditionals, translation.circuit.links().len());
}
