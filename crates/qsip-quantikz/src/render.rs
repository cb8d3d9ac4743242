//! quantikz code generation.
//!
//! The renderer fills a wire × column table of cells from the layout grid,
//! then walks each row left to right tracking whether the wire currently
//! carries quantum or classical information, which decides the filler
//! emitted in empty cells.

use std::fmt;

use qsip_ir::{Circuit, Gate, GateKind, Operation, Warning};
use tracing::debug;

use crate::format::{escape, format_param_list, ket_label};
use crate::layout::{Grid, Placement, PlacementKind};
use crate::options::TranslateOptions;

/// Number of physical columns a reset expands into.
const RESET_WIDTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireType {
    Quantum,
    Classical,
}

impl WireType {
    fn filler(self) -> &'static str {
        match self {
            WireType::Quantum => r"\qw",
            WireType::Classical => r"\cw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cell {
    Blank,
    /// A macro that leaves the wire type unchanged.
    Glyph(String),
    /// A meter, with any classical connectors to co-placed gates.
    Meter(String),
    Reset,
    /// Classical connector leaving a measured wire.
    Connector(String),
}

/// One row of the diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: Option<String>,
    pub cells: Vec<String>,
}

/// A rendered quantikz environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    /// Options for `\begin{quantikz}[...]`.
    pub environment: Vec<String>,
    pub rows: Vec<Row>,
    pub warnings: Vec<Warning>,
}

impl Diagram {
    /// Number of gate anchor cells: boxes, targets and swap targets.
    ///
    /// Every gate operation contributes exactly one.
    pub fn anchor_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .map(|cell| {
                [r"\gate{", r"\gate[", r"\targ{}", r"\targX{}"]
                    .iter()
                    .map(|anchor| cell.matches(anchor).count())
                    .sum::<usize>()
            })
            .sum()
    }
}

impl fmt::Display for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.environment.is_empty() {
            writeln!(f, r"\begin{{quantikz}}")?;
        } else {
            writeln!(f, r"\begin{{quantikz}}[{}]", self.environment.join(", "))?;
        }
        let last = self.rows.len().saturating_sub(1);
        for (i, row) in self.rows.iter().enumerate() {
            f.write_str("    ")?;
            if let Some(label) = &row.label {
                write!(f, "{label} & ")?;
            }
            f.write_str(&row.cells.join(" & "))?;
            if i < last {
                f.write_str(r" \\")?;
            }
            writeln!(f)?;
        }
        write!(f, r"\end{{quantikz}}")
    }
}

/// Render a laid-out circuit.
pub fn render(circuit: &Circuit, grid: &Grid, options: &TranslateOptions) -> Diagram {
    let mut builder = Builder::new(grid);

    for (index, op) in circuit.operations().iter().enumerate() {
        let Some(placement) = grid.placement(index) else {
            continue;
        };
        builder.place(circuit, grid, index, op, placement);
    }

    let labels = wire_labels(circuit);
    let rows = builder
        .cells
        .iter()
        .enumerate()
        .map(|(wire, cells)| Row {
            label: options
                .label_wires
                .then(|| labels.get(wire).map(|l| ket_label(l)))
                .flatten(),
            cells: emit_row(cells, &builder.reset_columns),
        })
        .collect();

    let mut environment = Vec::new();
    if let Some(row) = &options.row_spacing {
        environment.push(format!("row sep={{{row}}}"));
    }
    if let Some(column) = &options.column_spacing {
        environment.push(format!("column sep={{{column}}}"));
    }

    debug!(
        "rendered {} rows, {} unknown gate warning(s)",
        grid.num_wires,
        builder.warnings.len()
    );

    Diagram {
        environment,
        rows,
        warnings: builder.warnings,
    }
}

struct Builder {
    cells: Vec<Vec<Cell>>,
    reset_columns: Vec<bool>,
    warnings: Vec<Warning>,
}

impl Builder {
    fn new(grid: &Grid) -> Self {
        Self {
            cells: vec![vec![Cell::Blank; grid.num_columns]; grid.num_wires],
            reset_columns: vec![false; grid.num_columns],
            warnings: Vec::new(),
        }
    }

    fn set(&mut self, wire: usize, column: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(wire).and_then(|row| row.get_mut(column)) {
            *slot = cell;
        }
    }

    fn place(
        &mut self,
        circuit: &Circuit,
        grid: &Grid,
        index: usize,
        op: &Operation,
        placement: &Placement,
    ) {
        let column = placement.column;
        match op {
            Operation::Gate(gate) | Operation::ConditionalGate { gate, .. } => {
                for (wire, glyph) in self.gate_glyphs(gate) {
                    self.set(wire, column, Cell::Glyph(glyph));
                }
                if let PlacementKind::Detached { measure } = placement.kind {
                    if let Some(source) = grid.placement(measure) {
                        let wires: Vec<_> = gate.qubits().map(|q| q.wire()).collect();
                        if let Some(wire) = connector(source.lo, &wires) {
                            self.set(source.lo, column, Cell::Connector(wire));
                        }
                    }
                }
            }
            Operation::Measure { qubit, .. } => {
                let members = circuit
                    .links_from(index)
                    .filter_map(|link| grid.placement(link.gate))
                    .filter(|p| p.kind == PlacementKind::CoPlaced { measure: index });
                let connectors = meter_connectors(qubit.wire(), members);
                self.set(qubit.wire(), column, Cell::Meter(connectors));
            }
            Operation::Reset { qubit } => {
                self.set(qubit.wire(), column, Cell::Reset);
                if let Some(flag) = self.reset_columns.get_mut(column) {
                    *flag = true;
                }
            }
            Operation::Barrier { qubits } => {
                let wires: Vec<_> = qubits.iter().map(|q| q.wire()).collect();
                for (top, height) in runs(wires) {
                    self.set(top, column, Cell::Glyph(format!(r"\barrier{{{height}}}")));
                }
            }
        }
    }

    /// Cells drawn for a gate, as (wire, macro) pairs.
    fn gate_glyphs(&mut self, gate: &Gate) -> Vec<(usize, String)> {
        let target = |i: usize| gate.targets.get(i).map_or(0, |q| q.wire());
        let control = |i: usize| gate.controls.get(i).map_or(0, |q| q.wire());
        let boxed = |label: &str| vec![(target(0), format!(r"\gate{{{label}}}"))];
        let params = format_param_list(&gate.params);

        match &gate.kind {
            GateKind::I => boxed("I"),
            GateKind::X => boxed("X"),
            GateKind::Y => boxed("Y"),
            GateKind::Z => boxed("Z"),
            GateKind::H => boxed("H"),
            GateKind::S => boxed("S"),
            GateKind::Sdg => boxed(r"S^\dagger"),
            GateKind::T => boxed("T"),
            GateKind::Tdg => boxed(r"T^\dagger"),
            GateKind::SX => boxed(r"\sqrt{X}"),
            GateKind::SXdg => boxed(r"\sqrt{X}^\dagger"),
            GateKind::Rx => boxed(&format!("R_x{params}")),
            GateKind::Ry => boxed(&format!("R_y{params}")),
            GateKind::Rz => boxed(&format!("R_z{params}")),
            GateKind::P => boxed(&format!("P{params}")),
            GateKind::U => boxed(&format!("U{params}")),
            GateKind::CX => vec![
                (control(0), format!(r"\ctrl{{{}}}", offset(control(0), target(0)))),
                (target(0), r"\targ{}".to_string()),
            ],
            GateKind::CY | GateKind::CZ => {
                let label = if gate.kind == GateKind::CY { "Y" } else { "Z" };
                vec![
                    (control(0), format!(r"\ctrl{{{}}}", offset(control(0), target(0)))),
                    (target(0), format!(r"\gate{{{label}}}")),
                ]
            }
            GateKind::Swap => vec![
                (target(0), format!(r"\swap{{{}}}", offset(target(0), target(1)))),
                (target(1), r"\targX{}".to_string()),
            ],
            GateKind::CCX => vec![
                (control(0), format!(r"\ctrl{{{}}}", offset(control(0), control(1)))),
                (control(1), format!(r"\ctrl{{{}}}", offset(control(1), target(0)))),
                (target(0), r"\targ{}".to_string()),
            ],
            GateKind::Custom(name) => {
                let warning = Warning::UnknownGate { name: name.clone() };
                if !self.warnings.contains(&warning) {
                    self.warnings.push(warning);
                }
                let label = format!("{}{params}", escape(name));
                let wires: Vec<_> = gate.qubits().map(|q| q.wire()).collect();
                let lo = wires.iter().copied().min().unwrap_or(0);
                let hi = wires.iter().copied().max().unwrap_or(0);
                if wires.len() <= 1 {
                    vec![(lo, format!(r"\gate{{{label}}}"))]
                } else {
                    vec![(lo, format!(r"\gate[{}]{{{label}}}", hi - lo + 1))]
                }
            }
        }
    }
}

/// Signed row distance from `from` to `to`.
fn offset(from: usize, to: usize) -> String {
    if to >= from {
        (to - from).to_string()
    } else {
        format!("-{}", from - to)
    }
}

/// Connector from a measured wire to the nearest wire a gate acts on.
///
/// None when the gate itself acts on the measured wire. Ties go down.
fn connector(wire: usize, gate_wires: &[usize]) -> Option<String> {
    if gate_wires.contains(&wire) {
        return None;
    }
    let below = gate_wires.iter().copied().filter(|&w| w > wire).min();
    let above = gate_wires.iter().copied().filter(|&w| w < wire).max();
    match (below, above) {
        (Some(b), Some(a)) if wire - a < b - wire => Some(format!(r"\wire[u][{}]{{c}}", wire - a)),
        (Some(b), _) => Some(format!(r"\wire[d][{}]{{c}}", b - wire)),
        (None, Some(a)) => Some(format!(r"\wire[u][{}]{{c}}", wire - a)),
        (None, None) => None,
    }
}

/// Contiguous runs of `wires` as (top wire, length) pairs.
fn runs(mut wires: Vec<usize>) -> Vec<(usize, usize)> {
    wires.sort_unstable();
    wires.dedup();
    let mut out: Vec<(usize, usize)> = Vec::new();
    for wire in wires {
        match out.last_mut() {
            Some((top, len)) if *top + *len == wire => *len += 1,
            _ => out.push((wire, 1)),
        }
    }
    out
}

/// Connectors from a meter down and up to the farthest co-placed gates.
fn meter_connectors<'a>(wire: usize, members: impl Iterator<Item = &'a Placement>) -> String {
    let mut down = 0;
    let mut up = 0;
    for member in members {
        if member.lo > wire {
            down = down.max(member.lo - wire);
        } else if member.hi < wire {
            up = up.max(wire - member.hi);
        }
    }

    let mut out = String::new();
    if down > 0 {
        out.push_str(&format!(r"\wire[d][{down}]{{c}}"));
    }
    if up > 0 {
        out.push_str(&format!(r"\wire[u][{up}]{{c}}"));
    }
    out
}

fn emit_row(cells: &[Cell], reset_columns: &[bool]) -> Vec<String> {
    let mut wire_type = WireType::Quantum;
    let mut out = Vec::with_capacity(cells.len() + 1);

    for (column, cell) in cells.iter().enumerate() {
        match cell {
            Cell::Blank => out.push(wire_type.filler().to_string()),
            Cell::Glyph(glyph) => out.push(glyph.clone()),
            Cell::Meter(connectors) => {
                let mut meter = format!(r"\meter{{}}{connectors}");
                if wire_type == WireType::Quantum {
                    meter.push_str(r"\setwiretype{c}");
                }
                wire_type = WireType::Classical;
                out.push(meter);
            }
            Cell::Reset => {
                out.push(r"\meter{}".to_string());
                out.push(r"\setwiretype{n}".to_string());
                out.push(r"\lstick{$|0\rangle$}\setwiretype{q}".to_string());
                wire_type = WireType::Quantum;
                continue;
            }
            Cell::Connector(wire) => out.push(format!("{}{wire}", wire_type.filler())),
        }
        if reset_columns.get(column).copied().unwrap_or(false) {
            for _ in 1..RESET_WIDTH {
                out.push(wire_type.filler().to_string());
            }
        }
    }

    out.push(wire_type.filler().to_string());
    out
}

/// Source-level label of every wire: `q[i]`, or `q` for one-qubit registers.
fn wire_labels(circuit: &Circuit) -> Vec<String> {
    circuit
        .qregs()
        .iter()
        .flat_map(|reg| (0..reg.size).map(move |i| reg.slot_label(i)))
        .collect()
}
