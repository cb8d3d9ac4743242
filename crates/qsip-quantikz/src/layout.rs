//! Column assignment.
//!
//! Every operation is given a column (time-slice) by walking the circuit in
//! program order with one next-free counter per wire. An operation occupies
//! every wire between its lowest and highest qubit, since the vertical line
//! of a multi-qubit glyph crosses them. Barriers are the exception: they
//! hold only the wires they name.
//!
//! A measurement that feeds conditional gates opens a *pending group*: its
//! column is deferred so that the conditional gates it controls can be drawn
//! in the same column, joined to the meter by a classical wire. A group
//! closes once every linked gate has been seen, when another operation
//! touches its span, or at the end of the circuit. A linked gate that cannot
//! share the column is placed *detached* in a later column, with its span
//! stretched over the measured wire.

use qsip_ir::{Circuit, Operation};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// How an operation ended up in its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementKind {
    /// Ordinary placement.
    Normal,
    /// Conditional gate sharing the column of the measurement at `measure`.
    CoPlaced { measure: usize },
    /// Conditional gate in a later column than the measurement at `measure`.
    Detached { measure: usize },
}

/// Column and wire range of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub column: usize,
    /// Lowest occupied wire.
    pub lo: usize,
    /// Highest occupied wire.
    pub hi: usize,
    #[serde(flatten)]
    pub kind: PlacementKind,
}

impl Placement {
    /// Whether `wire` lies in this placement's span.
    pub fn covers(&self, wire: usize) -> bool {
        (self.lo..=self.hi).contains(&wire)
    }
}

/// The laid-out circuit: one placement per operation, in program order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub placements: Vec<Placement>,
    pub num_columns: usize,
    pub num_wires: usize,
}

impl Grid {
    /// Placement of operation `index`.
    pub fn placement(&self, index: usize) -> Option<&Placement> {
        self.placements.get(index)
    }
}

/// A measurement waiting for the conditional gates it feeds.
#[derive(Debug)]
struct Group {
    measure: usize,
    lo: usize,
    hi: usize,
    /// Wire ranges already used in the shared column.
    occupied: Vec<(usize, usize)>,
    members: Vec<usize>,
    remaining: usize,
}

impl Group {
    fn touches(&self, lo: usize, hi: usize) -> bool {
        lo <= self.hi && self.lo <= hi
    }

    fn collides(&self, lo: usize, hi: usize) -> bool {
        self.occupied.iter().any(|&(a, b)| lo <= b && a <= hi)
    }
}

struct LayoutEngine<'a> {
    circuit: &'a Circuit,
    next_free: Vec<usize>,
    placements: Vec<Placement>,
    /// Open groups in creation order.
    pending: Vec<Group>,
}

/// Assign a column to every operation of `circuit`.
///
/// Control links must already be resolved. Placement is driven only by the
/// next-free counters; no compaction pass runs afterwards.
pub fn layout(circuit: &Circuit) -> Grid {
    let mut engine = LayoutEngine::new(circuit);
    for (index, op) in circuit.operations().iter().enumerate() {
        engine.place(index, op);
    }
    engine.finish()
}

impl<'a> LayoutEngine<'a> {
    fn new(circuit: &'a Circuit) -> Self {
        let placements = circuit
            .operations()
            .iter()
            .map(|op| {
                let (lo, hi) = op.wire_span().unwrap_or((0, 0));
                Placement {
                    column: 0,
                    lo,
                    hi,
                    kind: PlacementKind::Normal,
                }
            })
            .collect();

        Self {
            circuit,
            next_free: vec![0; circuit.num_qubits()],
            placements,
            pending: Vec::new(),
        }
    }

    fn place(&mut self, index: usize, op: &Operation) {
        let Some((lo, hi)) = op.wire_span() else {
            trace!("op {index} ({}) touches no wire", op.name());
            return;
        };

        match op {
            Operation::ConditionalGate { .. } => {
                if let Some(link) = self.circuit.link_into(index).copied() {
                    self.place_linked(index, lo, hi, link.measure);
                } else {
                    self.place_normal(index, lo, hi);
                }
            }
            Operation::Measure { .. } => {
                let links = self.circuit.links_from(index).count();
                if links == 0 {
                    self.place_normal(index, lo, hi);
                } else {
                    self.close_touching(lo, hi, None);
                    debug!("measurement {index} opens a group for {links} conditional gate(s)");
                    self.pending.push(Group {
                        measure: index,
                        lo,
                        hi,
                        occupied: vec![(lo, hi)],
                        members: Vec::new(),
                        remaining: links,
                    });
                }
            }
            Operation::Barrier { qubits } => {
                let wires: Vec<_> = qubits.iter().map(|q| q.wire()).collect();
                self.place_barrier(index, &wires);
            }
            _ => self.place_normal(index, lo, hi),
        }
    }

    /// A barrier aligns the wires it names and leaves the others free.
    fn place_barrier(&mut self, index: usize, wires: &[usize]) {
        for &wire in wires {
            self.close_touching(wire, wire, None);
        }
        let column = wires
            .iter()
            .filter_map(|&w| self.next_free.get(w).copied())
            .max()
            .unwrap_or(0);
        for &wire in wires {
            if let Some(slot) = self.next_free.get_mut(wire) {
                *slot = column + 1;
            }
        }
        self.placements[index].column = column;
    }

    fn place_linked(&mut self, index: usize, lo: usize, hi: usize, measure: usize) {
        let measure_wire = self.placements[measure].lo;

        if let Some(pos) = self.pending.iter().position(|g| g.measure == measure) {
            let glo = self.pending[pos].lo.min(lo);
            let ghi = self.pending[pos].hi.max(hi);
            self.close_touching(glo, ghi, Some(measure));

            // Closing others may have shifted the group's position.
            let pos = self
                .pending
                .iter()
                .position(|g| g.measure == measure)
                .unwrap_or(pos);
            if !self.pending[pos].collides(lo, hi) {
                let group = &mut self.pending[pos];
                group.lo = glo;
                group.hi = ghi;
                group.occupied.push((lo, hi));
                group.members.push(index);
                group.remaining = group.remaining.saturating_sub(1);
                self.placements[index].kind = PlacementKind::CoPlaced { measure };
                trace!("op {index} joins group of measurement {measure}");
                if group.remaining == 0 {
                    self.close(pos);
                }
                return;
            }
        }

        // Cannot share the column: stretch over the measured wire so the
        // connector has a free path.
        let lo = lo.min(measure_wire);
        let hi = hi.max(measure_wire);
        self.placements[index].lo = lo;
        self.placements[index].hi = hi;
        self.placements[index].kind = PlacementKind::Detached { measure };
        debug!("op {index} detached from measurement {measure}");
        self.place_normal(index, lo, hi);
    }

    fn place_normal(&mut self, index: usize, lo: usize, hi: usize) {
        self.close_touching(lo, hi, None);
        let column = self.claim(lo, hi);
        self.placements[index].column = column;
    }

    /// Take the first column free on every wire of `lo..=hi`.
    fn claim(&mut self, lo: usize, hi: usize) -> usize {
        let column = self.next_free[lo..=hi].iter().copied().max().unwrap_or(0);
        for slot in &mut self.next_free[lo..=hi] {
            *slot = column + 1;
        }
        column
    }

    /// Close, in creation order, every pending group other than `keep` whose
    /// span meets `lo..=hi`.
    fn close_touching(&mut self, lo: usize, hi: usize, keep: Option<usize>) {
        while let Some(pos) = self
            .pending
            .iter()
            .position(|g| Some(g.measure) != keep && g.touches(lo, hi))
        {
            self.close(pos);
        }
    }

    fn close(&mut self, pos: usize) {
        let group = self.pending.remove(pos);
        let column = self.claim(group.lo, group.hi);
        self.placements[group.measure].column = column;
        for &member in &group.members {
            self.placements[member].column = column;
        }
        trace!(
            "group of measurement {} closed at column {column} with {} member(s)",
            group.measure,
            group.members.len()
        );
    }

    fn finish(mut self) -> Grid {
        while !self.pending.is_empty() {
            self.close(0);
        }
        let num_columns = self.next_free.iter().copied().max().unwrap_or(0);
        debug!(
            "layout: {} operations in {num_columns} columns",
            self.placements.len()
        );
        Grid {
            placements: self.placements,
            num_columns,
            num_wires: self.next_free.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsip_ir::{ClbitId, Gate, GateKind, QubitId};

    fn x(q: u32) -> Gate {
        Gate::new(GateKind::X, vec![], vec![QubitId(q)])
    }

    fn resolved(mut circuit: Circuit) -> Circuit {
        circuit.resolve_control_links().unwrap();
        circuit
    }

    #[test]
    fn test_sequential_columns() {
        let mut c = Circuit::new();
        let q = c.add_qreg("q", 2).unwrap();
        c.h(q).unwrap();
        c.cx(q, QubitId(1)).unwrap();
        let grid = layout(&c);
        assert_eq!(grid.placements[0].column, 0);
        assert_eq!(grid.placements[1].column, 1);
        assert_eq!(grid.num_columns, 2);
    }

    #[test]
    fn test_parallel_gates_share_column() {
        let mut c = Circuit::new();
        c.add_qreg("q", 2).unwrap();
        c.h(QubitId(0)).unwrap();
        c.h(QubitId(1)).unwrap();
        let grid = layout(&c);
        assert_eq!(grid.placements[0].column, grid.placements[1].column);
    }

    #[test]
    fn test_span_blocks_middle_wire() {
        let mut c = Circuit::new();
        c.add_qreg("q", 3).unwrap();
        c.cx(QubitId(0), QubitId(2)).unwrap();
        c.h(QubitId(1)).unwrap();
        let grid = layout(&c);
        assert_eq!(grid.placements[1].column, 1);
    }

    #[test]
    fn test_measure_and_conditional_share_column() {
        let mut c = Circuit::new();
        c.add_qreg("q", 2).unwrap();
        let bit = c.add_creg("c", 1).unwrap();
        c.h(QubitId(0)).unwrap();
        c.measure(QubitId(0), bit).unwrap();
        c.conditional(bit, x(1)).unwrap();
        let grid = layout(&resolved(c));

        assert_eq!(grid.placements[1].column, 1);
        assert_eq!(grid.placements[2].column, 1);
        assert_eq!(
            grid.placements[2].kind,
            PlacementKind::CoPlaced { measure: 1 }
        );
        assert_eq!(grid.num_columns, 2);
    }

    #[test]
    fn test_same_wire_conditional_is_detached() {
        let mut c = Circuit::new();
        c.add_qreg("q", 1).unwrap();
        let bit = c.add_creg("c", 1).unwrap();
        c.measure(QubitId(0), bit).unwrap();
        c.conditional(bit, x(0)).unwrap();
        let grid = layout(&resolved(c));

        assert_eq!(grid.placements[0].column, 0);
        assert_eq!(grid.placements[1].column, 1);
        assert_eq!(
            grid.placements[1].kind,
            PlacementKind::Detached { measure: 0 }
        );
    }

    #[test]
    fn test_overlapping_siblings() {
        let mut c = Circuit::new();
        c.add_qreg("q", 3).unwrap();
        let bit = c.add_creg("c", 1).unwrap();
        c.measure(QubitId(0), bit).unwrap();
        c.conditional(bit, x(1)).unwrap();
        c.conditional(bit, x(2)).unwrap();
        c.conditional(bit, x(1)).unwrap();
        let grid = layout(&resolved(c));

        // Disjoint siblings join; the repeat on wire 1 cannot.
        assert_eq!(grid.placements[1].column, 0);
        assert_eq!(grid.placements[2].column, 0);
        assert_eq!(
            grid.placements[3].kind,
            PlacementKind::Detached { measure: 0 }
        );
        assert_eq!(grid.placements[3].column, 1);
        assert_eq!((grid.placements[3].lo, grid.placements[3].hi), (0, 1));
    }

    #[test]
    fn test_intervening_op_closes_group() {
        let mut c = Circuit::new();
        c.add_qreg("q", 2).unwrap();
        let bit = c.add_creg("c", 1).unwrap();
        c.measure(QubitId(0), bit).unwrap();
        c.h(QubitId(0)).unwrap();
        c.conditional(bit, x(1)).unwrap();
        let grid = layout(&resolved(c));

        assert_eq!(grid.placements[0].column, 0);
        assert_eq!(grid.placements[1].column, 1);
        assert_eq!(
            grid.placements[2].kind,
            PlacementKind::Detached { measure: 0 }
        );
        assert_eq!(grid.placements[2].column, 2);
    }

    #[test]
    fn test_ops_outside_group_keep_going() {
        let mut c = Circuit::new();
        c.add_qreg("q", 3).unwrap();
        let bit = c.add_creg("c", 1).unwrap();
        c.measure(QubitId(0), bit).unwrap();
        c.h(QubitId(1)).unwrap();
        c.h(QubitId(1)).unwrap();
        c.conditional(bit, x(2)).unwrap();
        let grid = layout(&resolved(c));

        // The group grows over wire 1, so it lands after both H gates.
        assert_eq!(grid.placements[1].column, 0);
        assert_eq!(grid.placements[2].column, 1);
        assert_eq!(grid.placements[0].column, 2);
        assert_eq!(grid.placements[3].column, 2);
    }

    #[test]
    fn test_remeasured_bit_links_to_latest() {
        let mut c = Circuit::new();
        c.add_qreg("q", 2).unwrap();
        let bit = c.add_creg("c", 1).unwrap();
        c.measure(QubitId(0), bit).unwrap();
        c.measure(QubitId(1), bit).unwrap();
        c.conditional(bit, x(0)).unwrap();
        let grid = layout(&resolved(c));

        assert_eq!(
            grid.placements[2].kind,
            PlacementKind::CoPlaced { measure: 1 }
        );
        assert_eq!(grid.placements[1].column, grid.placements[2].column);
        assert!(grid.placements[2].column > grid.placements[0].column);
    }

    #[test]
    fn test_barrier_aligns_wires() {
        let mut c = Circuit::new();
        c.add_qreg("q", 2).unwrap();
        c.h(QubitId(0)).unwrap();
        c.h(QubitId(0)).unwrap();
        c.barrier(vec![QubitId(0), QubitId(1)]).unwrap();
        c.h(QubitId(1)).unwrap();
        let grid = layout(&c);
        assert_eq!(grid.placements[2].column, 2);
        assert_eq!(grid.placements[3].column, 3);
    }

    #[test]
    fn test_barrier_leaves_unnamed_wires_free() {
        let mut c = Circuit::new();
        c.add_qreg("q", 3).unwrap();
        c.h(QubitId(1)).unwrap();
        c.barrier(vec![QubitId(0), QubitId(2)]).unwrap();
        c.h(QubitId(1)).unwrap();
        c.h(QubitId(0)).unwrap();
        let grid = layout(&c);
        assert_eq!(grid.placements[1].column, 0);
        assert_eq!(grid.placements[2].column, 1);
        assert_eq!(grid.placements[3].column, 1);
        assert_eq!(grid.num_columns, 2);
    }

    #[test]
    fn test_unlinked_conditional_places_normally() {
        let mut c = Circuit::new();
        c.add_qreg("q", 1).unwrap();
        c.add_creg("c", 1).unwrap();
        c.conditional(ClbitId(0), x(0)).unwrap();
        let grid = layout(&c);
        assert_eq!(grid.placements[0].kind, PlacementKind::Normal);
    }

    #[test]
    fn test_grid_serializes() {
        let mut c = Circuit::new();
        c.add_qreg("q", 1).unwrap();
        c.h(QubitId(0)).unwrap();
        let json = serde_json::to_string(&layout(&c)).unwrap();
        assert!(json.contains("\"kind\":\"normal\""));
    }
}
