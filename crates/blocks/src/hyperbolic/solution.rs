use std::collections::BTreeMap;

use cascade_mesh::{CharacteristicMesh, NodeIndex};
use serde::{Deserialize, Serialize};

use super::SolveMethod;

/// The solved unknowns at one lattice node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeValue {
    pub x: f64,
    pub y: f64,
}

impl NodeValue {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the component-wise average of two values.
    #[must_use]
    pub fn midpoint(a: Self, b: Self) -> Self {
        Self::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }
}

/// Node values keyed by lattice index.
pub type Solution = BTreeMap<NodeIndex, NodeValue>;

/// Indicates how a solve pass terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every node up to the requested time was solved.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// Number of nodes solved by each method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodCounts {
    pub characteristic: usize,
    pub midpoint: usize,
    pub left_edge: usize,
    pub right_edge: usize,
    pub interpolated: usize,
}

impl MethodCounts {
    pub(super) fn record(&mut self, method: SolveMethod) {
        let count = match method {
            SolveMethod::Characteristic => &mut self.characteristic,
            SolveMethod::Midpoint => &mut self.midpoint,
            SolveMethod::LeftEdge => &mut self.left_edge,
            SolveMethod::RightEdge => &mut self.right_edge,
            SolveMethod::Interpolated => &mut self.interpolated,
        };
        *count += 1;
    }

    pub(super) fn absorb(&mut self, other: MethodCounts) {
        self.characteristic += other.characteristic;
        self.midpoint += other.midpoint;
        self.left_edge += other.left_edge;
        self.right_edge += other.right_edge;
        self.interpolated += other.interpolated;
    }

    /// Returns the number of nodes solved by any method.
    #[must_use]
    pub fn total(&self) -> usize {
        self.characteristic + self.midpoint + self.left_edge + self.right_edge + self.interpolated
    }

    /// Returns the number of nodes solved at a domain edge.
    #[must_use]
    pub fn edge(&self) -> usize {
        self.left_edge + self.right_edge
    }
}

/// Summary of one solve pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// How the pass terminated.
    pub status: Status,

    /// Time up to which the lattice is solved after the pass.
    pub frontier: f64,

    /// Nodes solved during the pass, by method.
    pub counts: MethodCounts,
}

/// Cumulative solver statistics since the last initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Number of completed or stopped passes.
    pub passes: usize,

    /// Nodes solved across all passes, by method.
    pub counts: MethodCounts,
}

impl Diagnostics {
    /// Returns the number of singular systems that fell back to the midpoint
    /// average.
    #[must_use]
    pub fn singular_fallbacks(&self) -> usize {
        self.counts.midpoint
    }
}

/// Result of [`HyperbolicBlock::step`](super::HyperbolicBlock::step).
#[derive(Debug)]
pub struct StepOutput<'a> {
    pub solution: &'a Solution,
    pub mesh: &'a CharacteristicMesh,
    pub report: StepReport,
}
