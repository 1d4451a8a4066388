use cascade_mesh::{NodeIndex, Point};

use super::NodeValue;

/// How a node's value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveMethod {
    /// Trapezoidal solve along both characteristics.
    Characteristic,

    /// Midpoint average of the two predecessors, used when the 2×2 system
    /// is singular.
    Midpoint,

    /// `y` from the left boundary, `x` carried along the negative family.
    LeftEdge,

    /// `x` from the right boundary, `y` carried along the positive family.
    RightEdge,

    /// Average of the solved lattice neighbours.
    Interpolated,
}

/// Event emitted by the hyperbolic solver.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A node has been solved during the current pass.
    NodeSolved {
        index: NodeIndex,
        point: Point,
        value: NodeValue,
        method: SolveMethod,
    },
}
