use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in the `(s, t)` plane.
///
/// `s` is the propagation coordinate and `t` is time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub s: f64,
    pub t: f64,
}

impl Point {
    #[must_use]
    pub const fn new(s: f64, t: f64) -> Self {
        Self { s, t }
    }

    /// Returns `true` if both coordinates differ by less than `eps`.
    #[must_use]
    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self.s - other.s).abs() < eps && (self.t - other.t).abs() < eps
    }
}

impl From<(f64, f64)> for Point {
    fn from((s, t): (f64, f64)) -> Self {
        Self { s, t }
    }
}

/// Integer address of a lattice node.
///
/// `i` counts steps along the positive family index, `j` along the negative
/// family index. Ordering is lexicographic by `(i, j)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex {
    pub i: i64,
    pub j: i64,
}

impl NodeIndex {
    #[must_use]
    pub const fn new(i: i64, j: i64) -> Self {
        Self { i, j }
    }

    /// Returns the index shifted by `(di, dj)`.
    #[must_use]
    pub const fn offset(self, di: i64, dj: i64) -> Self {
        Self {
            i: self.i + di,
            j: self.j + dj,
        }
    }
}

impl From<(i64, i64)> for NodeIndex {
    fn from((i, j): (i64, i64)) -> Self {
        Self { i, j }
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_compares_both_coordinates() {
        let point = Point::new(1.0, 0.25);

        assert!(point.approx_eq(Point::new(1.0 + 1e-12, 0.25 - 1e-12), 1e-10));
        assert!(!point.approx_eq(Point::new(1.0, 0.2501), 1e-10));
        assert!(!point.approx_eq(Point::new(1.0001, 0.25), 1e-10));
    }

    #[test]
    fn index_ordering_is_lexicographic() {
        let mut indices = vec![
            NodeIndex::new(1, -1),
            NodeIndex::new(-1, 2),
            NodeIndex::new(0, 0),
            NodeIndex::new(-1, -1),
        ];
        indices.sort();

        assert_eq!(
            indices,
            vec![
                NodeIndex::new(-1, -1),
                NodeIndex::new(-1, 2),
                NodeIndex::new(0, 0),
                NodeIndex::new(1, -1),
            ]
        );
    }

    #[test]
    fn offset_and_display() {
        let index = NodeIndex::from((2, -3)).offset(-1, 1);

        assert_eq!(index, NodeIndex::new(1, -2));
        assert_eq!(index.to_string(), "(1, -2)");
    }
}
