use serde::{Deserialize, Serialize};

use crate::{MeshError, Point};

/// An axis-aligned region `[S0, S1] × [T0, T1]` of the space-time plane.
///
/// All containment tests treat the boundary as part of the region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    s0: f64,
    s1: f64,
    t0: f64,
    t1: f64,
}

impl Rectangle {
    /// Creates a rectangle from `[S0, S1]` and `[T0, T1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if any bound is non-finite or if a lower bound exceeds
    /// its upper bound.
    pub fn new(s: [f64; 2], t: [f64; 2]) -> Result<Self, MeshError> {
        let [s0, s1] = s;
        let [t0, t1] = t;

        if ![s0, s1, t0, t1].iter().all(|v| v.is_finite()) {
            return Err(MeshError::NonFiniteBounds);
        }
        if s0 > s1 {
            return Err(MeshError::ReversedBounds {
                axis: "S",
                lower: s0,
                upper: s1,
            });
        }
        if t0 > t1 {
            return Err(MeshError::ReversedBounds {
                axis: "T",
                lower: t0,
                upper: t1,
            });
        }

        Ok(Self { s0, s1, t0, t1 })
    }

    #[must_use]
    pub fn s0(&self) -> f64 {
        self.s0
    }

    #[must_use]
    pub fn s1(&self) -> f64 {
        self.s1
    }

    #[must_use]
    pub fn t0(&self) -> f64 {
        self.t0
    }

    #[must_use]
    pub fn t1(&self) -> f64 {
        self.t1
    }

    /// Returns the spatial extent `S1 − S0`.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.s1 - self.s0
    }

    /// Returns the temporal extent `T1 − T0`.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.t1 - self.t0
    }

    /// Returns the center `((S0 + S1) / 2, (T0 + T1) / 2)`.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.s0 + self.s1) / 2.0, (self.t0 + self.t1) / 2.0)
    }

    /// Returns `true` if `S0 ≤ s ≤ S1` and `T0 ≤ t ≤ T1`.
    #[must_use]
    pub fn contains(&self, s: f64, t: f64) -> bool {
        self.s0 <= s && s <= self.s1 && self.t0 <= t && t <= self.t1
    }

    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        self.contains(point.s, point.t)
    }

    /// Inclusive containment with every edge pushed outward by `eps`.
    #[must_use]
    pub fn contains_within(&self, point: Point, eps: f64) -> bool {
        self.s0 - eps <= point.s
            && point.s <= self.s1 + eps
            && self.t0 - eps <= point.t
            && point.t <= self.t1 + eps
    }

    /// Returns `true` if the point is farther than `eps` from every edge.
    #[must_use]
    pub fn contains_strictly(&self, point: Point, eps: f64) -> bool {
        self.s0 + eps < point.s
            && point.s < self.s1 - eps
            && self.t0 + eps < point.t
            && point.t < self.t1 - eps
    }

    /// Snaps a point onto the closed rectangle.
    #[must_use]
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.s.clamp(self.s0, self.s1),
            point.t.clamp(self.t0, self.t1),
        )
    }

    /// Snaps each coordinate lying within `eps` of an edge exactly onto that
    /// edge, then clamps the point onto the closed rectangle.
    #[must_use]
    pub fn snap(&self, point: Point, eps: f64) -> Point {
        let snap_to = |value: f64, lower: f64, upper: f64| {
            if (value - lower).abs() < eps {
                lower
            } else if (value - upper).abs() < eps {
                upper
            } else {
                value.clamp(lower, upper)
            }
        };
        Point::new(
            snap_to(point.s, self.s0, self.s1),
            snap_to(point.t, self.t0, self.t1),
        )
    }

    /// Returns `true` if the point lies on the `S0` edge, within `eps`.
    #[must_use]
    pub fn on_left_edge(&self, point: Point, eps: f64) -> bool {
        (point.s - self.s0).abs() < eps
    }

    /// Returns `true` if the point lies on the `S1` edge, within `eps`.
    #[must_use]
    pub fn on_right_edge(&self, point: Point, eps: f64) -> bool {
        (point.s - self.s1).abs() < eps
    }

    /// Returns `true` if the point lies on the initial `T0` slice, within `eps`.
    #[must_use]
    pub fn on_initial_edge(&self, point: Point, eps: f64) -> bool {
        (point.t - self.t0).abs() < eps
    }

    /// Returns `true` if the point lies on any of the four edges, within `eps`.
    #[must_use]
    pub fn on_boundary(&self, point: Point, eps: f64) -> bool {
        self.contains_within(point, eps)
            && (self.on_left_edge(point, eps)
                || self.on_right_edge(point, eps)
                || self.on_initial_edge(point, eps)
                || (point.t - self.t1).abs() < eps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::EPS;

    fn frame() -> Rectangle {
        Rectangle::new([0.0, 10.0], [0.0, 5.0]).unwrap()
    }

    #[test]
    fn contains_is_inclusive_on_every_edge() {
        let frame = frame();

        for (s, t) in [
            (0.0, 0.0),
            (10.0, 0.0),
            (0.0, 5.0),
            (10.0, 5.0),
            (0.0, 2.5),
            (10.0, 2.5),
            (5.0, 0.0),
            (5.0, 5.0),
            (3.3, 4.1),
        ] {
            assert!(frame.contains(s, t), "({s}, {t}) should be inside");
        }

        assert!(!frame.contains(-1e-12, 2.0));
        assert!(!frame.contains(5.0, 5.0 + 1e-12));
    }

    #[test]
    fn center_is_midpoint() {
        assert_eq!(frame().center(), Point::new(5.0, 2.5));
    }

    #[test]
    fn rejects_invalid_bounds() {
        assert_eq!(
            Rectangle::new([1.0, 0.0], [0.0, 1.0]),
            Err(MeshError::ReversedBounds {
                axis: "S",
                lower: 1.0,
                upper: 0.0
            })
        );
        assert!(matches!(
            Rectangle::new([0.0, 1.0], [2.0, 1.0]),
            Err(MeshError::ReversedBounds { axis: "T", .. })
        ));
        assert_eq!(
            Rectangle::new([0.0, f64::NAN], [0.0, 1.0]),
            Err(MeshError::NonFiniteBounds)
        );
    }

    #[test]
    fn tolerant_and_strict_containment() {
        let frame = frame();
        let just_outside = Point::new(-1e-12, 1.0);

        assert!(!frame.contains_point(just_outside));
        assert!(frame.contains_within(just_outside, EPS));
        assert_eq!(frame.clamp(just_outside), Point::new(0.0, 1.0));

        assert!(frame.contains_strictly(Point::new(5.0, 2.5), EPS));
        assert!(!frame.contains_strictly(Point::new(0.0, 2.5), EPS));
    }

    #[test]
    fn edge_predicates() {
        let frame = frame();

        assert!(frame.on_left_edge(Point::new(0.0, 3.0), EPS));
        assert!(frame.on_right_edge(Point::new(10.0, 3.0), EPS));
        assert!(frame.on_initial_edge(Point::new(4.0, 0.0), EPS));
        assert!(frame.on_boundary(Point::new(4.0, 5.0), EPS));
        assert!(!frame.on_boundary(Point::new(4.0, 2.0), EPS));
    }

    #[test]
    fn snap_moves_near_edge_coordinates_onto_the_edge() {
        let frame = frame();

        let inside = frame.snap(Point::new(2.0e-17, 5.0 - 1e-13), EPS);
        assert_eq!(inside, Point::new(0.0, 5.0));

        let outside = frame.snap(Point::new(10.0 + 1e-12, -1e-12), EPS);
        assert_eq!(outside, Point::new(10.0, 0.0));

        let interior = Point::new(3.0, 1e-6);
        assert_eq!(frame.snap(interior, EPS), interior);
    }
}
