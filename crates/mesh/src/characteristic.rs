use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::{EPS, Point, Rectangle};

/// A straight characteristic line clipped against a rectangular frame.
///
/// The line is `{(s0 + k·step, t0 + k·dt) : k ∈ ℝ}` through `center = (s0, t0)`.
/// Integer offsets `k` whose points fall inside the frame are the line's
/// internal nodes; the two points where the line exits the frame are its
/// boundary nodes, ordered by the propagation coordinate.
///
/// # Invariants
///
/// - Every internal node satisfies [`Rectangle::contains_point`].
/// - Every boundary node lies on an edge of the frame.
/// - The internal offsets form the contiguous range `k_left..=k_right`.
#[derive(Debug, Clone, PartialEq)]
pub struct Characteristic {
    center: Point,
    dt: f64,
    step: f64,
    internal: BTreeMap<i64, Point>,
    boundary: Option<(Point, Point)>,
    offsets: Option<(i64, i64)>,
}

impl Characteristic {
    /// Builds the characteristic through `center` with the given slope.
    ///
    /// # Algorithm
    ///
    /// 1. Intersect the line with the vertical edges (only when `|step| > ε`)
    ///    and the horizontal edges (only when `|dt| > ε`), accepting the
    ///    transverse coordinate within `ε` and snapping it onto the edge.
    /// 2. With no intersection, the characteristic misses the frame and stays
    ///    empty.
    /// 3. Otherwise the extreme intersections by `s` (then `t`) become the
    ///    boundary nodes.
    /// 4. Each boundary node's offset from the center is rounded to the
    ///    nearest integer, dividing by `step` when it is non-degenerate and by
    ///    `dt` otherwise.
    /// 5. Every integer offset between the two whose point lies in the frame
    ///    becomes an internal node.
    #[must_use]
    pub fn new(center: Point, dt: f64, step: f64, frame: &Rectangle) -> Self {
        let mut characteristic = Self {
            center,
            dt,
            step,
            internal: BTreeMap::new(),
            boundary: None,
            offsets: None,
        };

        let mut hits = characteristic.intersections(frame);
        if hits.is_empty() {
            return characteristic;
        }

        hits.sort_by(|a, b| a.s.total_cmp(&b.s).then(a.t.total_cmp(&b.t)));
        let left = hits[0];
        let right = hits[hits.len() - 1];
        characteristic.boundary = Some((left, right));

        let k_a = characteristic.offset_of(left);
        let k_b = characteristic.offset_of(right);
        for k in k_a.min(k_b)..=k_a.max(k_b) {
            let point = characteristic.point_at(k);
            if frame.contains_within(point, EPS) {
                characteristic.internal.insert(k, frame.snap(point, EPS));
            }
        }

        // An extreme node that coincides with an exit point is that exit point.
        let extremes = [
            characteristic.internal.keys().next().copied(),
            characteristic.internal.keys().next_back().copied(),
        ];
        for k in extremes.into_iter().flatten() {
            if let Some(node) = characteristic.internal.get_mut(&k) {
                if let Some(exit) = [left, right]
                    .into_iter()
                    .find(|exit| exit.approx_eq(*node, EPS))
                {
                    *node = exit;
                }
            }
        }

        characteristic.offsets = characteristic
            .internal
            .keys()
            .next()
            .zip(characteristic.internal.keys().next_back())
            .map(|(&lo, &hi)| (lo, hi));

        characteristic
    }

    /// Returns the node at offset `k`.
    ///
    /// Offsets below `k_left` clamp to the left boundary node and offsets above
    /// `k_right` clamp to the right boundary node, so callers reaching past the
    /// domain edge get the exit point instead of nothing. Returns `None` only
    /// when the characteristic has no internal nodes.
    #[must_use]
    pub fn node(&self, k: i64) -> Option<Point> {
        let (k_left, k_right) = self.offsets?;
        let (left, right) = self.boundary?;

        if k < k_left {
            Some(left)
        } else if k > k_right {
            Some(right)
        } else {
            self.internal.get(&k).copied()
        }
    }

    /// Returns the internal nodes keyed by offset.
    #[must_use]
    pub fn internal_nodes(&self) -> &BTreeMap<i64, Point> {
        &self.internal
    }

    /// Returns the `(left, right)` exit points, if the line crosses the frame.
    #[must_use]
    pub fn boundary_nodes(&self) -> Option<(Point, Point)> {
        self.boundary
    }

    /// Returns `k_left..=k_right`, if there are internal nodes.
    #[must_use]
    pub fn offset_range(&self) -> Option<RangeInclusive<i64>> {
        self.offsets.map(|(lo, hi)| lo..=hi)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Returns `dt / step`, the inverse of the propagation speed.
    #[must_use]
    pub fn slope(&self) -> f64 {
        self.dt / self.step
    }

    /// Returns the number of internal nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.internal.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.internal.is_empty()
    }

    fn point_at(&self, k: i64) -> Point {
        let k = k as f64;
        Point::new(self.center.s + k * self.step, self.center.t + k * self.dt)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn offset_of(&self, point: Point) -> i64 {
        if self.step.abs() > EPS {
            ((point.s - self.center.s) / self.step).round() as i64
        } else {
            ((point.t - self.center.t) / self.dt).round() as i64
        }
    }

    fn intersections(&self, frame: &Rectangle) -> Vec<Point> {
        let Point { s: s0, t: t0 } = self.center;
        let mut hits = Vec::with_capacity(4);

        if self.step.abs() > EPS {
            for edge in [frame.s0(), frame.s1()] {
                let t = t0 + (edge - s0) / self.step * self.dt;
                if frame.t0() - EPS <= t && t <= frame.t1() + EPS {
                    hits.push(frame.snap(Point::new(edge, t), EPS));
                }
            }
        }

        if self.dt.abs() > EPS {
            for edge in [frame.t0(), frame.t1()] {
                let s = s0 + (edge - t0) / self.dt * self.step;
                if frame.s0() - EPS <= s && s <= frame.s1() + EPS {
                    hits.push(frame.snap(Point::new(s, edge), EPS));
                }
            }
        }

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn frame() -> Rectangle {
        Rectangle::new([0.0, 10.0], [0.0, 5.0]).unwrap()
    }

    #[test]
    fn constant_time_line_hits_vertical_edges() {
        let frame = frame();
        let line = Characteristic::new(Point::new(5.0, 2.5), 0.0, 1.0, &frame);

        let (left, right) = line.boundary_nodes().expect("crosses the frame");
        assert_eq!(left, Point::new(0.0, 2.5));
        assert_eq!(right, Point::new(10.0, 2.5));
        assert_eq!(line.offset_range(), Some(-5..=5));
        assert_eq!(line.len(), 11);
    }

    #[test]
    fn constant_space_line_hits_horizontal_edges() {
        let frame = frame();
        let line = Characteristic::new(Point::new(5.0, 2.5), 1.0, 0.0, &frame);

        let (left, right) = line.boundary_nodes().expect("crosses the frame");
        assert_eq!(left, Point::new(5.0, 0.0));
        assert_eq!(right, Point::new(5.0, 5.0));
        // Offsets come from `dt` when `step` is degenerate.
        assert_eq!(line.offset_range(), Some(-2..=2));
    }

    #[test]
    fn diagonal_line_has_two_boundary_nodes_inside_the_frame() {
        let frame = frame();
        let line = Characteristic::new(Point::new(5.0, 2.5), 1.0, 1.0, &frame);

        let (left, right) = line.boundary_nodes().expect("crosses the frame");
        assert!(frame.contains_point(left));
        assert!(frame.contains_point(right));
        assert!(frame.on_boundary(left, EPS));
        assert!(frame.on_boundary(right, EPS));
        assert!(left.s < right.s);

        assert!(!line.is_empty());
        for node in line.internal_nodes().values() {
            assert!(frame.contains_point(*node));
        }
    }

    #[test]
    fn decreasing_time_line_orders_boundary_by_space() {
        let frame = frame();
        let line = Characteristic::new(Point::new(5.0, 2.5), -0.25, 0.5, &frame);

        let (left, right) = line.boundary_nodes().unwrap();
        assert_relative_eq!(left.s, 0.0);
        assert_relative_eq!(left.t, 5.0);
        assert_relative_eq!(right.s, 10.0);
        assert_relative_eq!(right.t, 0.0);
    }

    #[test]
    fn line_outside_the_frame_is_empty() {
        let frame = frame();
        let line = Characteristic::new(Point::new(10.0, 16.0), 1.0, 1.0, &frame);

        assert_eq!(line.boundary_nodes(), None);
        assert!(line.internal_nodes().is_empty());
        assert_eq!(line.offset_range(), None);
        assert_eq!(line.node(0), None);
    }

    #[test]
    fn node_clamps_to_boundary_outside_the_offset_range() {
        let frame = frame();
        // Passes exactly through the corners (0, 0) and (10, 5).
        let line = Characteristic::new(Point::new(5.0, 2.5), 0.5, 1.0, &frame);

        let (left, right) = line.boundary_nodes().unwrap();
        assert_eq!(left, Point::new(0.0, 0.0));
        assert_eq!(right, Point::new(10.0, 5.0));
        assert_eq!(line.offset_range(), Some(-5..=5));

        // Nodes at the extreme offsets coincide with the boundary nodes.
        assert_eq!(line.node(-5), Some(left));
        assert_eq!(line.node(5), Some(right));

        // Beyond the range the boundary node is returned.
        assert_eq!(line.node(-6), Some(left));
        assert_eq!(line.node(-100), Some(left));
        assert_eq!(line.node(6), Some(right));

        assert_eq!(line.node(1), Some(Point::new(6.0, 3.0)));
    }

    #[test]
    fn slope_is_time_per_space_step() {
        let frame = frame();
        let line = Characteristic::new(Point::new(5.0, 2.5), 0.25, 0.5, &frame);

        assert_relative_eq!(line.slope(), 0.5);
        assert_eq!(line.center(), Point::new(5.0, 2.5));
        assert_relative_eq!(line.dt(), 0.25);
        assert_relative_eq!(line.step(), 0.5);
    }
}
