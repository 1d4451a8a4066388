use std::collections::BTreeSet;

use cascade_core::{History, Observer};
use cascade_mesh::{CharacteristicMesh, EPS, NodeIndex, Point};
use nalgebra::{Matrix2, Vector2};

use super::{Action, Event, HyperbolicConfig, MethodCounts, NodeValue, Solution, SolveMethod, Status};

/// Determinant magnitude below which the node system counts as singular.
const SINGULAR_TOL: f64 = 1e-12;

/// Everything a solve pass reads but does not modify.
pub(super) struct Pass<'a> {
    pub config: &'a HyperbolicConfig,
    pub mesh: &'a CharacteristicMesh,
    /// Mesh nodes in causal order.
    pub order: &'a [(NodeIndex, Point)],
    pub left_input: &'a History,
    pub right_input: &'a History,
}

/// What a pass accomplished.
pub(super) struct PassOutcome {
    pub status: Status,
    pub counts: MethodCounts,
    /// Time of the last node solved, if any.
    pub reached: Option<f64>,
}

impl Pass<'_> {
    /// Returns the left boundary value at `t`: the configured signal, then
    /// the connection input.
    pub fn left_value(&self, t: f64) -> Option<f64> {
        match &self.config.left_boundary {
            Some(f) => Some(f(t)),
            None => self.left_input.value_at(t),
        }
    }

    /// Returns the right boundary value at `t`.
    pub fn right_value(&self, t: f64) -> Option<f64> {
        match &self.config.right_boundary {
            Some(f) => Some(f(t)),
            None => self.right_input.value_at(t),
        }
    }

    /// Pins the boundary values of the edge nodes at time `t`.
    ///
    /// Nodes on the `S0` edge get `y` from the left boundary and nodes on the
    /// `S1` edge get `x` from the right boundary. Without a boundary source
    /// the node keeps its value.
    pub fn apply_boundaries(&self, values: &mut Solution, t: f64) {
        let frame = self.mesh.frame();
        let left = self.left_value(t);
        let right = self.right_value(t);

        for &(index, point) in self.order {
            if (point.t - t).abs() >= EPS {
                continue;
            }
            let value = values.entry(index).or_default();
            if let (true, Some(y)) = (frame.on_left_edge(point, EPS), left) {
                value.y = y;
            }
            if let (true, Some(x)) = (frame.on_right_edge(point, EPS), right) {
                value.x = x;
            }
        }
    }

    /// Solves every unsolved node up to `t_end`, in causal order.
    pub fn run<O>(
        &self,
        values: &mut Solution,
        solved: &mut BTreeSet<NodeIndex>,
        t_end: f64,
        mut observer: O,
    ) -> PassOutcome
    where
        O: Observer<Event, Action>,
    {
        let mut counts = MethodCounts::default();
        let mut reached = None;

        for &(index, point) in self.order {
            if point.t > t_end + EPS {
                break;
            }
            if solved.contains(&index) {
                continue;
            }

            let (value, method) = self.solve_node(index, point, values, solved);
            values.insert(index, value);
            solved.insert(index);
            counts.record(method);
            reached = Some(point.t);
            log::trace!("node {index} at {point:?}: {value:?} ({method:?})");

            let event = Event::NodeSolved {
                index,
                point,
                value,
                method,
            };
            if let Some(Action::StopEarly) = observer.observe(&event) {
                return PassOutcome {
                    status: Status::StoppedByObserver,
                    counts,
                    reached,
                };
            }
        }

        PassOutcome {
            status: Status::Complete,
            counts,
            reached,
        }
    }

    fn solve_node(
        &self,
        index: NodeIndex,
        point: Point,
        values: &Solution,
        solved: &BTreeSet<NodeIndex>,
    ) -> (NodeValue, SolveMethod) {
        let known = |entry: Option<(NodeIndex, Point)>| {
            entry
                .filter(|(k, _)| solved.contains(k))
                .map(|(k, p)| (p, values.get(&k).copied().unwrap_or_default()))
        };

        let preceding = self.mesh.preceding_nodes(index.i, index.j);
        let left = known(preceding.left);
        let right = known(preceding.right);
        let previous = values.get(&index).copied().unwrap_or_default();
        let frame = self.mesh.frame();

        match (left, right) {
            (Some(left), Some(right)) => characteristic_solve(self.config, point, left, right),
            _ if frame.on_left_edge(point, EPS) => {
                let x = right.map_or(previous.x, |(_, value)| value.x);
                let y = self.left_value(point.t).unwrap_or(previous.y);
                (NodeValue::new(x, y), SolveMethod::LeftEdge)
            }
            _ if frame.on_right_edge(point, EPS) => {
                let x = self.right_value(point.t).unwrap_or(previous.x);
                let y = left.map_or(previous.y, |(_, value)| value.y);
                (NodeValue::new(x, y), SolveMethod::RightEdge)
            }
            _ => (
                neighbour_average(index, values, solved),
                SolveMethod::Interpolated,
            ),
        }
    }
}

/// Solves the trapezoidal characteristic system at `point`.
///
/// `x` is integrated from the right predecessor along the negative family and
/// `y` from the left predecessor along the positive family:
///
/// ```text
/// ⎡1 − hr/2·B11    −hr/2·B12⎤ ⎡x⎤   ⎡xr + hr/2·(B11ʳ·xr + B12ʳ·yr + F1 + F1ʳ)⎤
/// ⎣  −hl/2·B21   1 − hl/2·B22⎦ ⎣y⎦ = ⎣yl + hl/2·(B21ˡ·xl + B22ˡ·yl + F2 + F2ˡ)⎦
/// ```
///
/// A singular matrix falls back to the midpoint of the two predecessors.
pub(super) fn characteristic_solve(
    config: &HyperbolicConfig,
    point: Point,
    (left_point, left): (Point, NodeValue),
    (right_point, right): (Point, NodeValue),
) -> (NodeValue, SolveMethod) {
    let hl = point.t - left_point.t;
    let hr = point.t - right_point.t;

    let [[b11, b12], [b21, b22]] = config.coefficients(point.s, point.t);
    let [f1, f2] = config.forcing(point.s, point.t);
    let [[r11, r12], _] = config.coefficients(right_point.s, right_point.t);
    let [r_f1, _] = config.forcing(right_point.s, right_point.t);
    let [_, [l21, l22]] = config.coefficients(left_point.s, left_point.t);
    let [_, l_f2] = config.forcing(left_point.s, left_point.t);

    let a = Matrix2::new(
        1.0 - hr / 2.0 * b11,
        -hr / 2.0 * b12,
        -hl / 2.0 * b21,
        1.0 - hl / 2.0 * b22,
    );
    let b = Vector2::new(
        right.x + hr / 2.0 * (r11 * right.x + r12 * right.y + f1 + r_f1),
        left.y + hl / 2.0 * (l21 * left.x + l22 * left.y + f2 + l_f2),
    );

    let solution = if a.determinant().abs() < SINGULAR_TOL {
        None
    } else {
        a.try_inverse().map(|inverse| inverse * b)
    };

    match solution {
        Some(v) => (NodeValue::new(v[0], v[1]), SolveMethod::Characteristic),
        None => {
            log::warn!(
                "singular characteristic system at {point:?}; using the midpoint of the predecessors"
            );
            (NodeValue::midpoint(left, right), SolveMethod::Midpoint)
        }
    }
}

/// Averages the solved nodes among the eight lattice neighbours of `index`.
///
/// Returns zero when no neighbour has been solved.
pub(super) fn neighbour_average(
    index: NodeIndex,
    values: &Solution,
    solved: &BTreeSet<NodeIndex>,
) -> NodeValue {
    let mut sum = NodeValue::default();
    let mut count = 0_u32;

    for di in -1..=1 {
        for dj in -1..=1 {
            if di == 0 && dj == 0 {
                continue;
            }
            let neighbour = index.offset(di, dj);
            if !solved.contains(&neighbour) {
                continue;
            }
            if let Some(value) = values.get(&neighbour) {
                sum.x += value.x;
                sum.y += value.y;
                count += 1;
            }
        }
    }

    if count == 0 {
        return NodeValue::default();
    }
    let n = f64::from(count);
    NodeValue::new(sum.x / n, sum.y / n)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use cascade_mesh::MeshConfig;

    use crate::hyperbolic::Coefficients;

    fn config(coefficients: Coefficients) -> HyperbolicConfig {
        let mesh = MeshConfig::with_node_count([0.0, 1.0], [0.0, 1.0], [1.0, 1.0], 2);
        HyperbolicConfig::linear(mesh, coefficients).unwrap()
    }

    fn predecessors() -> ((Point, NodeValue), (Point, NodeValue)) {
        (
            (Point::new(0.25, 0.75), NodeValue::new(0.0, 2.0)),
            (Point::new(0.75, 0.75), NodeValue::new(1.0, 0.0)),
        )
    }

    #[test]
    fn zero_coefficients_carry_values_along_characteristics() {
        let (left, right) = predecessors();
        let (value, method) =
            characteristic_solve(&config(Coefficients::default()), Point::new(0.5, 1.0), left, right);

        assert_eq!(method, SolveMethod::Characteristic);
        assert_relative_eq!(value.x, 1.0);
        assert_relative_eq!(value.y, 2.0);
    }

    #[test]
    fn decay_follows_the_trapezoidal_rule() {
        let (left, right) = predecessors();
        let config = config(Coefficients {
            b11: -1.0,
            ..Coefficients::default()
        });

        let (value, _) = characteristic_solve(&config, Point::new(0.5, 1.0), left, right);

        // x₁ = x₀·(1 − h/2)/(1 + h/2) with h = 0.25.
        assert_relative_eq!(value.x, 0.875 / 1.125, epsilon = 1e-14);
        assert_relative_eq!(value.y, 2.0);
    }

    #[test]
    fn forcing_is_averaged_over_the_step() {
        let (left, right) = predecessors();
        let config = config(Coefficients {
            f1: 2.0,
            f2: -4.0,
            ..Coefficients::default()
        });

        let (value, _) = characteristic_solve(&config, Point::new(0.5, 1.0), left, right);

        assert_relative_eq!(value.x, 1.0 + 0.25 * 2.0);
        assert_relative_eq!(value.y, 2.0 - 0.25 * 4.0);
    }

    #[test]
    fn singular_system_falls_back_to_midpoint() {
        let (left, right) = predecessors();
        // 1 − hr/2·B11 = 0 with hr = 0.25.
        let config = config(Coefficients {
            b11: 8.0,
            ..Coefficients::default()
        });

        let (value, method) = characteristic_solve(&config, Point::new(0.5, 1.0), left, right);

        assert_eq!(method, SolveMethod::Midpoint);
        assert_eq!(value, NodeValue::new(0.5, 1.0));
    }

    #[test]
    fn neighbour_average_uses_solved_neighbours_only() {
        let mut values = Solution::new();
        let mut solved = BTreeSet::new();
        for (index, value) in [
            ((0, 1), NodeValue::new(2.0, 4.0)),
            ((-1, -1), NodeValue::new(4.0, 0.0)),
            ((1, 0), NodeValue::new(100.0, 100.0)),
            ((0, 2), NodeValue::new(-7.0, -7.0)),
        ] {
            values.insert(NodeIndex::from(index), value);
        }
        solved.insert(NodeIndex::new(0, 1));
        solved.insert(NodeIndex::new(-1, -1));
        // (0, 2) is solved but not a neighbour; (1, 0) is a neighbour but unsolved.
        solved.insert(NodeIndex::new(0, 2));

        let value = neighbour_average(NodeIndex::new(0, 0), &values, &solved);
        assert_eq!(value, NodeValue::new(3.0, 2.0));
    }

    #[test]
    fn neighbour_average_defaults_to_zero() {
        let value = neighbour_average(NodeIndex::new(0, 0), &Solution::new(), &BTreeSet::new());
        assert_eq!(value, NodeValue::default());
    }
}
