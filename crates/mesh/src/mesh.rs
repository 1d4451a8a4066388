use std::collections::BTreeMap;

use crate::{Characteristic, Discretization, EPS, MeshConfig, MeshError, NodeIndex, Point, Rectangle};

/// The causal predecessors of a lattice node.
///
/// Each entry is one step back in time along a characteristic family:
///
/// - `right` is `(i + 1, j)`, reached backward along the negative family. It
///   lies one `ds` to the right and `dt1` earlier, and carries the first
///   unknown.
/// - `left` is `(i, j − 1)`, reached backward along the positive family. It
///   lies one `ds` to the left and `dt2` earlier, and carries the second
///   unknown.
/// - `center` is `(i + 1, j − 1)`, the diagonal predecessor at the same `s`,
///   `dt1 + dt2` earlier.
///
/// A predecessor outside the mesh is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Preceding {
    pub left: Option<(NodeIndex, Point)>,
    pub right: Option<(NodeIndex, Point)>,
    pub center: Option<(NodeIndex, Point)>,
}

/// A characteristic lattice over a rectangular space-time domain.
///
/// Two families of characteristics fan out from the domain center: the
/// negative family (keyed by `j`, slope `−dt1` per `ds`) and the positive
/// family (keyed by `i`, slope `dt2` per `ds`). Their crossings are the nodes
/// `(i, j)` with coordinates
///
/// ```text
/// s = s0 + (i + j)·ds
/// t = t0 − i·dt1 + j·dt2
/// ```
///
/// Nodes are stored in an explicit integer index table; only nodes inside the
/// domain are kept. The mesh is immutable once built.
#[derive(Debug, Clone)]
pub struct CharacteristicMesh {
    frame: Rectangle,
    discretization: Discretization,
    positive: BTreeMap<i64, Characteristic>,
    negative: BTreeMap<i64, Characteristic>,
    nodes: BTreeMap<NodeIndex, Point>,
}

impl CharacteristicMesh {
    /// Builds the mesh for `frame` with the given discretization.
    #[must_use]
    pub fn new(frame: Rectangle, discretization: Discretization) -> Self {
        let center = frame.center();
        let ds = discretization.ds();
        let dt1 = discretization.dt1();
        let dt2 = discretization.dt2();

        let negative: BTreeMap<_, _> = discretization
            .j_range()
            .filter_map(|j| {
                let jf = j as f64;
                let origin = Point::new(center.s + jf * ds, center.t + jf * dt2);
                let line = Characteristic::new(origin, -dt1, ds, &frame);
                (!line.is_empty()).then_some((j, line))
            })
            .collect();

        let positive: BTreeMap<_, _> = discretization
            .i_range()
            .filter_map(|i| {
                let fi = i as f64;
                let origin = Point::new(center.s + fi * ds, center.t - fi * dt1);
                let line = Characteristic::new(origin, dt2, ds, &frame);
                (!line.is_empty()).then_some((i, line))
            })
            .collect();

        let mut nodes = BTreeMap::new();
        for i in discretization.i_range() {
            for j in discretization.j_range() {
                let point = Point::new(
                    center.s + (i + j) as f64 * ds,
                    center.t - i as f64 * dt1 + j as f64 * dt2,
                );
                if frame.contains_within(point, EPS) {
                    nodes.insert(NodeIndex::new(i, j), frame.snap(point, EPS));
                }
            }
        }

        log::debug!(
            "built characteristic mesh: {} positive, {} negative characteristics, {} nodes",
            positive.len(),
            negative.len(),
            nodes.len(),
        );

        Self {
            frame,
            discretization,
            positive,
            negative,
            nodes,
        }
    }

    /// Builds the mesh described by a key/value configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds are invalid, the speeds are not positive,
    /// or the configuration does not give exactly one of `m` and `h`.
    pub fn from_config(config: &MeshConfig) -> Result<Self, MeshError> {
        let frame = config.frame()?;
        let discretization = Discretization::new(&frame, config.c, config.resolution()?)?;
        Ok(Self::new(frame, discretization))
    }

    #[must_use]
    pub fn frame(&self) -> &Rectangle {
        &self.frame
    }

    #[must_use]
    pub fn discretization(&self) -> &Discretization {
        &self.discretization
    }

    /// Returns the domain center, which is node `(0, 0)`.
    #[must_use]
    pub fn center(&self) -> Point {
        self.frame.center()
    }

    /// Returns the coordinate of node `(i, j)`, if it lies in the domain.
    #[must_use]
    pub fn node(&self, i: i64, j: i64) -> Option<Point> {
        self.nodes.get(&NodeIndex::new(i, j)).copied()
    }

    /// Returns every node of the mesh, boundary edges included.
    #[must_use]
    pub fn nodes(&self) -> &BTreeMap<NodeIndex, Point> {
        &self.nodes
    }

    /// Returns `true` if `(i, j)` is a node of the mesh.
    #[must_use]
    pub fn contains_node(&self, index: NodeIndex) -> bool {
        self.nodes.contains_key(&index)
    }

    /// Returns the nodes lying strictly inside the domain, away from all edges.
    pub fn interior_nodes(&self) -> impl Iterator<Item = (NodeIndex, Point)> + '_ {
        self.nodes
            .iter()
            .filter(|(_, point)| self.frame.contains_strictly(**point, EPS))
            .map(|(&index, &point)| (index, point))
    }

    /// Returns every node sorted by ascending time, ties broken by index.
    ///
    /// Visiting nodes in this order guarantees each node's predecessors are
    /// visited first.
    #[must_use]
    pub fn nodes_by_time(&self) -> Vec<(NodeIndex, Point)> {
        let mut ordered: Vec<_> = self.nodes.iter().map(|(&k, &v)| (k, v)).collect();
        ordered.sort_by(|a, b| a.1.t.total_cmp(&b.1.t).then(a.0.cmp(&b.0)));
        ordered
    }

    /// Returns the causal predecessors of node `(i, j)`.
    #[must_use]
    pub fn preceding_nodes(&self, i: i64, j: i64) -> Preceding {
        let lookup = |index: NodeIndex| self.nodes.get(&index).map(|&point| (index, point));
        let index = NodeIndex::new(i, j);

        Preceding {
            left: lookup(index.offset(0, -1)),
            right: lookup(index.offset(1, 0)),
            center: lookup(index.offset(1, -1)),
        }
    }

    /// Returns the distinct points where the characteristics exit the domain.
    ///
    /// Positive-family exits come first, then negative-family exits, each in
    /// index order.
    #[must_use]
    pub fn boundary_nodes(&self) -> Vec<Point> {
        let mut points: Vec<Point> = Vec::new();
        for line in self.positive.values().chain(self.negative.values()) {
            if let Some((left, right)) = line.boundary_nodes() {
                for point in [left, right] {
                    if !points.contains(&point) {
                        points.push(point);
                    }
                }
            }
        }
        points
    }

    /// Returns the positive-family characteristics keyed by `i`.
    #[must_use]
    pub fn positive_characteristics(&self) -> &BTreeMap<i64, Characteristic> {
        &self.positive
    }

    /// Returns the negative-family characteristics keyed by `j`.
    #[must_use]
    pub fn negative_characteristics(&self) -> &BTreeMap<i64, Characteristic> {
        &self.negative
    }
}
