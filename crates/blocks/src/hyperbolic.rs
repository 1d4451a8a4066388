//! Distributed block for two-equation hyperbolic systems.
//!
//! A [`HyperbolicBlock`] solves
//!
//! ```text
//! dx/dt = B11·x + B12·y + F1   along ds/dt = −C1
//! dy/dt = B21·x + B22·y + F2   along ds/dt = +C2
//! ```
//!
//! by the method of characteristics on a [`CharacteristicMesh`]. Each call to
//! [`HyperbolicBlock::step`] pins the boundary values at the start of the
//! interval and then solves every node up to the end of it in ascending time
//! order, so each node's predecessors are solved before the node itself.
//!
//! # Example
//!
//! ```
//! use cascade_blocks::{HyperbolicBlock, HyperbolicConfig};
//! use cascade_mesh::MeshConfig;
//!
//! let mesh = MeshConfig::with_node_count([0.0, 1.0], [0.0, 1.0], [1.0, 1.0], 4);
//! let config = HyperbolicConfig::new(mesh)
//!     .unwrap()
//!     .with_initial_x(|s| s)
//!     .with_left_boundary(|t| t.sin());
//!
//! let mut block = HyperbolicBlock::new("line", config);
//! block.initialize().unwrap();
//! let output = block.step(0.0, 0.5).unwrap();
//!
//! assert!(output.report.counts.total() > 0);
//! ```

mod action;
mod config;
mod event;
mod presets;
mod solution;
mod solver;

pub use action::Action;
pub use config::{CurveFn, FieldFn, HyperbolicConfig};
pub use event::{Event, SolveMethod};
pub use presets::Coefficients;
pub use solution::{
    Diagnostics, MethodCounts, NodeValue, Solution, Status, StepOutput, StepReport,
};

use std::collections::BTreeSet;

use cascade_core::{Block, History, Inputs, Observer};
use cascade_mesh::{CharacteristicMesh, EPS, NodeIndex, Point, Preceding};

use crate::Error;

use solver::Pass;

/// Where a [`HyperbolicBlock`] is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// Created, nothing built yet.
    Uninitialized,

    /// The mesh is built but holds no solution.
    MeshBuilt,

    /// Initial values are set and no pass has run.
    Initialized,

    /// At least one pass has run.
    Stepping,
}

/// A distributed block governed by a hyperbolic system.
///
/// Output ports `left.x`, `left.y`, `right.x` and `right.y` publish the
/// solution on the two domain edges. Input ports `left` and `right` feed the
/// boundaries when no boundary signal is configured.
#[derive(Debug)]
pub struct HyperbolicBlock {
    name: String,
    config: HyperbolicConfig,
    state: BlockState,
    mesh: Option<CharacteristicMesh>,
    order: Vec<(NodeIndex, Point)>,
    left_edge: Vec<(NodeIndex, f64)>,
    right_edge: Vec<(NodeIndex, f64)>,
    solution: Solution,
    solved: BTreeSet<NodeIndex>,
    frontier: Option<f64>,
    ready_until: Option<f64>,
    left_input: History,
    right_input: History,
    diagnostics: Diagnostics,
}

impl HyperbolicBlock {
    /// Creates a block from a validated configuration.
    #[must_use]
    pub fn new(name: impl Into<String>, config: HyperbolicConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: BlockState::Uninitialized,
            mesh: None,
            order: Vec::new(),
            left_edge: Vec::new(),
            right_edge: Vec::new(),
            solution: Solution::new(),
            solved: BTreeSet::new(),
            frontier: None,
            ready_until: None,
            left_input: History::new(),
            right_input: History::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Builds the characteristic mesh, discarding any previous solution.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh configuration is invalid.
    pub fn build_mesh(&mut self) -> Result<&CharacteristicMesh, Error> {
        let mesh = CharacteristicMesh::from_config(&self.config.mesh)?;
        let frame = *mesh.frame();

        self.order = mesh.nodes_by_time();
        self.left_edge = self
            .order
            .iter()
            .filter(|(_, point)| frame.on_left_edge(*point, EPS))
            .map(|&(index, point)| (index, point.t))
            .collect();
        self.right_edge = self
            .order
            .iter()
            .filter(|(_, point)| frame.on_right_edge(*point, EPS))
            .map(|&(index, point)| (index, point.t))
            .collect();

        self.solution.clear();
        self.solved.clear();
        self.frontier = None;
        self.ready_until = None;
        self.state = BlockState::MeshBuilt;

        log::debug!(
            "block `{}`: mesh with {} nodes, {} on the left edge, {} on the right edge",
            self.name,
            self.order.len(),
            self.left_edge.len(),
            self.right_edge.len(),
        );

        Ok(self.mesh.insert(mesh))
    }

    /// Sets the initial solution, building the mesh first if needed.
    ///
    /// Nodes on the initial slice `t = T0` take the initial profiles; every
    /// other node starts at zero. Boundary inputs and diagnostics are reset.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh cannot be built.
    pub fn initialize(&mut self) -> Result<(), Error> {
        if self.mesh.is_none() {
            self.build_mesh()?;
        }
        let Some(mesh) = self.mesh.as_ref() else {
            return Err(self.mesh_not_built());
        };

        let frame = mesh.frame();
        let t0 = frame.t0();

        self.solution.clear();
        self.solved.clear();
        for (&index, &point) in mesh.nodes() {
            let value = if frame.on_initial_edge(point, EPS) {
                self.solved.insert(index);
                NodeValue::new((self.config.initial_x)(point.s), (self.config.initial_y)(point.s))
            } else {
                NodeValue::default()
            };
            self.solution.insert(index, value);
        }

        self.left_input.clear();
        self.right_input.clear();
        self.diagnostics = Diagnostics::default();
        self.frontier = Some(t0);
        self.ready_until = Some(t0);
        self.state = BlockState::Initialized;

        log::debug!(
            "block `{}`: initialized {} nodes on the initial slice",
            self.name,
            self.solved.len(),
        );
        Ok(())
    }

    /// Advances the solution over `[t, t + dt]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if [`initialize`](Self::initialize)
    /// has not been called.
    pub fn step(&mut self, t: f64, dt: f64) -> Result<StepOutput<'_>, Error> {
        self.step_observed(t, dt, ())
    }

    /// Advances the solution over `[t, t + dt]`, reporting each solved node.
    ///
    /// # Algorithm
    ///
    /// 1. Pin boundary values on edge nodes at time `t`.
    /// 2. Visit the unsolved nodes with `t_node ≤ t + dt` in ascending time:
    ///    - with both causal predecessors solved, solve the trapezoidal 2×2
    ///      system (midpoint fallback when singular);
    ///    - on the `S0` edge, take `y` from the left boundary and carry `x`;
    ///    - on the `S1` edge, take `x` from the right boundary and carry `y`;
    ///    - otherwise average the solved neighbours.
    /// 3. Replace the stored solution with the pass result.
    ///
    /// # Observer
    ///
    /// The observer receives an [`Event::NodeSolved`] for every node and may
    /// return [`Action::StopEarly`]. The pass then stops and the frontier is
    /// the time of the last node solved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if [`initialize`](Self::initialize)
    /// has not been called.
    pub fn step_observed<O>(
        &mut self,
        t: f64,
        dt: f64,
        observer: O,
    ) -> Result<StepOutput<'_>, Error>
    where
        O: Observer<Event, Action>,
    {
        if !matches!(self.state, BlockState::Initialized | BlockState::Stepping) {
            return Err(Error::NotInitialized {
                block: self.name.clone(),
            });
        }
        let (Some(mesh), Some(frontier)) = (self.mesh.as_ref(), self.frontier) else {
            return Err(self.mesh_not_built());
        };

        let pass = Pass {
            config: &self.config,
            mesh,
            order: &self.order,
            left_input: &self.left_input,
            right_input: &self.right_input,
        };

        let t_end = t + dt;
        let mut values = self.solution.clone();
        let mut solved = self.solved.clone();

        pass.apply_boundaries(&mut values, t);
        let outcome = pass.run(&mut values, &mut solved, t_end, observer);

        let frontier = match outcome.status {
            Status::Complete => frontier.max(t_end),
            Status::StoppedByObserver => outcome.reached.map_or(frontier, |r| frontier.max(r)),
        };

        self.solution = values;
        self.solved = solved;
        self.frontier = Some(frontier);
        self.ready_until = Some(frontier);
        self.state = BlockState::Stepping;
        self.diagnostics.passes += 1;
        self.diagnostics.counts.absorb(outcome.counts);

        log::debug!(
            "block `{}`: pass over [{t}, {t_end}] solved {} nodes ({} edge, {} interpolated, {} singular), {:?}",
            self.name,
            outcome.counts.total(),
            outcome.counts.edge(),
            outcome.counts.interpolated,
            outcome.counts.midpoint,
            outcome.status,
        );

        let report = StepReport {
            status: outcome.status,
            frontier,
            counts: outcome.counts,
        };
        let mesh = self.mesh.as_ref().ok_or_else(|| self.mesh_not_built())?;

        Ok(StepOutput {
            solution: &self.solution,
            mesh,
            report,
        })
    }

    /// Records boundary values received on the `left` and `right` ports at
    /// time `t`.
    ///
    /// The values are used at edge nodes for which no boundary signal is
    /// configured, interpolated in time.
    pub fn receive(&mut self, t: f64, inputs: &Inputs) {
        if let Some(value) = inputs.get("left") {
            self.left_input.record(t, value);
        }
        if let Some(value) = inputs.get("right") {
            self.right_input.record(t, value);
        }
    }

    /// Returns the coordinate of node `(i, j)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeshNotBuilt`] before the mesh is built.
    pub fn node(&self, i: i64, j: i64) -> Result<Option<Point>, Error> {
        Ok(self.built_mesh()?.node(i, j))
    }

    /// Returns the causal predecessors of node `(i, j)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeshNotBuilt`] before the mesh is built.
    pub fn preceding_nodes(&self, i: i64, j: i64) -> Result<Preceding, Error> {
        Ok(self.built_mesh()?.preceding_nodes(i, j))
    }

    /// Returns the points where the characteristics leave the domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeshNotBuilt`] before the mesh is built.
    pub fn boundary_nodes(&self) -> Result<Vec<Point>, Error> {
        Ok(self.built_mesh()?.boundary_nodes())
    }

    /// Returns the value published on an edge port at time `t`.
    ///
    /// The port is one of `left.x`, `left.y`, `right.x` and `right.y`. The
    /// value is that of the latest solved node on the edge at or before `t`.
    /// Returns `None` for an unknown port, before any such node is solved, or
    /// when `t` lies beyond [`ready_until`](Self::ready_until).
    #[must_use]
    pub fn boundary_value(&self, port: &str, t: f64) -> Option<f64> {
        let (side, component) = port.split_once('.')?;
        let edge = match side {
            "left" => &self.left_edge,
            "right" => &self.right_edge,
            _ => return None,
        };
        let pick: fn(&NodeValue) -> f64 = match component {
            "x" => |value| value.x,
            "y" => |value| value.y,
            _ => return None,
        };

        if t > self.ready_until? + EPS {
            return None;
        }

        edge.iter()
            .rev()
            .find(|(index, time)| *time <= t + EPS && self.solved.contains(index))
            .and_then(|(index, _)| self.solution.get(index))
            .map(pick)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> &HyperbolicConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> BlockState {
        self.state
    }

    #[must_use]
    pub fn mesh(&self) -> Option<&CharacteristicMesh> {
        self.mesh.as_ref()
    }

    /// Returns the current node values.
    #[must_use]
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Returns the value at node `(i, j)`.
    #[must_use]
    pub fn value(&self, i: i64, j: i64) -> Option<NodeValue> {
        self.solution.get(&NodeIndex::new(i, j)).copied()
    }

    /// Returns `true` if node `(i, j)` holds a solved or initial value.
    #[must_use]
    pub fn is_solved(&self, i: i64, j: i64) -> bool {
        self.solved.contains(&NodeIndex::new(i, j))
    }

    /// Returns the time up to which the lattice is solved.
    #[must_use]
    pub fn frontier(&self) -> Option<f64> {
        self.frontier
    }

    /// Returns the time up to which the edge ports are valid.
    #[must_use]
    pub fn ready_until(&self) -> Option<f64> {
        self.ready_until
    }

    /// Returns the solver statistics accumulated since initialization.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn built_mesh(&self) -> Result<&CharacteristicMesh, Error> {
        self.mesh.as_ref().ok_or_else(|| self.mesh_not_built())
    }

    fn mesh_not_built(&self) -> Error {
        Error::MeshNotBuilt {
            block: self.name.clone(),
        }
    }
}

impl Block for HyperbolicBlock {
    type Error = Error;

    fn name(&self) -> &str {
        &self.name
    }

    fn build_mesh(&mut self) -> Result<(), Error> {
        HyperbolicBlock::build_mesh(self).map(|_| ())
    }

    fn initialize(&mut self) -> Result<(), Error> {
        HyperbolicBlock::initialize(self)
    }

    fn step(&mut self, t: f64, dt: f64, inputs: &Inputs) -> Result<(), Error> {
        self.receive(t + dt, inputs);
        HyperbolicBlock::step(self, t, dt).map(|_| ())
    }

    fn output(&self, port: &str, t: f64) -> Option<f64> {
        self.boundary_value(port, t)
    }

    fn ready_until(&self) -> Option<f64> {
        self.ready_until
    }
}
