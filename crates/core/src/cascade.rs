use std::collections::HashMap;

use thiserror::Error;

use crate::{Block, CascadeGraph, CycleError, Inputs, Source, Target};

/// Errors that can occur while assembling or running a cascade.
#[derive(Debug, Error)]
pub enum CascadeError<E> {
    #[error("a block named `{0}` is already part of the cascade")]
    DuplicateBlock(String),

    #[error("unknown block `{0}`")]
    UnknownBlock(String),

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error("block `{name}` failed: {source}")]
    Block {
        name: String,
        #[source]
        source: E,
    },
}

/// A network of blocks stepped together in dependency order.
///
/// Each step visits the blocks in topological order. A block's inputs are
/// read from the upstream outputs at the end of the step interval, through
/// connections whose producers have been solved that far; a stalled producer
/// contributes no value.
#[derive(Debug)]
pub struct Cascade<B> {
    blocks: HashMap<String, B>,
    graph: CascadeGraph,
    time: Option<f64>,
}

impl<B: Block> Cascade<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
            graph: CascadeGraph::new(),
            time: None,
        }
    }

    /// Adds a block to the cascade under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::DuplicateBlock`] if the name is already taken.
    pub fn add_block(&mut self, block: B) -> Result<(), CascadeError<B::Error>> {
        let name = block.name().to_string();
        if self.blocks.contains_key(&name) {
            return Err(CascadeError::DuplicateBlock(name));
        }

        self.graph.add_block(name.as_str());
        self.blocks.insert(name, block);
        Ok(())
    }

    /// Connects an output port of one block to an input port of another.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::UnknownBlock`] if either block has not been
    /// added, or [`CascadeError::Cycle`] if the connection closes a loop.
    pub fn connect<S: Into<Source>, T: Into<Target>>(
        &mut self,
        source: S,
        target: T,
    ) -> Result<(), CascadeError<B::Error>> {
        let source = source.into();
        let target = target.into();

        for name in [&source.block, &target.block] {
            if !self.blocks.contains_key(name) {
                return Err(CascadeError::UnknownBlock(name.clone()));
            }
        }

        self.graph.connect(source, target)?;
        Ok(())
    }

    /// Builds and initializes every block, in dependency order.
    ///
    /// Connections are reset and then marked ready up to each block's initial
    /// time.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::Block`] with the first block that fails.
    pub fn initialize(&mut self) -> Result<(), CascadeError<B::Error>> {
        self.graph.reset();

        for name in self.call_order()? {
            let block = self.block_entry(&name)?;
            block.build_mesh().map_err(|source| CascadeError::Block {
                name: name.clone(),
                source,
            })?;
            block.initialize().map_err(|source| CascadeError::Block {
                name: name.clone(),
                source,
            })?;

            if let Some(until) = block.ready_until() {
                self.graph.mark_ready(&name, until);
            }
        }

        log::debug!("initialized cascade of {} blocks", self.blocks.len());
        self.time = None;
        Ok(())
    }

    /// Advances every block over `[t, t + dt]`.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::Block`] with the first block that fails.
    pub fn step(&mut self, t: f64, dt: f64) -> Result<(), CascadeError<B::Error>> {
        let end = t + dt;

        for name in self.call_order()? {
            let inputs = self.gather_inputs(&name, end);

            let block = self.block_entry(&name)?;
            block
                .step(t, dt, &inputs)
                .map_err(|source| CascadeError::Block {
                    name: name.clone(),
                    source,
                })?;

            if let Some(until) = block.ready_until() {
                self.graph.mark_ready(&name, until);
            }
        }

        self.time = Some(end);
        Ok(())
    }

    /// Runs `steps` consecutive steps of size `dt` starting at `t0`.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first failing step.
    pub fn run(&mut self, t0: f64, dt: f64, steps: usize) -> Result<(), CascadeError<B::Error>> {
        for k in 0..steps {
            self.step(t0 + k as f64 * dt, dt)?;
        }
        Ok(())
    }

    /// Returns the block with the given name.
    #[must_use]
    pub fn block(&self, name: &str) -> Option<&B> {
        self.blocks.get(name)
    }

    /// Returns the block with the given name, mutably.
    pub fn block_mut(&mut self, name: &str) -> Option<&mut B> {
        self.blocks.get_mut(name)
    }

    #[must_use]
    pub fn graph(&self) -> &CascadeGraph {
        &self.graph
    }

    /// Returns the end time of the latest step, if any.
    #[must_use]
    pub fn time(&self) -> Option<f64> {
        self.time
    }

    fn call_order(&self) -> Result<Vec<String>, CascadeError<B::Error>> {
        Ok(self.graph.call_order()?.map(str::to_string).collect())
    }

    fn block_entry(&mut self, name: &str) -> Result<&mut B, CascadeError<B::Error>> {
        self.blocks
            .get_mut(name)
            .ok_or_else(|| CascadeError::UnknownBlock(name.to_string()))
    }

    /// Collects the values arriving at `name` at time `t`.
    fn gather_inputs(&self, name: &str, t: f64) -> Inputs {
        let mut inputs = Inputs::new();

        for connection in self.graph.incoming(name) {
            if !connection.is_ready(t) {
                log::warn!(
                    "{} -> {}.{} is not ready at t = {t} (ready until {:?}); input left empty",
                    connection.source.block,
                    connection.target.block,
                    connection.target.port,
                    connection.ready_until(),
                );
                continue;
            }

            let value = self
                .blocks
                .get(&connection.source.block)
                .and_then(|source| source.output(&connection.source.port, t));
            if let Some(value) = value {
                inputs.insert(connection.target.port.as_str(), value);
            }
        }

        inputs
    }
}

impl<B: Block> Default for Cascade<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    use crate::History;

    // --- Test fixtures ---

    /// Emits `rate * t` on port "out".
    struct Ramp {
        name: String,
        rate: f64,
        ready_until: Option<f64>,
    }

    impl Ramp {
        fn new(name: &str, rate: f64) -> Self {
            Self {
                name: name.to_string(),
                rate,
                ready_until: None,
            }
        }
    }

    /// Accumulates `∫ input dt` with explicit Euler on port "out".
    struct Accumulator {
        name: String,
        history: History,
        ready_until: Option<f64>,
        seen: Vec<Option<f64>>,
    }

    impl Accumulator {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                history: History::new(),
                ready_until: None,
                seen: Vec::new(),
            }
        }
    }

    enum TestBlock {
        Ramp(Ramp),
        Accumulator(Accumulator),
    }

    impl Block for TestBlock {
        type Error = Infallible;

        fn name(&self) -> &str {
            match self {
                Self::Ramp(b) => &b.name,
                Self::Accumulator(b) => &b.name,
            }
        }

        fn initialize(&mut self) -> Result<(), Infallible> {
            match self {
                Self::Ramp(b) => b.ready_until = Some(0.0),
                Self::Accumulator(b) => {
                    b.history.clear();
                    b.history.record(0.0, 0.0);
                    b.ready_until = Some(0.0);
                }
            }
            Ok(())
        }

        fn step(&mut self, t: f64, dt: f64, inputs: &Inputs) -> Result<(), Infallible> {
            match self {
                Self::Ramp(b) => b.ready_until = Some(t + dt),
                Self::Accumulator(b) => {
                    let input = inputs.get("in");
                    b.seen.push(input);
                    let (_, last) = b.history.latest().unwrap_or((t, 0.0));
                    b.history.record(t + dt, last + input.unwrap_or(0.0) * dt);
                    b.ready_until = Some(t + dt);
                }
            }
            Ok(())
        }

        fn output(&self, port: &str, t: f64) -> Option<f64> {
            match (self, port) {
                (Self::Ramp(b), "out") => Some(b.rate * t),
                (Self::Accumulator(b), "out") => b.history.value_at(t),
                _ => None,
            }
        }

        fn ready_until(&self) -> Option<f64> {
            match self {
                Self::Ramp(b) => b.ready_until,
                Self::Accumulator(b) => b.ready_until,
            }
        }
    }

    fn accumulator<'a>(cascade: &'a Cascade<TestBlock>, name: &str) -> &'a Accumulator {
        match cascade.block(name) {
            Some(TestBlock::Accumulator(b)) => b,
            _ => panic!("{name} is not an accumulator"),
        }
    }

    #[test]
    fn values_flow_downstream_within_a_step() {
        let mut cascade = Cascade::new();
        // Added out of dependency order on purpose.
        cascade
            .add_block(TestBlock::Accumulator(Accumulator::new("sum")))
            .unwrap();
        cascade.add_block(TestBlock::Ramp(Ramp::new("ramp", 2.0))).unwrap();
        cascade.connect(("ramp", "out"), ("sum", "in")).unwrap();

        cascade.initialize().unwrap();
        cascade.run(0.0, 0.5, 2).unwrap();

        let sum = accumulator(&cascade, "sum");
        // Inputs are sampled at the end of each interval: 2·0.5 and 2·1.0.
        assert_eq!(sum.seen, vec![Some(1.0), Some(2.0)]);
        assert_relative_eq!(sum.history.value_at(1.0).unwrap(), 1.0 * 0.5 + 2.0 * 0.5);
        assert_eq!(cascade.time(), Some(1.0));
    }

    #[test]
    fn chained_blocks_see_current_upstream_values() {
        let mut cascade = Cascade::new();
        cascade.add_block(TestBlock::Ramp(Ramp::new("ramp", 1.0))).unwrap();
        cascade
            .add_block(TestBlock::Accumulator(Accumulator::new("first")))
            .unwrap();
        cascade
            .add_block(TestBlock::Accumulator(Accumulator::new("second")))
            .unwrap();
        cascade.connect(("first", "out"), ("second", "in")).unwrap();
        cascade.connect(("ramp", "out"), ("first", "in")).unwrap();

        cascade.initialize().unwrap();
        cascade.step(0.0, 1.0).unwrap();

        assert_eq!(accumulator(&cascade, "first").seen, vec![Some(1.0)]);
        assert_eq!(accumulator(&cascade, "second").seen, vec![Some(1.0)]);
    }

    #[test]
    fn unconnected_inputs_are_absent() {
        let mut cascade = Cascade::new();
        cascade
            .add_block(TestBlock::Accumulator(Accumulator::new("sum")))
            .unwrap();

        cascade.initialize().unwrap();
        cascade.step(0.0, 1.0).unwrap();

        assert_eq!(accumulator(&cascade, "sum").seen, vec![None]);
    }

    #[test]
    fn stalled_producer_yields_no_value() {
        let mut cascade = Cascade::new();
        cascade.add_block(TestBlock::Ramp(Ramp::new("ramp", 1.0))).unwrap();
        cascade
            .add_block(TestBlock::Accumulator(Accumulator::new("sum")))
            .unwrap();
        cascade.connect(("ramp", "out"), ("sum", "in")).unwrap();

        // Without initialization the connection was never marked ready, and
        // the ramp only becomes ready once stepped.
        cascade.graph.reset();
        let inputs = cascade.gather_inputs("sum", 1.0);
        assert!(inputs.is_empty());
    }

    #[test]
    fn rejects_unknown_and_duplicate_blocks() {
        let mut cascade = Cascade::new();
        cascade.add_block(TestBlock::Ramp(Ramp::new("ramp", 1.0))).unwrap();

        assert!(matches!(
            cascade.add_block(TestBlock::Ramp(Ramp::new("ramp", 3.0))),
            Err(CascadeError::DuplicateBlock(name)) if name == "ramp"
        ));
        assert!(matches!(
            cascade.connect(("ramp", "out"), ("ghost", "in")),
            Err(CascadeError::UnknownBlock(name)) if name == "ghost"
        ));
    }

    #[test]
    fn rejects_cyclic_connections() {
        let mut cascade = Cascade::new();
        cascade
            .add_block(TestBlock::Accumulator(Accumulator::new("a")))
            .unwrap();
        cascade
            .add_block(TestBlock::Accumulator(Accumulator::new("b")))
            .unwrap();
        cascade.connect(("a", "out"), ("b", "in")).unwrap();

        assert!(matches!(
            cascade.connect(("b", "out"), ("a", "in")),
            Err(CascadeError::Cycle(CycleError))
        ));
    }
}
