use cascade_core::{Block, Inputs};

use crate::{Error, HyperbolicBlock, OdeBlock, SignalBlock};

/// Any block in this crate, so that different kinds can share a cascade.
#[derive(Debug)]
pub enum BlockKind {
    Hyperbolic(HyperbolicBlock),
    Ode(OdeBlock),
    Signal(SignalBlock),
}

impl BlockKind {
    /// Returns `true` if the block carries a spatial mesh.
    #[must_use]
    pub fn is_distributed(&self) -> bool {
        matches!(self, Self::Hyperbolic(_))
    }

    #[must_use]
    pub fn as_hyperbolic(&self) -> Option<&HyperbolicBlock> {
        match self {
            Self::Hyperbolic(block) => Some(block),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_ode(&self) -> Option<&OdeBlock> {
        match self {
            Self::Ode(block) => Some(block),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_signal(&self) -> Option<&SignalBlock> {
        match self {
            Self::Signal(block) => Some(block),
            _ => None,
        }
    }
}

impl From<HyperbolicBlock> for BlockKind {
    fn from(block: HyperbolicBlock) -> Self {
        Self::Hyperbolic(block)
    }
}

impl From<OdeBlock> for BlockKind {
    fn from(block: OdeBlock) -> Self {
        Self::Ode(block)
    }
}

impl From<SignalBlock> for BlockKind {
    fn from(block: SignalBlock) -> Self {
        Self::Signal(block)
    }
}

impl Block for BlockKind {
    type Error = Error;

    fn name(&self) -> &str {
        match self {
            Self::Hyperbolic(block) => Block::name(block),
            Self::Ode(block) => block.name(),
            Self::Signal(block) => block.name(),
        }
    }

    fn build_mesh(&mut self) -> Result<(), Error> {
        match self {
            Self::Hyperbolic(block) => Block::build_mesh(block),
            Self::Ode(block) => block.build_mesh(),
            Self::Signal(block) => block.build_mesh(),
        }
    }

    fn initialize(&mut self) -> Result<(), Error> {
        match self {
            Self::Hyperbolic(block) => Block::initialize(block),
            Self::Ode(block) => block.initialize(),
            Self::Signal(block) => block.initialize(),
        }
    }

    fn step(&mut self, t: f64, dt: f64, inputs: &Inputs) -> Result<(), Error> {
        match self {
            Self::Hyperbolic(block) => Block::step(block, t, dt, inputs),
            Self::Ode(block) => block.step(t, dt, inputs),
            Self::Signal(block) => block.step(t, dt, inputs),
        }
    }

    fn output(&self, port: &str, t: f64) -> Option<f64> {
        match self {
            Self::Hyperbolic(block) => block.output(port, t),
            Self::Ode(block) => block.output(port, t),
            Self::Signal(block) => block.output(port, t),
        }
    }

    fn ready_until(&self) -> Option<f64> {
        match self {
            Self::Hyperbolic(block) => Block::ready_until(block),
            Self::Ode(block) => block.ready_until(),
            Self::Signal(block) => block.ready_until(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cascade_mesh::MeshConfig;

    use crate::{HyperbolicConfig, Signal};

    fn blocks() -> Vec<BlockKind> {
        let mesh = MeshConfig::with_node_count([0.0, 1.0], [0.0, 1.0], [1.0, 1.0], 2);
        vec![
            HyperbolicBlock::new("pipe", HyperbolicConfig::new(mesh).unwrap()).into(),
            OdeBlock::new("tank", 1.0, |_, y, _| -y).into(),
            SignalBlock::new("source", Signal::Constant { value: 2.0 })
                .unwrap()
                .into(),
        ]
    }

    #[test]
    fn delegates_to_the_wrapped_block() {
        let mut blocks = blocks();
        let names: Vec<_> = blocks.iter().map(|block| block.name().to_owned()).collect();
        assert_eq!(names, ["pipe", "tank", "source"]);

        for block in &mut blocks {
            block.build_mesh().unwrap();
            block.initialize().unwrap();
            block.step(0.0, 0.5, &Inputs::new()).unwrap();
            assert_eq!(block.ready_until(), Some(0.5));
        }

        assert_eq!(blocks[2].output("value", 0.25), Some(2.0));
        assert!(blocks[1].output("state", 0.5).is_some());
    }

    #[test]
    fn accessors_match_the_variant() {
        let blocks = blocks();

        assert!(blocks[0].is_distributed());
        assert!(blocks[0].as_hyperbolic().is_some());
        assert!(blocks[0].as_ode().is_none());
        assert!(blocks[1].as_ode().is_some());
        assert!(!blocks[1].is_distributed());
        assert!(blocks[2].as_signal().is_some());
    }

    #[test]
    fn errors_pass_through() {
        let mut block: BlockKind = OdeBlock::new("tank", 1.0, |_, y, _| -y).into();
        assert!(matches!(
            block.step(0.0, 0.5, &Inputs::new()),
            Err(Error::NotInitialized { .. })
        ));
    }
}
