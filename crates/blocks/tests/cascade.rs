use approx::assert_relative_eq;
use cascade_blocks::{
    BlockKind, HyperbolicBlock, HyperbolicConfig, OdeBlock, OdeMethod, Signal, SignalBlock,
};
use cascade_core::{Block, Cascade, CascadeError, Inputs};
use cascade_mesh::MeshConfig;

// --- Test fixtures ---

/// A constant inlet feeding a lossless line that fills a tank.
///
/// The line's unit square lattice has right edge nodes at t = 0, 0.5 and 1,
/// so the inlet value reaches the outlet exactly at t = 1.
fn inlet_line_tank() -> Cascade<BlockKind> {
    let mesh = MeshConfig::with_node_count([0.0, 1.0], [0.0, 1.0], [1.0, 1.0], 2);

    let mut cascade = Cascade::new();
    cascade
        .add_block(
            SignalBlock::new("inlet", Signal::Constant { value: 1.0 })
                .unwrap()
                .into(),
        )
        .unwrap();
    cascade
        .add_block(HyperbolicBlock::new("line", HyperbolicConfig::new(mesh).unwrap()).into())
        .unwrap();
    cascade
        .add_block(
            OdeBlock::new("tank", 0.0, |_, _, inputs: &Inputs| {
                inputs.get_or("inflow", 0.0)
            })
            .with_method(OdeMethod::Euler)
            .into(),
        )
        .unwrap();

    cascade.connect(("inlet", "value"), ("line", "left")).unwrap();
    cascade.connect(("line", "right.y"), ("tank", "inflow")).unwrap();
    cascade
}

#[test]
fn blocks_run_in_dependency_order() {
    let mut cascade = inlet_line_tank();
    cascade.initialize().unwrap();
    cascade.run(0.0, 0.25, 4).unwrap();

    assert_relative_eq!(cascade.time().unwrap(), 1.0);

    let line = cascade.block("line").unwrap();
    assert_eq!(line.output("right.y", 0.75), Some(0.0));
    assert_eq!(line.output("right.y", 1.0), Some(1.0));
    assert_eq!(line.output("left.y", 0.5), Some(1.0));

    // Only the last step sees the inlet value at the outlet.
    let tank = cascade.block("tank").and_then(BlockKind::as_ode).unwrap();
    assert_relative_eq!(tank.state().unwrap(), 0.25);
}

#[test]
fn every_block_is_ready_after_a_step() {
    let mut cascade = inlet_line_tank();
    cascade.initialize().unwrap();
    cascade.step(0.0, 0.5).unwrap();

    for name in ["inlet", "line", "tank"] {
        let block = cascade.block(name).unwrap();
        assert_eq!(block.ready_until(), Some(0.5), "{name}");
    }

    let line = cascade.block("line").and_then(BlockKind::as_hyperbolic).unwrap();
    assert_eq!(line.diagnostics().passes, 1);
    assert_eq!(line.frontier(), Some(0.5));
}

#[test]
fn feedback_loops_are_rejected() {
    let mut cascade = inlet_line_tank();

    let result = cascade.connect(("tank", "state"), ("line", "right"));
    assert!(matches!(result, Err(CascadeError::Cycle(_))));

    // The rejected connection leaves the cascade usable.
    assert_eq!(cascade.graph().connection_count(), 2);
    cascade.initialize().unwrap();
    cascade.run(0.0, 0.25, 2).unwrap();
}

#[test]
fn unknown_blocks_are_reported() {
    let mut cascade = inlet_line_tank();
    assert!(matches!(
        cascade.connect(("pump", "flow"), ("tank", "inflow")),
        Err(CascadeError::UnknownBlock(name)) if name == "pump"
    ));
}

#[test]
fn block_names_are_unique() {
    let mut cascade = inlet_line_tank();

    let err = cascade
        .add_block(
            SignalBlock::new("tank", Signal::Constant { value: 0.0 })
                .unwrap()
                .into(),
        )
        .unwrap_err();
    assert!(matches!(err, CascadeError::DuplicateBlock(name) if name == "tank"));
}

#[test]
fn stepping_before_initialize_names_the_block() {
    let mut cascade = inlet_line_tank();

    let err = cascade.step(0.0, 0.25).unwrap_err();
    assert!(matches!(err, CascadeError::Block { ref name, .. } if name == "inlet"));
    assert!(err.to_string().contains("inlet"));
}
