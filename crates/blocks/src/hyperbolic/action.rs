/// Control actions supported by the hyperbolic solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the pass and keep the nodes solved so far.
    StopEarly,
}
