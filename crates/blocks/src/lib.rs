//! Blocks for Cascade simulations.
//!
//! - [`HyperbolicBlock`]: a two-equation first-order hyperbolic system solved
//!   node by node on a characteristic mesh
//! - [`OdeBlock`]: a scalar ODE advanced with explicit Euler or RK4
//! - [`SignalBlock`]: a source of prescribed or input-driven values
//! - [`BlockKind`]: a tagged union of the above that can share one cascade
//!
//! Every block implements [`cascade_core::Block`].

mod error;
pub mod hyperbolic;
mod kind;
mod ode;
mod signal;

pub use error::Error;
pub use hyperbolic::{HyperbolicBlock, HyperbolicConfig};
pub use kind::BlockKind;
pub use ode::{OdeBlock, OdeMethod};
pub use signal::{Signal, SignalBlock, SignalError, SignalTable};
