//! Characteristic meshes for two-speed hyperbolic systems.
//!
//! This crate builds the computational lattice used by distributed blocks:
//!
//! - [`Rectangle`]: the axis-aligned space-time domain `[S0, S1] × [T0, T1]`
//! - [`Discretization`]: space/time steps and index ranges derived from two
//!   wave speeds and a [`Resolution`]
//! - [`Characteristic`]: one straight characteristic line clipped against the
//!   domain, with its lattice nodes and boundary exit points
//! - [`CharacteristicMesh`]: both characteristic families plus the global
//!   `(i, j)` node table and causal-predecessor lookup
//!
//! Node `(i, j)` sits at `s = s0 + (i + j)·ds`, `t = t0 − i·dt1 + j·dt2`,
//! where `(s0, t0)` is the domain center.

mod characteristic;
mod config;
mod discretization;
mod error;
mod mesh;
mod point;
mod rectangle;

pub use characteristic::Characteristic;
pub use config::MeshConfig;
pub use discretization::{Discretization, Resolution};
pub use error::{ConfigError, MeshError};
pub use mesh::{CharacteristicMesh, Preceding};
pub use point::{NodeIndex, Point};
pub use rectangle::Rectangle;

/// Geometric tolerance used for edge tests and intersection clipping.
pub const EPS: f64 = 1e-10;
