//! Core traits and types for Cascade simulations.
//!
//! A cascade is a network of blocks that exchange scalar boundary values over
//! time. This crate defines the shared abstractions the blocks build on:
//!
//! - [`Block`]: the capability every lumped or distributed sub-model exposes
//! - [`Inputs`]: the port values a block receives for one step
//! - [`Observer`]: watches the nodes a block solves and can stop a pass early
//! - [`History`]: an interpolated time series of recorded values
//! - [`CascadeGraph`] and [`Connection`]: the dependency graph and its
//!   ready-until gates
//! - [`Cascade`]: the driver that steps blocks in dependency order

mod block;
mod cascade;
mod connection;
mod graph;
mod history;
mod observer;
mod step;

pub use block::{Block, Inputs};
pub use cascade::{Cascade, CascadeError};
pub use connection::{Connection, Source, Target};
pub use graph::{CascadeGraph, CycleError};
pub use history::History;
pub use observer::Observer;
pub use step::{DerivativeOf, StepIntegrable};

/// Tolerance used when comparing simulation times.
pub const TIME_EPS: f64 = 1e-10;
