use std::{fmt, sync::Arc};

use cascade_core::{Block, History, Inputs, StepIntegrable};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Right-hand side `(t, state, inputs) -> d(state)/dt` of a scalar ODE.
pub type RhsFn = Arc<dyn Fn(f64, f64, &Inputs) -> f64 + Send + Sync>;

/// Explicit integration scheme of an [`OdeBlock`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OdeMethod {
    /// Forward Euler: `y + f(t, y)·dt`.
    Euler,

    /// Classic fourth-order Runge-Kutta.
    #[default]
    Rk4,
}

/// A lumped block governed by a scalar ODE `dy/dt = f(t, y, inputs)`.
///
/// Inputs are sampled once per step and held constant across the RK4
/// stages. The state is published on the `state` port, linearly interpolated
/// between steps.
#[derive(Clone)]
pub struct OdeBlock {
    name: String,
    rhs: RhsFn,
    initial_state: f64,
    t0: f64,
    method: OdeMethod,
    state: Option<f64>,
    time: Option<f64>,
    history: History,
}

impl OdeBlock {
    /// Creates a block starting at `t = 0` and integrated with RK4.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        initial_state: f64,
        rhs: impl Fn(f64, f64, &Inputs) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            rhs: Arc::new(rhs),
            initial_state,
            t0: 0.0,
            method: OdeMethod::default(),
            state: None,
            time: None,
            history: History::new(),
        }
    }

    #[must_use]
    pub fn with_t0(mut self, t0: f64) -> Self {
        self.t0 = t0;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: OdeMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn method(&self) -> OdeMethod {
        self.method
    }

    /// Returns the current state, once initialized.
    #[must_use]
    pub fn state(&self) -> Option<f64> {
        self.state
    }

    /// Returns the current time, once initialized.
    #[must_use]
    pub fn time(&self) -> Option<f64> {
        self.time
    }

    /// Returns the recorded `(t, state)` samples.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    fn advance(&self, t: f64, y: f64, dt: f64, inputs: &Inputs) -> f64 {
        let f = |t: f64, y: f64| (self.rhs)(t, y, inputs);

        match self.method {
            OdeMethod::Euler => y.step(f(t, y), dt),
            OdeMethod::Rk4 => {
                let half = dt / 2.0;
                let k1 = f(t, y);
                let k2 = f(t + half, y.step(k1, half));
                let k3 = f(t + half, y.step(k2, half));
                let k4 = f(t + dt, y.step(k3, dt));
                y.step((k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0, dt)
            }
        }
    }
}

impl Block for OdeBlock {
    type Error = Error;

    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) -> Result<(), Error> {
        self.history.clear();
        self.history.record(self.t0, self.initial_state);
        self.state = Some(self.initial_state);
        self.time = Some(self.t0);
        Ok(())
    }

    fn step(&mut self, t: f64, dt: f64, inputs: &Inputs) -> Result<(), Error> {
        let Some(y) = self.state else {
            return Err(Error::NotInitialized {
                block: self.name.clone(),
            });
        };

        let next = self.advance(t, y, dt, inputs);
        log::trace!("block `{}`: y({}) = {next}", self.name, t + dt);

        self.history.record(t + dt, next);
        self.state = Some(next);
        self.time = Some(t + dt);
        Ok(())
    }

    fn output(&self, port: &str, t: f64) -> Option<f64> {
        match port {
            "state" => self.history.value_at(t),
            _ => None,
        }
    }

    fn ready_until(&self) -> Option<f64> {
        self.time
    }
}

impl fmt::Debug for OdeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdeBlock")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("t0", &self.t0)
            .field("state", &self.state)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}
