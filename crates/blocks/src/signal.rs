use std::{f64::consts::TAU, fmt, sync::Arc};

use cascade_core::{Block, History, Inputs};
use ninterp::{
    error::ValidateError,
    interpolator::Extrapolate,
    prelude::{Interp1DOwned, Interpolator},
    strategy::Linear,
};
use serde::Deserialize;
use thiserror::Error;

use crate::{Error, hyperbolic::CurveFn};

/// A signal computed from the time and the block's inputs.
pub type DrivenFn = Arc<dyn Fn(f64, &Inputs) -> f64 + Send + Sync>;

/// Errors raised when a signal's parameters are inconsistent.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("invalid table: {0}")]
    Table(#[from] ValidateError),

    #[error("pulse period must be finite and positive, got {0}")]
    Period(f64),

    #[error("pulse duty cycle must lie in [0, 1], got {0}")]
    DutyCycle(f64),

    #[error("ramp ends before it starts: {start} > {end}")]
    ReversedRamp { start: f64, end: f64 },
}

/// A scalar source of values over time.
///
/// The data variants deserialize from a map tagged with `kind`:
///
/// ```toml
/// kind = "sine"
/// amplitude = 2.0
/// frequency = 0.5
/// ```
#[derive(Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    /// A fixed value.
    Constant { value: f64 },

    /// `offset + amplitude·sin(2π·frequency·t + phase)`.
    Sine {
        #[serde(default = "one")]
        amplitude: f64,
        #[serde(default = "one")]
        frequency: f64,
        #[serde(default)]
        phase: f64,
        #[serde(default)]
        offset: f64,
    },

    /// `before` until `time`, `after` from then on.
    Step {
        time: f64,
        #[serde(default)]
        before: f64,
        #[serde(default = "one")]
        after: f64,
    },

    /// Linear transition from `from` at `start` to `to` at `end`, held
    /// constant outside.
    Ramp {
        start: f64,
        end: f64,
        #[serde(default)]
        from: f64,
        #[serde(default = "one")]
        to: f64,
    },

    /// `high` for the first `duty_cycle` fraction of every period, `low`
    /// for the rest.
    Pulse {
        period: f64,
        #[serde(default = "half")]
        duty_cycle: f64,
        #[serde(default)]
        low: f64,
        #[serde(default = "one")]
        high: f64,
    },

    /// Piecewise-linear lookup, held constant beyond the end points.
    Table(SignalTable),

    /// Any function of time.
    #[serde(skip)]
    Custom(CurveFn),

    /// A function of time and the block's inputs.
    #[serde(skip)]
    Driven(DrivenFn),
}

fn one() -> f64 {
    1.0
}

fn half() -> f64 {
    0.5
}

impl Signal {
    /// Creates a lookup table signal.
    ///
    /// # Errors
    ///
    /// See [`SignalTable::new`].
    pub fn table(times: Vec<f64>, values: Vec<f64>) -> Result<Self, SignalError> {
        Ok(Self::Table(SignalTable::new(times, values)?))
    }

    /// Wraps a function of time.
    pub fn custom(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Wraps a function of time and inputs.
    pub fn driven(f: impl Fn(f64, &Inputs) -> f64 + Send + Sync + 'static) -> Self {
        Self::Driven(Arc::new(f))
    }

    /// Checks that the parameters describe a well-defined signal.
    ///
    /// Tables are checked when they are built.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), SignalError> {
        match self {
            &Self::Pulse {
                period, duty_cycle, ..
            } => {
                if !period.is_finite() || period <= 0.0 {
                    return Err(SignalError::Period(period));
                }
                if !(0.0..=1.0).contains(&duty_cycle) {
                    return Err(SignalError::DutyCycle(duty_cycle));
                }
                Ok(())
            }
            &Self::Ramp { start, end, .. } if start > end => {
                Err(SignalError::ReversedRamp { start, end })
            }
            _ => Ok(()),
        }
    }

    /// Evaluates the signal at time `t`.
    #[must_use]
    pub fn evaluate(&self, t: f64, inputs: &Inputs) -> f64 {
        match self {
            &Self::Constant { value } => value,
            &Self::Sine {
                amplitude,
                frequency,
                phase,
                offset,
            } => offset + amplitude * (TAU * frequency * t + phase).sin(),
            &Self::Step {
                time,
                before,
                after,
            } => {
                if t < time {
                    before
                } else {
                    after
                }
            }
            &Self::Ramp {
                start,
                end,
                from,
                to,
            } => {
                if t <= start {
                    from
                } else if t >= end {
                    to
                } else {
                    from + (to - from) * (t - start) / (end - start)
                }
            }
            &Self::Pulse {
                period,
                duty_cycle,
                low,
                high,
            } => {
                if t.rem_euclid(period) < period * duty_cycle {
                    high
                } else {
                    low
                }
            }
            Self::Table(table) => table.evaluate(t),
            Self::Custom(f) => f(t),
            Self::Driven(f) => f(t, inputs),
        }
    }

    /// Returns `true` if the signal depends on the block's inputs.
    #[must_use]
    pub fn is_driven(&self) -> bool {
        matches!(self, Self::Driven(_))
    }
}

/// A piecewise-linear lookup table with clamped ends.
///
/// Deserializes from `times` and `values` arrays and is validated on
/// construction: both must be non-empty and of equal length, and `times`
/// strictly ascending.
#[derive(Clone, Deserialize)]
#[serde(try_from = "TableData")]
pub struct SignalTable {
    times: Vec<f64>,
    values: Vec<f64>,
    interp: Arc<Interp1DOwned<f64, Linear>>,
}

#[derive(Deserialize)]
struct TableData {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl TryFrom<TableData> for SignalTable {
    type Error = SignalError;

    fn try_from(data: TableData) -> Result<Self, SignalError> {
        Self::new(data.times, data.values)
    }
}

impl SignalTable {
    /// Builds a table from matching time and value points.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Table`] if the points do not form a valid
    /// interpolation grid.
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self, SignalError> {
        let interp = Interp1DOwned::new(
            times.clone().into(),
            values.clone().into(),
            Linear,
            Extrapolate::Clamp,
        )?;
        Ok(Self {
            times,
            values,
            interp: Arc::new(interp),
        })
    }

    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Interpolates the table at `t`.
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        match self.interp.interpolate(&[t]) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("table lookup at t = {t} failed: {err}");
                f64::NAN
            }
        }
    }
}

impl fmt::Debug for SignalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalTable")
            .field("times", &self.times)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant { value } => f.debug_struct("Constant").field("value", value).finish(),
            Self::Sine {
                amplitude,
                frequency,
                phase,
                offset,
            } => f
                .debug_struct("Sine")
                .field("amplitude", amplitude)
                .field("frequency", frequency)
                .field("phase", phase)
                .field("offset", offset)
                .finish(),
            Self::Step {
                time,
                before,
                after,
            } => f
                .debug_struct("Step")
                .field("time", time)
                .field("before", before)
                .field("after", after)
                .finish(),
            Self::Ramp {
                start,
                end,
                from,
                to,
            } => f
                .debug_struct("Ramp")
                .field("start", start)
                .field("end", end)
                .field("from", from)
                .field("to", to)
                .finish(),
            Self::Pulse {
                period,
                duty_cycle,
                low,
                high,
            } => f
                .debug_struct("Pulse")
                .field("period", period)
                .field("duty_cycle", duty_cycle)
                .field("low", low)
                .field("high", high)
                .finish(),
            Self::Table(table) => fmt::Debug::fmt(table, f),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Driven(_) => f.write_str("Driven(..)"),
        }
    }
}

/// A lumped block that publishes a [`Signal`] on its `value` port.
///
/// Signals that depend only on time are evaluated exactly at any requested
/// time. Driven signals are evaluated at the end of each step with that
/// step's inputs, and the recorded values are interpolated.
#[derive(Debug, Clone)]
pub struct SignalBlock {
    name: String,
    signal: Signal,
    history: History,
    initialized: bool,
    ready_until: Option<f64>,
}

impl SignalBlock {
    /// Creates a signal block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signal`] if the signal's parameters are invalid.
    pub fn new(name: impl Into<String>, signal: Signal) -> Result<Self, Error> {
        signal.validate()?;
        Ok(Self {
            name: name.into(),
            signal,
            history: History::new(),
            initialized: false,
            ready_until: None,
        })
    }

    #[must_use]
    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    /// Returns the values recorded at the end of each step.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }
}

impl Block for SignalBlock {
    type Error = Error;

    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) -> Result<(), Error> {
        self.history.clear();
        self.ready_until = None;
        self.initialized = true;
        Ok(())
    }

    fn step(&mut self, t: f64, dt: f64, inputs: &Inputs) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::NotInitialized {
                block: self.name.clone(),
            });
        }

        if self.history.is_empty() {
            self.history.record(t, self.signal.evaluate(t, inputs));
        }
        self.history
            .record(t + dt, self.signal.evaluate(t + dt, inputs));
        self.ready_until = Some(t + dt);
        Ok(())
    }

    fn output(&self, port: &str, t: f64) -> Option<f64> {
        if port != "value" {
            return None;
        }
        if self.signal.is_driven() {
            self.history.value_at(t)
        } else {
            Some(self.signal.evaluate(t, &Inputs::new()))
        }
    }

    fn ready_until(&self) -> Option<f64> {
        self.ready_until
    }
}
