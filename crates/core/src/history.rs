use ndarray::Array1;
use ninterp::{
    interpolator::Extrapolate,
    prelude::{Interp1DOwned, Interpolator},
    strategy::Linear,
};

use crate::TIME_EPS;

/// A time series of scalar samples with linear interpolation.
///
/// Samples are kept in strictly ascending time order. Recording at or before
/// the latest sample time discards the superseded tail first, so re-stepping
/// a block over an interval overwrites what it produced there before.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` at time `t`.
    pub fn record(&mut self, t: f64, value: f64) {
        if self.times.last().is_some_and(|&last| t <= last + TIME_EPS) {
            let keep = self.times.partition_point(|&time| time < t - TIME_EPS);
            self.times.truncate(keep);
            self.values.truncate(keep);
        }
        self.times.push(t);
        self.values.push(value);
    }

    /// Returns the value at time `t`.
    ///
    /// Before the first sample the first value is returned and after the last
    /// sample the last value; in between, neighbouring samples are linearly
    /// interpolated. Returns `None` for an empty history.
    #[must_use]
    pub fn value_at(&self, t: f64) -> Option<f64> {
        match self.values.as_slice() {
            [] => None,
            [only] => Some(*only),
            _ => {
                let interp = Interp1DOwned::new(
                    Array1::from(self.times.clone()),
                    Array1::from(self.values.clone()),
                    Linear,
                    Extrapolate::Clamp,
                )
                .ok()?;
                interp.interpolate(&[t]).ok()
            }
        }
    }

    /// Returns the most recent `(t, value)` sample.
    #[must_use]
    pub fn latest(&self) -> Option<(f64, f64)> {
        Some((*self.times.last()?, *self.values.last()?))
    }

    /// Returns the time span covered by the samples.
    #[must_use]
    pub fn span(&self) -> Option<(f64, f64)> {
        Some((*self.times.first()?, *self.times.last()?))
    }

    /// Removes every sample.
    pub fn clear(&mut self) {
        self.times.clear();
        self.values.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }
}
