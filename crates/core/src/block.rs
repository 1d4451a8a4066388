use std::collections::BTreeMap;

/// A sub-model that can take part in a cascade.
///
/// Lumped blocks (ODEs, signal sources) and distributed blocks (hyperbolic
/// systems on a characteristic mesh) expose the same capability: they are
/// prepared once, stepped over time intervals with the port values received
/// from upstream blocks, and publish named scalar outputs.
///
/// The expected call sequence is `build_mesh`, `initialize`, then repeated
/// `step` calls with contiguous intervals.
pub trait Block {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the block's unique name within a cascade.
    fn name(&self) -> &str;

    /// Builds any spatial discretization the block needs.
    ///
    /// Lumped blocks have nothing to build; the default does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the discretization cannot be built from the
    /// block's configuration.
    fn build_mesh(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Sets the block's initial state.
    ///
    /// # Errors
    ///
    /// Returns an error if the block cannot be initialized.
    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Advances the block over `[t, t + dt]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the block is not initialized or the step fails.
    fn step(&mut self, t: f64, dt: f64, inputs: &Inputs) -> Result<(), Self::Error>;

    /// Returns the value of an output port at time `t`, if available.
    fn output(&self, port: &str, t: f64) -> Option<f64>;

    /// Returns the time up to which the block's outputs are valid.
    fn ready_until(&self) -> Option<f64>;
}

/// The port values a block receives for one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    values: BTreeMap<String, f64>,
}

impl Inputs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of an input port, replacing any previous value.
    pub fn insert(&mut self, port: impl Into<String>, value: f64) {
        self.values.insert(port.into(), value);
    }

    /// Returns the value received on `port`, if any.
    #[must_use]
    pub fn get(&self, port: &str) -> Option<f64> {
        self.values.get(port).copied()
    }

    /// Returns the value received on `port`, or `default` when absent.
    #[must_use]
    pub fn get_or(&self, port: &str, default: f64) -> f64 {
        self.get(port).unwrap_or(default)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(port, &value)| (port.as_str(), value))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
