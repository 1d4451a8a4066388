use crate::TIME_EPS;

/// The producing end of a connection: a block and one of its output ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    pub block: String,
    pub port: String,
}

impl Source {
    #[must_use]
    pub fn new(block: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            block: block.into(),
            port: port.into(),
        }
    }
}

/// The consuming end of a connection: a block and one of its input ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub block: String,
    pub port: String,
}

impl Target {
    #[must_use]
    pub fn new(block: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            block: block.into(),
            port: port.into(),
        }
    }
}

impl<T: Into<String>> From<(T, T)> for Source {
    fn from((block, port): (T, T)) -> Self {
        Self::new(block, port)
    }
}

impl<T: Into<String>> From<(T, T)> for Target {
    fn from((block, port): (T, T)) -> Self {
        Self::new(block, port)
    }
}

/// A directed link carrying one scalar port value between two blocks.
///
/// The connection records how far in time its producer has been solved.
/// Consumers poll [`Connection::is_ready`] before reading; a connection that
/// is not ready yields no value rather than blocking.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub source: Source,
    pub target: Target,
    ready_until: Option<f64>,
}

impl Connection {
    #[must_use]
    pub fn new(source: impl Into<Source>, target: impl Into<Target>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ready_until: None,
        }
    }

    /// Returns the time up to which the producer's value is available.
    #[must_use]
    pub fn ready_until(&self) -> Option<f64> {
        self.ready_until
    }

    /// Returns `true` if the producer has been solved through time `t`.
    #[must_use]
    pub fn is_ready(&self, t: f64) -> bool {
        self.ready_until.is_some_and(|until| t <= until + TIME_EPS)
    }

    /// Records that the producer's value is available up to `until`.
    pub fn mark_ready(&mut self, until: f64) {
        self.ready_until = Some(until);
    }

    /// Clears the readiness mark.
    pub fn reset(&mut self) {
        self.ready_until = None;
    }
}
