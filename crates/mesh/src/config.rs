use serde::{Deserialize, Serialize};

use crate::{ConfigError, Discretization, MeshError, Rectangle, Resolution};

/// Key/value description of a characteristic mesh.
///
/// Field names follow the conventional symbols: `S` and `T` are the domain
/// bounds, `C` the two wave speeds, and exactly one of `m` (node count) or
/// `h` (time step) selects the resolution.
///
/// ```json
/// { "S": [0.0, 1.0], "T": [0.0, 0.5], "C": [1.0, 2.0], "m": 10 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    #[serde(rename = "S")]
    pub s: [f64; 2],

    #[serde(rename = "T")]
    pub t: [f64; 2],

    #[serde(rename = "C")]
    pub c: [f64; 2],

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
}

impl MeshConfig {
    /// Configuration that splits the spatial extent into `2m` steps.
    #[must_use]
    pub fn with_node_count(s: [f64; 2], t: [f64; 2], c: [f64; 2], m: usize) -> Self {
        Self {
            s,
            t,
            c,
            m: Some(m),
            h: None,
        }
    }

    /// Configuration that targets a time step of `h` per lattice layer.
    #[must_use]
    pub fn with_time_step(s: [f64; 2], t: [f64; 2], c: [f64; 2], h: f64) -> Self {
        Self {
            s,
            t,
            c,
            m: None,
            h: Some(h),
        }
    }

    /// Returns the domain rectangle.
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds are non-finite or reversed.
    pub fn frame(&self) -> Result<Rectangle, MeshError> {
        Rectangle::new(self.s, self.t)
    }

    /// Returns the requested resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Resolution`] unless exactly one of `m` and `h` is set.
    pub fn resolution(&self) -> Result<Resolution, ConfigError> {
        Resolution::from_parts(self.m, self.h)
    }

    /// Validates the whole configuration and derives its discretization.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: bounds, then resolution, then speeds.
    pub fn discretization(&self) -> Result<Discretization, MeshError> {
        let frame = self.frame()?;
        Ok(Discretization::new(&frame, self.c, self.resolution()?)?)
    }
}
