use std::ops::RangeInclusive;

use crate::{ConfigError, Rectangle};

/// How the step sizes of a characteristic mesh are chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Target node count `m`: the spatial extent is split into `2m` steps.
    NodeCount(usize),

    /// Target time step `h`, split between the two characteristic families.
    TimeStep(f64),
}

impl Resolution {
    /// Builds a resolution from optional `m` and `h` settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Resolution`] unless exactly one is given.
    pub fn from_parts(m: Option<usize>, h: Option<f64>) -> Result<Self, ConfigError> {
        match (m, h) {
            (Some(m), None) => Ok(Self::NodeCount(m)),
            (None, Some(h)) => Ok(Self::TimeStep(h)),
            _ => Err(ConfigError::Resolution),
        }
    }
}

/// Step sizes and index ranges of a characteristic mesh.
///
/// The two families share the spatial step `ds`; family one advances time by
/// `dt1 = ds / C1` per step and family two by `dt2 = ds / C2`. The symmetric
/// index ranges are wide enough that the fan of characteristics through the
/// domain center reaches every corner of the domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discretization {
    speeds: [f64; 2],
    ds: f64,
    dt1: f64,
    dt2: f64,
    i_radius: i64,
    j_radius: i64,
}

impl Discretization {
    /// Derives the discretization of `frame` for wave speeds `[C1, C2]`.
    ///
    /// # Errors
    ///
    /// Returns an error if a speed is not finite and positive, if `m` is zero,
    /// if `h` is not finite and positive, or if `m` is used on a frame with no
    /// spatial extent.
    pub fn new(
        frame: &Rectangle,
        speeds: [f64; 2],
        resolution: Resolution,
    ) -> Result<Self, ConfigError> {
        let [c1, c2] = speeds;
        if !(c1.is_finite() && c2.is_finite() && c1 > 0.0 && c2 > 0.0) {
            return Err(ConfigError::WaveSpeed(c1, c2));
        }

        let ds = match resolution {
            Resolution::NodeCount(0) => return Err(ConfigError::NodeCount),
            Resolution::NodeCount(m) => {
                if frame.width() <= 0.0 {
                    return Err(ConfigError::DegenerateFrame);
                }
                frame.width() / (2.0 * m as f64)
            }
            Resolution::TimeStep(h) => {
                if !h.is_finite() || h <= 0.0 {
                    return Err(ConfigError::TimeStep(h));
                }
                h * c1 * c2 / (c1 + c2)
            }
        };
        let dt1 = ds / c1;
        let dt2 = ds / c2;

        let rs = frame.width() / 2.0;
        let rt = frame.height() / 2.0;

        Ok(Self {
            speeds,
            ds,
            dt1,
            dt2,
            i_radius: index_radius(rs / ds, rt / dt1),
            j_radius: index_radius(rs / ds, rt / dt2),
        })
    }

    /// Shorthand for [`Discretization::new`] with [`Resolution::NodeCount`].
    ///
    /// # Errors
    ///
    /// See [`Discretization::new`].
    pub fn from_node_count(
        frame: &Rectangle,
        speeds: [f64; 2],
        m: usize,
    ) -> Result<Self, ConfigError> {
        Self::new(frame, speeds, Resolution::NodeCount(m))
    }

    /// Shorthand for [`Discretization::new`] with [`Resolution::TimeStep`].
    ///
    /// # Errors
    ///
    /// See [`Discretization::new`].
    pub fn from_time_step(
        frame: &Rectangle,
        speeds: [f64; 2],
        h: f64,
    ) -> Result<Self, ConfigError> {
        Self::new(frame, speeds, Resolution::TimeStep(h))
    }

    /// Returns the wave speeds `[C1, C2]`.
    #[must_use]
    pub fn speeds(&self) -> [f64; 2] {
        self.speeds
    }

    /// Returns the spatial step shared by both families.
    #[must_use]
    pub fn ds(&self) -> f64 {
        self.ds
    }

    /// Returns the time step of the negative family, `ds / C1`.
    #[must_use]
    pub fn dt1(&self) -> f64 {
        self.dt1
    }

    /// Returns the time step of the positive family, `ds / C2`.
    #[must_use]
    pub fn dt2(&self) -> f64 {
        self.dt2
    }

    #[must_use]
    pub fn i_radius(&self) -> i64 {
        self.i_radius
    }

    #[must_use]
    pub fn j_radius(&self) -> i64 {
        self.j_radius
    }

    /// Returns `-i_r..=i_r`.
    #[must_use]
    pub fn i_range(&self) -> RangeInclusive<i64> {
        -self.i_radius..=self.i_radius
    }

    /// Returns `-j_r..=j_r`.
    #[must_use]
    pub fn j_range(&self) -> RangeInclusive<i64> {
        -self.j_radius..=self.j_radius
    }
}

#[allow(clippy::cast_possible_truncation)]
fn index_radius(space_steps: f64, time_steps: f64) -> i64 {
    space_steps.max(time_steps).ceil() as i64
}
