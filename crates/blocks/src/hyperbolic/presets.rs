use cascade_mesh::{MeshConfig, MeshError};
use serde::{Deserialize, Serialize};

use super::HyperbolicConfig;

/// Constant coefficients and forcing of a linear hyperbolic system.
///
/// Missing keys default to zero, so `{ "B11": -0.5 }` describes a system
/// with only `x` decaying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coefficients {
    #[serde(rename = "B11")]
    pub b11: f64,
    #[serde(rename = "B12")]
    pub b12: f64,
    #[serde(rename = "B21")]
    pub b21: f64,
    #[serde(rename = "B22")]
    pub b22: f64,
    #[serde(rename = "F1")]
    pub f1: f64,
    #[serde(rename = "F2")]
    pub f2: f64,
}

impl HyperbolicConfig {
    /// A system with constant coefficients and forcing.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh configuration is invalid.
    pub fn linear(mesh: MeshConfig, coefficients: Coefficients) -> Result<Self, MeshError> {
        let Coefficients {
            b11,
            b12,
            b21,
            b22,
            f1,
            f2,
        } = coefficients;

        Ok(Self::new(mesh)?
            .with_b11(move |_, _| b11)
            .with_b12(move |_, _| b12)
            .with_b21(move |_, _| b21)
            .with_b22(move |_, _| b22)
            .with_f1(move |_, _| f1)
            .with_f2(move |_, _| f2))
    }

    /// The damped wave equation `u_tt = c²·u_ss − damping·u_t`.
    ///
    /// Both families travel at speed `c`, overriding the speeds in `mesh`,
    /// and `x` decays at rate `damping`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh configuration is invalid or `c` is not a
    /// finite positive speed.
    pub fn wave_equation(mesh: MeshConfig, c: f64, damping: f64) -> Result<Self, MeshError> {
        let mesh = MeshConfig { c: [c, c], ..mesh };
        Self::linear(
            mesh,
            Coefficients {
                b11: -damping,
                ..Coefficients::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cascade_mesh::ConfigError;

    fn mesh() -> MeshConfig {
        MeshConfig::with_node_count([0.0, 1.0], [0.0, 1.0], [1.0, 2.0], 4)
    }

    #[test]
    fn linear_uses_constant_fields() {
        let config = HyperbolicConfig::linear(
            mesh(),
            Coefficients {
                b11: 1.0,
                b12: 2.0,
                b21: 3.0,
                b22: 4.0,
                f1: 5.0,
                f2: 6.0,
            },
        )
        .unwrap();

        assert_eq!(config.coefficients(0.3, 0.7), [[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(config.forcing(0.9, 0.1), [5.0, 6.0]);
    }

    #[test]
    fn wave_equation_sets_equal_speeds_and_damping() {
        let config = HyperbolicConfig::wave_equation(mesh(), 3.0, 0.25).unwrap();

        assert_eq!(config.mesh().c, [3.0, 3.0]);
        assert_eq!(config.coefficients(0.5, 0.5), [[-0.25, 0.0], [0.0, 0.0]]);
        assert_eq!(config.forcing(0.5, 0.5), [0.0, 0.0]);
    }

    #[test]
    fn wave_equation_rejects_zero_speed() {
        assert!(matches!(
            HyperbolicConfig::wave_equation(mesh(), 0.0, 0.0),
            Err(MeshError::Config(ConfigError::WaveSpeed(..)))
        ));
    }

    #[test]
    fn coefficients_deserialize_with_defaults() {
        let coefficients: Coefficients = serde_json::from_str(r#"{ "B11": -0.5, "F2": 1.0 }"#).unwrap();

        assert_eq!(
            coefficients,
            Coefficients {
                b11: -0.5,
                f2: 1.0,
                ..Coefficients::default()
            }
        );
    }
}
