use std::{fmt, sync::Arc};

use cascade_mesh::{MeshConfig, MeshError};

/// A coefficient or forcing field `(s, t) -> value`.
pub type FieldFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// A boundary signal `t -> value` or an initial profile `s -> value`.
pub type CurveFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Configuration for a [`HyperbolicBlock`](super::HyperbolicBlock).
///
/// The block solves, for the unknowns `x` and `y`,
///
/// ```text
/// dx/dt = B11·x + B12·y + F1   along ds/dt = −C1
/// dy/dt = B21·x + B22·y + F2   along ds/dt = +C2
/// ```
///
/// on the domain and resolution described by [`MeshConfig`]. Coefficients,
/// forcing and initial profiles default to zero. Boundary signals default to
/// none, in which case the block falls back to values received on its `left`
/// and `right` input ports, then to the previous value.
#[derive(Clone)]
pub struct HyperbolicConfig {
    pub(super) mesh: MeshConfig,
    pub(super) b11: FieldFn,
    pub(super) b12: FieldFn,
    pub(super) b21: FieldFn,
    pub(super) b22: FieldFn,
    pub(super) f1: FieldFn,
    pub(super) f2: FieldFn,
    pub(super) left_boundary: Option<CurveFn>,
    pub(super) right_boundary: Option<CurveFn>,
    pub(super) initial_x: CurveFn,
    pub(super) initial_y: CurveFn,
}

impl HyperbolicConfig {
    /// Creates a configuration with zero coefficients, forcing and initial
    /// profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh configuration is invalid: bad bounds,
    /// non-positive speeds, or not exactly one of `m` and `h`.
    pub fn new(mesh: MeshConfig) -> Result<Self, MeshError> {
        mesh.discretization()?;

        let zero_field: FieldFn = Arc::new(|_, _| 0.0);
        let zero_curve: CurveFn = Arc::new(|_| 0.0);

        Ok(Self {
            mesh,
            b11: Arc::clone(&zero_field),
            b12: Arc::clone(&zero_field),
            b21: Arc::clone(&zero_field),
            b22: Arc::clone(&zero_field),
            f1: Arc::clone(&zero_field),
            f2: zero_field,
            left_boundary: None,
            right_boundary: None,
            initial_x: Arc::clone(&zero_curve),
            initial_y: zero_curve,
        })
    }

    #[must_use]
    pub fn mesh(&self) -> &MeshConfig {
        &self.mesh
    }

    #[must_use]
    pub fn with_b11(mut self, f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        self.b11 = Arc::new(f);
        self
    }

    #[must_use]
    pub fn with_b12(mut self, f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        self.b12 = Arc::new(f);
        self
    }

    #[must_use]
    pub fn with_b21(mut self, f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        self.b21 = Arc::new(f);
        self
    }

    #[must_use]
    pub fn with_b22(mut self, f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        self.b22 = Arc::new(f);
        self
    }

    #[must_use]
    pub fn with_f1(mut self, f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        self.f1 = Arc::new(f);
        self
    }

    #[must_use]
    pub fn with_f2(mut self, f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        self.f2 = Arc::new(f);
        self
    }

    /// Prescribes `y` on the `S0` edge.
    #[must_use]
    pub fn with_left_boundary(mut self, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        self.left_boundary = Some(Arc::new(f));
        self
    }

    /// Prescribes `x` on the `S1` edge.
    #[must_use]
    pub fn with_right_boundary(mut self, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        self.right_boundary = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn with_initial_x(mut self, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        self.initial_x = Arc::new(f);
        self
    }

    #[must_use]
    pub fn with_initial_y(mut self, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        self.initial_y = Arc::new(f);
        self
    }

    #[must_use]
    pub fn has_left_boundary(&self) -> bool {
        self.left_boundary.is_some()
    }

    #[must_use]
    pub fn has_right_boundary(&self) -> bool {
        self.right_boundary.is_some()
    }

    /// Evaluates `[[B11, B12], [B21, B22]]` at `(s, t)`.
    pub(super) fn coefficients(&self, s: f64, t: f64) -> [[f64; 2]; 2] {
        [
            [(self.b11)(s, t), (self.b12)(s, t)],
            [(self.b21)(s, t), (self.b22)(s, t)],
        ]
    }

    /// Evaluates `[F1, F2]` at `(s, t)`.
    pub(super) fn forcing(&self, s: f64, t: f64) -> [f64; 2] {
        [(self.f1)(s, t), (self.f2)(s, t)]
    }
}

impl fmt::Debug for HyperbolicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperbolicConfig")
            .field("mesh", &self.mesh)
            .field("left_boundary", &self.left_boundary.is_some())
            .field("right_boundary", &self.right_boundary.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cascade_mesh::ConfigError;

    fn mesh() -> MeshConfig {
        MeshConfig::with_node_count([0.0, 5.0], [0.0, 2.0], [1.0, 1.0], 10)
    }

    #[test]
    fn defaults_are_zero_without_boundaries() {
        let config = HyperbolicConfig::new(mesh()).unwrap();

        assert_eq!(config.coefficients(1.0, 2.0), [[0.0; 2]; 2]);
        assert_eq!(config.forcing(1.0, 2.0), [0.0; 2]);
        assert_eq!((config.initial_x)(3.0), 0.0);
        assert!(!config.has_left_boundary());
        assert!(!config.has_right_boundary());
    }

    #[test]
    fn setters_replace_fields() {
        let config = HyperbolicConfig::new(mesh())
            .unwrap()
            .with_b12(|s, t| s + t)
            .with_f2(|_, t| 2.0 * t)
            .with_left_boundary(f64::sin);

        assert_eq!(config.coefficients(1.0, 2.0), [[0.0, 3.0], [0.0, 0.0]]);
        assert_eq!(config.forcing(0.0, 4.0), [0.0, 8.0]);
        assert!(config.has_left_boundary());
    }

    #[test]
    fn fails_fast_without_resolution() {
        let config = MeshConfig { m: None, ..mesh() };

        assert!(matches!(
            HyperbolicConfig::new(config),
            Err(MeshError::Config(ConfigError::Resolution))
        ));
    }

    #[test]
    fn debug_lists_boundaries() {
        let config = HyperbolicConfig::new(mesh())
            .unwrap()
            .with_right_boundary(|_| 1.0);
        let debug = format!("{config:?}");

        assert!(debug.contains("right_boundary: true"));
        assert!(debug.contains("left_boundary: false"));
    }
}
