/// A block state that can be advanced by a derivative over a time step.
///
/// Lumped blocks step their state as `state + derivative * dt`. Implementing
/// this trait for a state type lets the same explicit integrators (Euler,
/// RK4 stages) drive scalar and multi-component states alike.
pub trait StepIntegrable<Delta> {
    /// The time derivative of the state.
    type Derivative;

    /// Returns the state after stepping with `derivative` over `delta`.
    #[must_use]
    fn step(&self, derivative: Self::Derivative, delta: Delta) -> Self;
}

/// Shorthand for the derivative type of a [`StepIntegrable`] state.
pub type DerivativeOf<T, Delta> = <T as StepIntegrable<Delta>>::Derivative;

impl StepIntegrable<f64> for f64 {
    type Derivative = f64;

    fn step(&self, derivative: f64, delta: f64) -> Self {
        self + derivative * delta
    }
}

impl<const N: usize> StepIntegrable<f64> for [f64; N] {
    type Derivative = [f64; N];

    fn step(&self, derivative: [f64; N], delta: f64) -> Self {
        std::array::from_fn(|k| self[k] + derivative[k] * delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn step_scalar_state() {
        let next = 1.5_f64.step(2.0, 0.25);
        assert_relative_eq!(next, 2.0);
    }

    #[test]
    fn step_pair_state() {
        let state: [f64; 2] = [1.0, -1.0];
        let next = state.step([0.5, 4.0], 2.0);
        assert_eq!(next, [2.0, 7.0]);
    }

    #[test]
    fn derivative_alias_names_the_associated_type() {
        let slope: DerivativeOf<f64, f64> = 3.0;
        assert_relative_eq!(0.0_f64.step(slope, 1.0), 3.0);
    }
}
