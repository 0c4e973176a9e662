use crate::traits::{Scalar, Stepper, VectorField};

/// Explicit forward Euler stepper.
///
/// The slope is evaluated once at the current state, so the update for a
/// state component x is exactly x + dt * f(x). The saddle-path search relies
/// on this first-order rule; higher-order steppers would change which trial
/// paths classify as monotone.
pub struct ForwardEuler<T: Scalar> {
    slope: Vec<T>,
}

impl<T: Scalar> ForwardEuler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            slope: vec![T::from_f64(0.0).unwrap(); dim],
        }
    }
}

impl<T: Scalar> Stepper<T> for ForwardEuler<T> {
    fn step(&mut self, field: &impl VectorField<T>, t: &mut T, state: &mut [T], dt: T) {
        let t0 = *t;

        field.eval(t0, state, &mut self.slope);

        for i in 0..state.len() {
            state[i] = state[i] + dt * self.slope[i];
        }

        *t = t0 + dt;
    }
}

#[cfg(test)]
mod tests {
    use super::ForwardEuler;
    use crate::traits::{Stepper, VectorField};

    struct Decay {
        rate: f64,
    }

    impl VectorField<f64> for Decay {
        fn dimension(&self) -> usize {
            1
        }

        fn eval(&self, _t: f64, state: &[f64], out: &mut [f64]) {
            out[0] = -self.rate * state[0];
        }
    }

    #[test]
    fn euler_step_matches_first_order_update() {
        let field = Decay { rate: 2.0 };
        let mut stepper = ForwardEuler::new(1);
        let mut t = 0.0;
        let mut state = [1.0];

        stepper.step(&field, &mut t, &mut state, 0.1);

        assert!((state[0] - (1.0 - 2.0 * 0.1)).abs() < 1e-15);
        assert!((t - 0.1).abs() < 1e-15);
    }

    #[test]
    fn euler_converges_to_exponential_as_dt_shrinks() {
        let field = Decay { rate: 1.0 };
        let mut stepper = ForwardEuler::new(1);
        let mut t = 0.0;
        let mut state = [1.0];
        let dt = 1e-4;

        for _ in 0..10_000 {
            stepper.step(&field, &mut t, &mut state, dt);
        }

        assert!((state[0] - (-1.0f64).exp()).abs() < 1e-4);
    }
}
