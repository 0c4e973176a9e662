use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types usable as scalars in the simulation engines.
/// Must support floating-point arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// An autonomous or time-dependent ODE right-hand side.
pub trait VectorField<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the vector field.
    /// t: current time
    /// state: current state
    /// out: buffer receiving d(state)/dt
    fn eval(&self, t: T, state: &[T], out: &mut [T]);
}

/// A trait for fixed-step integrators advancing a vector field.
pub trait Stepper<T: Scalar> {
    /// Performs one step of size dt.
    /// t: current time (updated after the step)
    /// state: current state (updated after the step)
    fn step(&mut self, field: &impl VectorField<T>, t: &mut T, state: &mut [T], dt: T);
}
