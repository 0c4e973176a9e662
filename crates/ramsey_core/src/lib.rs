pub mod error;
pub mod hjb;
pub mod model;
pub mod shooting;
pub mod solution;
pub mod solvers;
/// The `ramsey_core` crate provides the numerical engines for the
/// Ramsey-Cass-Koopmans optimal growth model.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction), `VectorField` (ODE right-hand sides),
///   `Stepper` (fixed-step integrators).
/// - **Model**: validated parameters, production/utility primitives and their closed-form
///   inverses, the interior steady state, and the capital/consumption vector field.
/// - **Shooting**: bisection over the initial consumption value with monotonicity
///   classification of forward-simulated trajectories.
/// - **HJB**: explicit upwind finite-difference value iteration on a capital grid, with
///   the consumption policy recovered from the value function's derivative.
/// - **Solution**: a driver that runs both engines and cross-checks them against the
///   analytic steady state.
pub mod traits;
