//! Explicit upwind finite-difference iteration of the stationary
//! Hamilton-Jacobi-Bellman equation on a uniform capital grid.
//!
//! Each sweep builds a fresh value iterate from the previous one; the
//! consumption policy falls out of the converged derivative through the
//! envelope condition c(k) = u'^-1(v'(k)).

use crate::error::SolverError;
use crate::model::ModelParameters;
use serde::{Deserialize, Serialize};

/// Settings controlling the value iteration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValueIterationSettings {
    /// Bound on the number of sweeps.
    pub max_iterations: usize,
    /// Per-point change below which the iteration is declared converged.
    pub tolerance: f64,
    /// Safety factor on the pseudo-time step relative to dk / max drift.
    pub cfl_safety: f64,
}

impl Default for ValueIterationSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            tolerance: 1e-6,
            cfl_safety: 0.25,
        }
    }
}

/// Whether the iteration met its tolerance or ran out of sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Convergence {
    Converged,
    /// The iteration bound was exhausted; the solution holds the last
    /// iterate and the supremum-norm change of the final sweep.
    IterationLimit { last_gap: f64 },
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged)
    }
}

/// Converged value-function samples over the capital grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueGrid {
    pub capital: Vec<f64>,
    pub value: Vec<f64>,
    /// Upwind derivative estimate at each grid point.
    pub derivative: Vec<f64>,
}

/// Result of a value iteration: the value grid, the implied consumption
/// policy, and the convergence status the caller must consult before
/// trusting the iterate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueIterationSolution {
    pub grid: ValueGrid,
    /// Consumption policy c(k) = u'^-1(v'(k)) at every grid point.
    pub policy: Vec<f64>,
    pub convergence: Convergence,
    /// Sweeps performed.
    pub iterations: usize,
}

/// Builds a uniformly spaced capital grid over `[min, max]`.
pub fn uniform_grid(min: f64, max: f64, points: usize) -> Result<Vec<f64>, SolverError> {
    if !(min > 0.0) {
        return Err(SolverError::InvalidGrid(format!(
            "lower bound must be positive, got {min}"
        )));
    }
    if !(max > min) {
        return Err(SolverError::InvalidGrid(format!(
            "bounds must satisfy min < max, got [{min}, {max}]"
        )));
    }
    if points < 3 {
        return Err(SolverError::InvalidGrid(format!(
            "grid needs at least 3 points, got {points}"
        )));
    }

    let dk = (max - min) / (points - 1) as f64;
    Ok((0..points).map(|i| min + dk * i as f64).collect())
}

/// The conventional starting iterate: utility of capital, pointwise.
pub fn utility_initial_guess(params: &ModelParameters, grid: &[f64]) -> Vec<f64> {
    grid.iter().map(|&k| params.utility(k)).collect()
}

fn values_close(a: f64, b: f64, tolerance: f64) -> bool {
    let gap = (a - b).abs();
    gap < tolerance || gap < tolerance * a.abs().max(b.abs())
}

fn validate_grid(grid: &[f64], initial_guess: &[f64]) -> Result<f64, SolverError> {
    if grid.len() < 3 {
        return Err(SolverError::InvalidGrid(format!(
            "grid needs at least 3 points, got {}",
            grid.len()
        )));
    }
    if initial_guess.len() != grid.len() {
        return Err(SolverError::InvalidGrid(format!(
            "initial guess has {} samples for a {}-point grid",
            initial_guess.len(),
            grid.len()
        )));
    }
    if !(grid[0] > 0.0) {
        return Err(SolverError::InvalidGrid(format!(
            "capital must be positive, grid starts at {}",
            grid[0]
        )));
    }

    let dk = grid[1] - grid[0];
    if !(dk > 0.0) {
        return Err(SolverError::InvalidGrid(
            "grid must be strictly increasing".to_string(),
        ));
    }
    for pair in grid.windows(2) {
        let spacing = pair[1] - pair[0];
        if !(spacing > 0.0) {
            return Err(SolverError::InvalidGrid(
                "grid must be strictly increasing".to_string(),
            ));
        }
        if (spacing - dk).abs() > 1e-8 * dk {
            return Err(SolverError::InvalidGrid(format!(
                "grid spacing must be uniform, found {spacing} against {dk}"
            )));
        }
    }
    Ok(dk)
}

/// Iterates the explicit upwind scheme for the stationary HJB equation until
/// every grid value settles within the tolerance, or the sweep bound runs
/// out. Hitting the bound is not an `Err`: the last iterate is returned
/// tagged `Convergence::IterationLimit` so the caller decides what to do
/// with a best-effort answer.
pub fn solve_value_function(
    params: &ModelParameters,
    grid: &[f64],
    initial_guess: &[f64],
    settings: &ValueIterationSettings,
) -> Result<ValueIterationSolution, SolverError> {
    params.validate()?;
    let dk = validate_grid(grid, initial_guess)?;

    if !(settings.tolerance > 0.0) {
        return Err(SolverError::InvalidParameters(format!(
            "convergence tolerance must be positive, got {}",
            settings.tolerance
        )));
    }
    if settings.max_iterations == 0 {
        return Err(SolverError::InvalidParameters(
            "max iterations must be at least 1".to_string(),
        ));
    }
    if !(settings.cfl_safety > 0.0) {
        return Err(SolverError::InvalidParameters(format!(
            "CFL safety factor must be positive, got {}",
            settings.cfl_safety
        )));
    }

    let n = grid.len();

    // Pseudo-time step sized against the largest drift the grid can carry,
    // keeping the explicit scheme stable.
    let max_drift = grid
        .iter()
        .map(|&k| params.net_output(k).abs())
        .fold(0.0f64, f64::max);
    let delta = settings.cfl_safety * dk / max_drift.max(f64::EPSILON);

    let mut value = initial_guess.to_vec();
    let mut derivative = vec![0.0; n];
    let mut policy = vec![0.0; n];

    let mut converged_at = None;
    let mut last_gap = f64::INFINITY;

    for sweep in 1..=settings.max_iterations {
        let mut next = vec![0.0; n];
        let mut all_close = true;
        let mut gap = 0.0f64;

        for i in 0..n {
            let k = grid[i];
            let net = params.net_output(k);
            // State-constraint boundary: where a one-sided difference has no
            // neighbor, pin the derivative to marginal utility at zero
            // capital drift so the state cannot leave the domain.
            let constrained = params.utility_derivative(net);

            let forward = if i + 1 < n {
                (value[i + 1] - value[i]) / dk
            } else {
                constrained
            };
            let backward = if i > 0 {
                (value[i] - value[i - 1]) / dk
            } else {
                constrained
            };

            let drift_forward = net - params.inverse_utility_derivative(forward);
            let drift_backward = net - params.inverse_utility_derivative(backward);

            // Upwind switch on the sign of the drift; when neither one-sided
            // scheme is consistent the drift is treated as zero and the
            // stationary derivative is used.
            let dv = if drift_forward > 0.0 {
                forward
            } else if drift_backward < 0.0 {
                backward
            } else {
                constrained
            };

            let consumption = params.inverse_utility_derivative(dv);
            next[i] = (1.0 - params.discount * delta) * value[i]
                + delta * (params.utility(consumption) + dv * (net - consumption));

            derivative[i] = dv;
            policy[i] = consumption;

            let change = (next[i] - value[i]).abs();
            gap = gap.max(change);
            if !values_close(next[i], value[i], settings.tolerance) {
                all_close = false;
            }
        }

        value = next;
        last_gap = gap;

        if all_close {
            converged_at = Some(sweep);
            break;
        }
    }

    let (convergence, iterations) = match converged_at {
        Some(sweep) => (Convergence::Converged, sweep),
        None => (
            Convergence::IterationLimit { last_gap },
            settings.max_iterations,
        ),
    };

    Ok(ValueIterationSolution {
        grid: ValueGrid {
            capital: grid.to_vec(),
            value,
            derivative,
        },
        policy,
        convergence,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        solve_value_function, uniform_grid, utility_initial_guess, Convergence,
        ValueIterationSettings,
    };
    use crate::error::SolverError;
    use crate::model::ModelParameters;

    fn reference() -> ModelParameters {
        ModelParameters::new(0.3, 5.0, 0.05, 0.1).expect("reference parameters are valid")
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T, SolverError>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn uniform_grid_spans_the_requested_interval() {
        let grid = uniform_grid(0.01, 10.0, 250).expect("grid should build");
        assert_eq!(grid.len(), 250);
        assert!((grid[0] - 0.01).abs() < 1e-12);
        assert!((grid[249] - 10.0).abs() < 1e-12);
        let dk = grid[1] - grid[0];
        for pair in grid.windows(2) {
            assert!((pair[1] - pair[0] - dk).abs() < 1e-10);
        }
    }

    #[test]
    fn uniform_grid_rejects_bad_bounds() {
        assert_err_contains(uniform_grid(0.0, 10.0, 250), "positive");
        assert_err_contains(uniform_grid(1.0, 1.0, 250), "min < max");
        assert_err_contains(uniform_grid(0.01, 10.0, 2), "at least 3");
    }

    #[test]
    fn rejects_non_uniform_or_mismatched_inputs() {
        let params = reference();
        let settings = ValueIterationSettings::default();

        let ragged = vec![0.1, 0.2, 0.5];
        assert_err_contains(
            solve_value_function(&params, &ragged, &[0.0; 3], &settings),
            "uniform",
        );

        let grid = uniform_grid(0.1, 1.0, 10).expect("grid should build");
        assert_err_contains(
            solve_value_function(&params, &grid, &[0.0; 9], &settings),
            "initial guess",
        );

        assert_err_contains(
            solve_value_function(
                &params,
                &grid,
                &vec![0.0; 10],
                &ValueIterationSettings {
                    tolerance: 0.0,
                    ..ValueIterationSettings::default()
                },
            ),
            "tolerance",
        );
    }

    #[test]
    fn reference_problem_converges_from_the_utility_guess() {
        let params = reference();
        let steady = params.steady_state();
        let grid = uniform_grid(0.01, 10.0, 250).expect("grid should build");
        let guess = utility_initial_guess(&params, &grid);

        let solution = solve_value_function(&params, &grid, &guess, &ValueIterationSettings::default())
            .expect("value iteration should run");

        assert!(
            solution.convergence.is_converged(),
            "did not converge: {:?}",
            solution.convergence
        );
        assert!(solution.iterations <= 100_000);

        // Value function increasing in capital.
        for pair in solution.grid.value.windows(2) {
            assert!(pair[1] >= pair[0] - 1e-9, "value function not monotone");
        }

        // Policy non-decreasing in a window around the steady state, and
        // consistent with the analytic steady-state consumption there.
        let dk = grid[1] - grid[0];
        let idx = ((steady.capital - grid[0]) / dk).round() as usize;
        for i in (idx - 5)..(idx + 5) {
            assert!(
                solution.policy[i + 1] >= solution.policy[i] - 1e-9,
                "policy not monotone near the steady state at index {i}"
            );
        }
        assert!(
            (solution.policy[idx] - steady.consumption).abs() < 0.1,
            "policy at k* is {}, expected about {}",
            solution.policy[idx],
            steady.consumption
        );
    }

    #[test]
    fn iteration_limit_returns_the_last_iterate_tagged() {
        let params = reference();
        let grid = uniform_grid(0.01, 10.0, 50).expect("grid should build");
        let guess = utility_initial_guess(&params, &grid);

        let solution = solve_value_function(
            &params,
            &grid,
            &guess,
            &ValueIterationSettings {
                max_iterations: 3,
                ..ValueIterationSettings::default()
            },
        )
        .expect("value iteration should still return");

        assert_eq!(solution.iterations, 3);
        assert!(!solution.convergence.is_converged());
        match solution.convergence {
            Convergence::IterationLimit { last_gap } => assert!(last_gap.is_finite()),
            Convergence::Converged => panic!("expected iteration limit"),
        }
        assert_eq!(solution.grid.value.len(), 50);
        assert_eq!(solution.policy.len(), 50);
    }
}
