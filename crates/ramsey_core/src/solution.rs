//! Driver running both engines on one parameter set and checking them
//! against each other and against the analytic steady state.
//!
//! The two engines solve the same control problem by unrelated means, so
//! agreement between the shooting trajectory's endpoint, the HJB policy at
//! k*, and the closed-form steady state is a strong end-to-end check.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::hjb::{
    solve_value_function, uniform_grid, utility_initial_guess, ValueIterationSettings,
    ValueIterationSolution,
};
use crate::model::{ModelParameters, SteadyState};
use crate::shooting::{find_optimal_path, ShootingSettings, Trajectory};

/// Options for a combined solve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Capital stock the shooting trajectory starts from.
    pub initial_capital: f64,
    /// Simulated steps per shooting trial.
    pub horizon_steps: usize,
    /// Number of capital grid points for the value iteration.
    pub grid_points: usize,
    pub shooting: ShootingSettings,
    pub value_iteration: ValueIterationSettings,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            initial_capital: 1.0,
            horizon_steps: 5000,
            grid_points: 250,
            shooting: ShootingSettings::default(),
            value_iteration: ValueIterationSettings::default(),
        }
    }
}

/// How far apart the two engines and the analytic steady state ended up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CrossCheck {
    /// |k_end - k*| for the accepted shooting trajectory.
    pub terminal_capital_gap: f64,
    /// |c_end - c*| for the accepted shooting trajectory.
    pub terminal_consumption_gap: f64,
    /// |c(k*) - c*| for the HJB policy at the grid point nearest k*.
    pub policy_gap_at_steady_state: f64,
}

/// Everything a plotting or reporting collaborator needs from one solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSolution {
    pub steady_state: SteadyState,
    pub trajectory: Trajectory,
    pub value: ValueIterationSolution,
    pub cross_check: CrossCheck,
}

/// Runs the shooting search and the value iteration on `params`.
///
/// The consumption bracket spans (almost) the whole feasible range at the
/// initial capital stock, and the capital grid is centered on the steady
/// state, so no calibration knowledge beyond the parameters is needed.
pub fn solve_model(params: &ModelParameters, options: &SolveOptions) -> Result<ModelSolution> {
    params.validate().context("model parameters rejected")?;
    let steady = params.steady_state();

    // Along any path that accumulates capital, consumption stays below net
    // output at the starting stock; that bounds the saddle value from above.
    let feasible_ceiling = params.net_output(options.initial_capital);
    if !(feasible_ceiling > 0.0) {
        bail!(
            "initial capital {} yields non-positive net output; no feasible consumption bracket",
            options.initial_capital
        );
    }
    let bracket = (feasible_ceiling * 1e-6, feasible_ceiling);

    let trajectory = find_optimal_path(
        params,
        options.initial_capital,
        bracket,
        options.horizon_steps,
        &options.shooting,
    )
    .context("shooting search failed")?;

    let grid = uniform_grid(
        steady.capital / 100.0,
        steady.capital * 4.0,
        options.grid_points,
    )
    .context("building capital grid")?;
    let guess = utility_initial_guess(params, &grid);
    let value = solve_value_function(params, &grid, &guess, &options.value_iteration)
        .context("value iteration failed")?;
    if !value.convergence.is_converged() {
        bail!(
            "value iteration hit the {}-sweep limit before meeting tolerance",
            value.iterations
        );
    }

    let end = trajectory
        .final_point()
        .context("accepted trajectory is empty")?;
    let dk = grid[1] - grid[0];
    let idx = (((steady.capital - grid[0]) / dk).round() as usize).min(grid.len() - 1);

    let cross_check = CrossCheck {
        terminal_capital_gap: (end.capital - steady.capital).abs(),
        terminal_consumption_gap: (end.consumption - steady.consumption).abs(),
        policy_gap_at_steady_state: (value.policy[idx] - steady.consumption).abs(),
    };

    Ok(ModelSolution {
        steady_state: steady,
        trajectory,
        value,
        cross_check,
    })
}

#[cfg(test)]
mod tests {
    use super::{solve_model, SolveOptions};
    use crate::model::ModelParameters;

    fn reference() -> ModelParameters {
        ModelParameters::new(0.3, 5.0, 0.05, 0.1).expect("reference parameters are valid")
    }

    #[test]
    fn engines_agree_on_the_reference_calibration() {
        let params = reference();
        let solution =
            solve_model(&params, &SolveOptions::default()).expect("combined solve should succeed");

        assert!(
            solution.cross_check.terminal_capital_gap < 0.3,
            "terminal capital gap {}",
            solution.cross_check.terminal_capital_gap
        );
        assert!(
            solution.cross_check.terminal_consumption_gap < 0.15,
            "terminal consumption gap {}",
            solution.cross_check.terminal_consumption_gap
        );
        assert!(
            solution.cross_check.policy_gap_at_steady_state < 0.1,
            "policy gap {}",
            solution.cross_check.policy_gap_at_steady_state
        );
        assert!(solution.value.convergence.is_converged());
    }

    #[test]
    fn invalid_parameters_fail_before_any_engine_runs() {
        let params = ModelParameters {
            capital_share: 2.0,
            risk_aversion: 5.0,
            depreciation: 0.05,
            discount: 0.1,
        };

        let err = solve_model(&params, &SolveOptions::default())
            .expect_err("invalid parameters must be rejected");
        assert!(format!("{err:#}").contains("capital share"));
    }
}
