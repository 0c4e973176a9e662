//! Saddle-path search by bisection over the initial consumption value.
//!
//! For a given initial capital stock, the unique trajectory converging to the
//! steady state is monotone in both capital and consumption; every other
//! trajectory eventually breaks monotonicity in one variable, and the
//! direction of the break tells which side of the saddle value the trial
//! consumption sits on. Bisection over the initial consumption therefore
//! closes in on the saddle path without ever solving the boundary-value
//! problem directly.

use crate::error::SolverError;
use crate::model::{ModelParameters, RamseyDynamics};
use crate::solvers::ForwardEuler;
use crate::traits::Stepper;
use serde::{Deserialize, Serialize};

/// One sample of the simulated path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub capital: f64,
    pub consumption: f64,
}

/// An accepted saddle-path trajectory, ordered by time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub points: Vec<PathPoint>,
    /// The initial consumption value the bisection settled on.
    pub initial_consumption: f64,
    /// Bisection iterations spent before the path was accepted.
    pub iterations: usize,
}

impl Trajectory {
    pub fn final_point(&self) -> Option<PathPoint> {
        self.points.last().copied()
    }

    /// Capital samples in time order, for downstream plotting.
    pub fn capital(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.capital)
    }

    /// Consumption samples in time order, for downstream plotting.
    pub fn consumption(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.consumption)
    }
}

/// Settings controlling the bisection search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShootingSettings {
    /// Time increment of the forward simulation.
    pub step_size: f64,
    /// Bound on the number of bisection iterations.
    pub max_iterations: usize,
}

impl Default for ShootingSettings {
    fn default() -> Self {
        Self {
            step_size: 0.01,
            max_iterations: 10_000,
        }
    }
}

/// Monotonicity signals of a sampled sequence. A constant sequence satisfies
/// both, so the flags adjudicate direction only when one of them fails.
#[derive(Debug, Clone, Copy)]
struct Monotonicity {
    non_decreasing: bool,
    non_increasing: bool,
}

fn classify<F: Fn(&PathPoint) -> f64>(points: &[PathPoint], select: F) -> Monotonicity {
    let mut non_decreasing = true;
    let mut non_increasing = true;
    for pair in points.windows(2) {
        let diff = select(&pair[1]) - select(&pair[0]);
        if diff < 0.0 {
            non_decreasing = false;
        }
        if diff > 0.0 {
            non_increasing = false;
        }
    }
    Monotonicity {
        non_decreasing,
        non_increasing,
    }
}

/// Simulates the capital/consumption dynamics forward and keeps the longest
/// prefix of finite samples. A runaway trial is expected behavior, not a
/// failure: the truncated prefix still carries the monotonicity signal.
fn simulate(
    field: &RamseyDynamics,
    stepper: &mut ForwardEuler<f64>,
    initial_capital: f64,
    initial_consumption: f64,
    horizon_steps: usize,
    step_size: f64,
) -> Vec<PathPoint> {
    let mut points = Vec::with_capacity(horizon_steps + 1);
    let mut state = [initial_capital, initial_consumption];
    let mut t = 0.0;

    points.push(PathPoint {
        capital: state[0],
        consumption: state[1],
    });

    for _ in 0..horizon_steps {
        stepper.step(field, &mut t, &mut state, step_size);
        if !state[0].is_finite() || !state[1].is_finite() {
            break;
        }
        points.push(PathPoint {
            capital: state[0],
            consumption: state[1],
        });
    }

    points
}

/// Searches for the saddle-path trajectory from `initial_capital` by
/// bisecting the initial consumption over `bracket = (low, high)`.
///
/// Each iteration simulates `horizon_steps` forward Euler steps at the
/// bracket midpoint, classifies the monotonicity of the finite prefix, and
/// either accepts the path (both variables monotone in the same sense) or
/// moves the bracket bound the classification implicates. A path giving no
/// usable signal leaves the bracket untouched for that iteration; the
/// iteration bound keeps the loop finite regardless.
pub fn find_optimal_path(
    params: &ModelParameters,
    initial_capital: f64,
    bracket: (f64, f64),
    horizon_steps: usize,
    settings: &ShootingSettings,
) -> Result<Trajectory, SolverError> {
    params.validate()?;

    let (mut low, mut high) = bracket;
    if !(low > 0.0) || !(high > 0.0) || !(low < high) {
        return Err(SolverError::InvalidBracket { low, high });
    }
    if !(initial_capital > 0.0) || !initial_capital.is_finite() {
        return Err(SolverError::InvalidParameters(format!(
            "initial capital must be positive and finite, got {initial_capital}"
        )));
    }
    if horizon_steps < 2 {
        return Err(SolverError::InvalidParameters(format!(
            "horizon must cover at least 2 steps, got {horizon_steps}"
        )));
    }
    if !(settings.step_size > 0.0) {
        return Err(SolverError::InvalidParameters(format!(
            "step size must be positive, got {}",
            settings.step_size
        )));
    }
    if settings.max_iterations == 0 {
        return Err(SolverError::InvalidParameters(
            "max iterations must be at least 1".to_string(),
        ));
    }

    let field = RamseyDynamics::new(*params);
    let mut stepper = ForwardEuler::new(2);

    for iteration in 0..settings.max_iterations {
        let trial = 0.5 * (low + high);
        let points = simulate(
            &field,
            &mut stepper,
            initial_capital,
            trial,
            horizon_steps,
            settings.step_size,
        );

        if points.len() < 2 {
            // Nothing survived the very first step; there is no prefix to classify.
            return Err(SolverError::NumericOverflow { step: 0 });
        }

        let capital = classify(&points, |p| p.capital);
        let consumption = classify(&points, |p| p.consumption);

        if (capital.non_decreasing && consumption.non_decreasing)
            || (capital.non_increasing && consumption.non_increasing)
        {
            return Ok(Trajectory {
                points,
                initial_consumption: trial,
                iterations: iteration + 1,
            });
        } else if capital.non_decreasing && !consumption.non_decreasing {
            low = trial;
        } else if capital.non_increasing && !consumption.non_increasing {
            high = trial;
        } else if capital.non_decreasing && consumption.non_increasing {
            low = trial;
        } else if capital.non_increasing && consumption.non_decreasing {
            high = trial;
        } else if consumption.non_decreasing && !capital.non_decreasing {
            high = trial;
        } else if consumption.non_increasing && !capital.non_increasing {
            low = trial;
        }
        // Neither variable produced a usable signal this round; keep the
        // bracket as-is and let the iteration bound have the last word.
    }

    Err(SolverError::ConvergenceFailure {
        max_iterations: settings.max_iterations,
    })
}
