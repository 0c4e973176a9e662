//! Economic primitives of the Ramsey-Cass-Koopmans model.
//!
//! Everything here is closed-form arithmetic derived from a validated
//! parameter record: Cobb-Douglas production, CRRA utility, their
//! derivatives and inverse derivatives, the interior steady state, and the
//! capital/consumption vector field consumed by the shooting engine.

use crate::error::SolverError;
use crate::traits::VectorField;
use serde::{Deserialize, Serialize};

/// Deep parameters of the growth model. Immutable for the lifetime of a solve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Capital share of output, alpha in (0, 1).
    pub capital_share: f64,
    /// Coefficient of relative risk aversion, theta > 0. theta = 1 selects log utility.
    pub risk_aversion: f64,
    /// Capital depreciation rate, delta > 0.
    pub depreciation: f64,
    /// Subjective discount rate, rho > 0.
    pub discount: f64,
}

impl ModelParameters {
    /// Builds a parameter record, rejecting values outside the admissible ranges.
    pub fn new(
        capital_share: f64,
        risk_aversion: f64,
        depreciation: f64,
        discount: f64,
    ) -> Result<Self, SolverError> {
        let params = Self {
            capital_share,
            risk_aversion,
            depreciation,
            discount,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks the positivity/range constraints. Engines call this before any
    /// computation so a malformed record never reaches a numeric kernel.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.capital_share > 0.0 && self.capital_share < 1.0) {
            return Err(SolverError::InvalidParameters(format!(
                "capital share must lie in (0, 1), got {}",
                self.capital_share
            )));
        }
        if !(self.risk_aversion > 0.0) {
            return Err(SolverError::InvalidParameters(format!(
                "risk aversion must be positive, got {}",
                self.risk_aversion
            )));
        }
        if !(self.depreciation > 0.0) {
            return Err(SolverError::InvalidParameters(format!(
                "depreciation rate must be positive, got {}",
                self.depreciation
            )));
        }
        if !(self.discount > 0.0) {
            return Err(SolverError::InvalidParameters(format!(
                "discount rate must be positive, got {}",
                self.discount
            )));
        }
        Ok(())
    }

    /// Production f(k) = k^alpha.
    pub fn production(&self, capital: f64) -> f64 {
        capital.powf(self.capital_share)
    }

    /// Marginal product of capital f'(k) = alpha * k^(alpha - 1).
    pub fn production_derivative(&self, capital: f64) -> f64 {
        self.capital_share * capital.powf(self.capital_share - 1.0)
    }

    /// Closed-form inverse of f': the capital stock at which f'(k) equals `rate`.
    pub fn inverse_production_derivative(&self, rate: f64) -> f64 {
        (rate / self.capital_share).powf(1.0 / (self.capital_share - 1.0))
    }

    /// CRRA utility u(c) = c^(1 - theta) / (1 - theta), or ln c when theta = 1.
    pub fn utility(&self, consumption: f64) -> f64 {
        if self.risk_aversion == 1.0 {
            consumption.ln()
        } else {
            consumption.powf(1.0 - self.risk_aversion) / (1.0 - self.risk_aversion)
        }
    }

    /// Marginal utility u'(c) = c^(-theta).
    pub fn utility_derivative(&self, consumption: f64) -> f64 {
        consumption.powf(-self.risk_aversion)
    }

    /// Inverse marginal utility: the consumption level at which u'(c) equals `marginal`.
    pub fn inverse_utility_derivative(&self, marginal: f64) -> f64 {
        marginal.powf(-1.0 / self.risk_aversion)
    }

    /// Output net of depreciation, f(k) - delta * k. Zero drift in capital
    /// occurs exactly where consumption equals this locus.
    pub fn net_output(&self, capital: f64) -> f64 {
        self.production(capital) - self.depreciation * capital
    }

    /// The unique interior steady state: f'(k*) = delta + rho and
    /// c* = f(k*) - delta * k* (the modified golden rule capital stock).
    pub fn steady_state(&self) -> SteadyState {
        let capital = self.inverse_production_derivative(self.depreciation + self.discount);
        SteadyState {
            capital,
            consumption: self.net_output(capital),
        }
    }
}

/// The stationary point of both the state and the control.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SteadyState {
    pub capital: f64,
    pub consumption: f64,
}

/// The model's first-order dynamics as a two-dimensional vector field.
///
/// State layout is `[capital, consumption]` with
///   dk/dt = f(k) - delta * k - c
///   dc/dt = c * (f'(k) - delta - rho) / theta
#[derive(Debug, Clone, Copy)]
pub struct RamseyDynamics {
    params: ModelParameters,
}

impl RamseyDynamics {
    pub fn new(params: ModelParameters) -> Self {
        Self { params }
    }
}

impl VectorField<f64> for RamseyDynamics {
    fn dimension(&self) -> usize {
        2
    }

    fn eval(&self, _t: f64, state: &[f64], out: &mut [f64]) {
        let capital = state[0];
        let consumption = state[1];
        let p = &self.params;

        out[0] = p.net_output(capital) - consumption;
        out[1] = consumption * (p.production_derivative(capital) - p.depreciation - p.discount)
            / p.risk_aversion;
    }
}
