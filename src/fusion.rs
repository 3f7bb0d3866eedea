//! Scalar Kalman measurement update for nowcast fusion.
//!
//! Only the measurement step is modelled: no process noise or time
//! propagation happens between consecutive updates.

use serde::Serialize;
use tracing::trace;

use crate::error::{NowcastError, Result};

/// Observation variance used when the caller has no better estimate.
pub const DEFAULT_OBS_VARIANCE: f64 = 1.0;

/// Belief about a pollutant concentration at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionState {
    pub mean: f64,
    pub variance: f64,
}

impl FusionState {
    pub fn new(mean: f64, variance: f64) -> Self {
        Self { mean, variance }
    }

    /// Folds a new observation into this state in place.
    pub fn update(&mut self, obs: f64, obs_var: f64) -> Result<()> {
        *self = fuse(*self, obs, obs_var)?;
        Ok(())
    }

    /// Gain applied to the innovation for an observation with variance `obs_var`.
    ///
    /// An uninformed prior (infinite variance) takes the observation whole.
    pub fn gain(&self, obs_var: f64) -> f64 {
        if self.variance.is_infinite() {
            return 1.0;
        }
        let total = self.variance + obs_var;
        if total == 0.0 {
            0.0
        } else {
            self.variance / total
        }
    }
}

/// Merges `prior` with an observation `obs` of variance `obs_var`.
///
/// `K = prior.variance / (prior.variance + obs_var)`, then
/// `mean = prior.mean + K * (obs - prior.mean)` and
/// `variance = (1 - K) * prior.variance`.
///
/// When both variances are zero the prior is already certain and is
/// returned unchanged. An infinite prior variance carries no information,
/// so the observation and its variance become the new state.
///
/// # Errors
///
/// Returns [`NowcastError::InvalidInput`] for a negative or NaN variance,
/// for both variances infinite, or for a non-finite mean or observation.
pub fn fuse(prior: FusionState, obs: f64, obs_var: f64) -> Result<FusionState> {
    check_variance("prior variance", prior.variance)?;
    check_variance("observation variance", obs_var)?;
    if !prior.mean.is_finite() {
        return Err(NowcastError::invalid(format!(
            "prior mean must be finite, got {}",
            prior.mean
        )));
    }
    if !obs.is_finite() {
        return Err(NowcastError::invalid(format!(
            "observation must be finite, got {obs}"
        )));
    }

    if prior.variance.is_infinite() {
        if obs_var.is_infinite() {
            return Err(NowcastError::invalid(
                "prior and observation variance cannot both be infinite",
            ));
        }
        trace!(obs, obs_var, "Uninformed prior replaced by observation");
        return Ok(FusionState::new(obs, obs_var));
    }

    let k = prior.gain(obs_var);
    let posterior = FusionState {
        mean: prior.mean + k * (obs - prior.mean),
        variance: (1.0 - k) * prior.variance,
    };
    trace!(gain = k, mean = posterior.mean, variance = posterior.variance, "Fused observation");

    Ok(posterior)
}

fn check_variance(name: &str, v: f64) -> Result<()> {
    if v.is_nan() || v < 0.0 {
        return Err(NowcastError::invalid(format!(
            "{name} must be non-negative, got {v}"
        )));
    }
    Ok(())
}
