//! Serializable controller tuning.
//!
//! [`ControllerConfig`] captures everything about a controller except its
//! callbacks and cycle history: gains, target, integral limit, bound and wrap
//! policy, and the enable flag. It is what loop configuration files store and
//! what [`Controller::config`](crate::Controller::config) reports back.

use dbw_core::{Real, ensure_non_negative};
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::error::{ControlError, ControlResult};

/// Integral limit applied to a freshly built controller.
pub const DEFAULT_MAX_CUMULATION: u32 = 30_000;

/// Proportional, integral and derivative gains.
///
/// Gains should be non-negative; a negative gain drives the process away from
/// the target.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gains {
    /// Proportional gain.
    pub p: Real,
    /// Integral gain.
    pub i: Real,
    /// Derivative gain.
    pub d: Real,
}

impl Gains {
    pub fn new(p: Real, i: Real, d: Real) -> Self {
        Self { p, i, d }
    }

    /// Check that every gain is finite and non-negative.
    pub fn validate(&self) -> ControlResult<()> {
        for (what, value) in [
            ("proportional", self.p),
            ("integral", self.i),
            ("derivative", self.d),
        ] {
            ensure_non_negative(value, what)
                .map_err(|_| ControlError::InvalidGain { what, value })?;
        }
        Ok(())
    }
}

fn default_max_cumulation() -> u32 {
    DEFAULT_MAX_CUMULATION
}

fn default_enabled() -> bool {
    true
}

/// Controller tuning and policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub gains: Gains,
    #[serde(default)]
    pub target: i32,
    /// Anti-windup limit for the integral cumulation. Must be greater than 1.
    #[serde(default = "default_max_cumulation")]
    pub max_integral_cumulation: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_bounds: Option<Bounds>,
    /// Circular feedback domain. Implies identical input bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_wrap: Option<Bounds>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            gains: Gains::default(),
            target: 0,
            max_integral_cumulation: DEFAULT_MAX_CUMULATION,
            input_bounds: None,
            output_bounds: None,
            feedback_wrap: None,
            enabled: true,
        }
    }
}

impl ControllerConfig {
    /// Config with the given gains and every other field at its default.
    pub fn with_gains(p: Real, i: Real, d: Real) -> Self {
        Self {
            gains: Gains::new(p, i, d),
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// - negative or non-finite gains
    /// - `max_integral_cumulation <= 1`
    /// - any bound pair with `upper <= lower`
    /// - input bounds that differ from the wrap domain when both are set
    pub fn validate(&self) -> ControlResult<()> {
        self.gains.validate()?;

        if self.max_integral_cumulation <= 1 {
            return Err(ControlError::InvalidMaxCumulation {
                value: i64::from(self.max_integral_cumulation),
            });
        }

        for (what, bounds) in [
            ("input", self.input_bounds),
            ("output", self.output_bounds),
            ("feedback wrap", self.feedback_wrap),
        ] {
            if let Some(b) = bounds {
                if !b.is_valid() {
                    return Err(ControlError::InvalidBounds {
                        what,
                        lower: b.lower,
                        upper: b.upper,
                    });
                }
            }
        }

        if let (Some(input), Some(wrap)) = (self.input_bounds, self.feedback_wrap) {
            if input != wrap {
                return Err(ControlError::InvalidArg {
                    what: "input bounds must match the feedback wrap domain",
                });
            }
        }

        Ok(())
    }
}
