//! Closed-loop PID controller driven by callbacks.
//!
//! A [`Controller`] owns its feedback source, output sink and optional time
//! source. Each call to [`Controller::tick`] runs one control cycle:
//!
//! 1. read and (optionally) clamp the feedback
//! 2. compute the error, shortest way around the circle when wrapping is on
//! 3. integrate and differentiate, per unit of time when a clock is present
//!    and per tick otherwise
//! 4. clamp the integral, combine the terms, round, clamp the output
//! 5. hand the output to the sink
//!
//! All gains, bounds and the target are changed between ticks through the
//! setters below. A cycle never allocates.

use std::fmt;

use dbw_core::{Real, round_to_i32};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::bounds::{Bounds, wrapped_error};
use crate::config::{ControllerConfig, DEFAULT_MAX_CUMULATION, Gains};
use crate::error::{ControlError, ControlResult};
use crate::io::{FeedbackSource, NoTimeSource, OutputSink, TimeSource};

/// PID controller state plus its callbacks.
///
/// `C` is the time source type. Controllers built with [`Controller::new`]
/// have none and treat every tick as one unit of time; attach a clock with
/// [`Controller::with_time_source`].
pub struct Controller<S, O, C = NoTimeSource> {
    gains: Gains,
    target: i32,

    current_feedback: i32,
    last_feedback: i32,
    error: Real,
    last_error: Real,

    integral_cumulation: Real,
    max_cumulation: u32,
    cycle_derivative: Real,
    output: i32,

    enabled: bool,

    input_bounds: Option<Bounds>,
    output_bounds: Option<Bounds>,
    feedback_wrap: Option<Bounds>,

    current_time: i64,
    last_time: i64,

    source: S,
    sink: O,
    clock: Option<C>,
}

/// Values computed by the most recent cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub target: i32,
    pub feedback: i32,
    pub error: Real,
    pub integral_cumulation: Real,
    pub cycle_derivative: Real,
    pub proportional_component: Real,
    pub integral_component: Real,
    pub derivative_component: Real,
    pub output: i32,
    pub enabled: bool,
    /// Timestamp of the cycle, when a time source is registered.
    pub time: Option<i64>,
}

impl<S, O> Controller<S, O>
where
    S: FeedbackSource,
    O: OutputSink,
{
    /// Create a controller with the given gains and callbacks.
    ///
    /// Gains should be non-negative. The controller starts enabled with a
    /// target of 0, no bounds, no wrapping and an integral limit of 30000.
    pub fn new(p: Real, i: Real, d: Real, source: S, sink: O) -> Self {
        Self {
            gains: Gains::new(p, i, d),
            target: 0,
            current_feedback: 0,
            last_feedback: 0,
            error: 0.0,
            last_error: 0.0,
            integral_cumulation: 0.0,
            max_cumulation: DEFAULT_MAX_CUMULATION,
            cycle_derivative: 0.0,
            output: 0,
            enabled: true,
            input_bounds: None,
            output_bounds: None,
            feedback_wrap: None,
            current_time: 0,
            last_time: 0,
            source,
            sink,
            clock: None,
        }
    }

    /// Build a controller from a configuration.
    ///
    /// # Errors
    ///
    /// Returns the first problem found by [`ControllerConfig::validate`].
    pub fn from_config(config: &ControllerConfig, source: S, sink: O) -> ControlResult<Self> {
        let mut controller = Self::new(0.0, 0.0, 0.0, source, sink);
        controller.apply_config(config)?;
        Ok(controller)
    }
}

impl<S, O, C> Controller<S, O, C>
where
    S: FeedbackSource,
    O: OutputSink,
    C: TimeSource,
{
    /// Attach a time source, keeping all tuning and history.
    ///
    /// The first timed cycle measures elapsed time from the last recorded
    /// timestamp, which is 0 for a controller that has never used a clock.
    pub fn with_time_source<T: TimeSource>(self, clock: T) -> Controller<S, O, T> {
        debug!("time source registered");
        Controller {
            gains: self.gains,
            target: self.target,
            current_feedback: self.current_feedback,
            last_feedback: self.last_feedback,
            error: self.error,
            last_error: self.last_error,
            integral_cumulation: self.integral_cumulation,
            max_cumulation: self.max_cumulation,
            cycle_derivative: self.cycle_derivative,
            output: self.output,
            enabled: self.enabled,
            input_bounds: self.input_bounds,
            output_bounds: self.output_bounds,
            feedback_wrap: self.feedback_wrap,
            current_time: self.current_time,
            last_time: self.last_time,
            source: self.source,
            sink: self.sink,
            clock: Some(clock),
        }
    }

    /// Replace the time source with another clock of the same type.
    ///
    /// A controller built with [`Controller::new`] has the uninhabited
    /// [`NoTimeSource`] as its clock type, so this cannot be called on it;
    /// attach the first clock with [`Controller::with_time_source`].
    pub fn register_time_source(&mut self, clock: C) {
        debug!("time source registered");
        self.clock = Some(clock);
    }

    /// Detach the time source and fall back to one unit of time per tick.
    pub fn clear_time_source(&mut self) -> Option<C> {
        debug!("time source cleared");
        self.clock.take()
    }

    pub fn has_time_source(&self) -> bool {
        self.clock.is_some()
    }

    /// Run one control cycle.
    ///
    /// Returns the output delivered to the sink, or `None` when disabled. A
    /// disabled controller touches neither its callbacks nor its state.
    pub fn tick(&mut self) -> Option<i32> {
        if !self.enabled {
            return None;
        }

        let mut feedback = self.source.read_feedback();
        if let Some(bounds) = self.input_bounds {
            feedback = bounds.clamp(feedback);
        }
        self.current_feedback = feedback;

        self.error = self.compute_error();

        match self.clock.as_mut() {
            Some(clock) => {
                self.current_time = clock.now();
                self.integrate_timed();
            }
            None => {
                self.integral_cumulation += self.error;
                self.cycle_derivative = self.error - self.last_error;
            }
        }

        let limit = Real::from(self.max_cumulation);
        self.integral_cumulation = self.integral_cumulation.clamp(-limit, limit);

        let raw = self.error * self.gains.p
            + self.integral_cumulation * self.gains.i
            + self.cycle_derivative * self.gains.d;
        self.output = round_to_i32(raw);

        self.last_feedback = self.current_feedback;
        self.last_error = self.error;

        if let Some(bounds) = self.output_bounds {
            self.output = bounds.clamp(self.output);
        }

        trace!(
            feedback = self.current_feedback,
            error = self.error,
            integral = self.integral_cumulation,
            derivative = self.cycle_derivative,
            output = self.output,
            "control cycle"
        );

        self.sink.write_output(self.output);
        Some(self.output)
    }

    fn compute_error(&self) -> Real {
        match self.feedback_wrap {
            Some(domain) => wrapped_error(self.target, self.current_feedback, domain).value as Real,
            None => Real::from(self.target) - Real::from(self.current_feedback),
        }
    }

    /// Integral and derivative over the time elapsed since the previous cycle.
    ///
    /// The integral step is `(last_error + error / 2) * dt`. A cycle with no
    /// elapsed time contributes nothing to the integral and has a zero
    /// derivative.
    fn integrate_timed(&mut self) {
        let delta = self.current_time.saturating_sub(self.last_time);
        if delta > 0 {
            let dt = delta as Real;
            self.integral_cumulation += (self.last_error + self.error / 2.0) * dt;
            self.cycle_derivative = (self.error - self.last_error) / dt;
        } else {
            if delta < 0 {
                warn!(
                    last_time = self.last_time,
                    current_time = self.current_time,
                    "time source went backwards"
                );
            }
            self.cycle_derivative = 0.0;
        }
        self.last_time = self.current_time;
    }

    /// Enable or disable the controller.
    ///
    /// Disabling an enabled controller zeroes the output and the integral.
    /// Re-enabling resumes from the history recorded before the pause.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled && self.enabled {
            self.output = 0;
            self.integral_cumulation = 0.0;
        }
        if enabled != self.enabled {
            debug!(enabled, "controller enable state changed");
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    pub fn set_target(&mut self, target: i32) {
        self.target = target;
    }

    pub fn gains(&self) -> Gains {
        self.gains
    }

    /// Replace the gains. Negative gains are accepted but make the loop diverge.
    pub fn set_gains(&mut self, gains: Gains) {
        if gains.p < 0.0 || gains.i < 0.0 || gains.d < 0.0 {
            warn!(p = gains.p, i = gains.i, d = gains.d, "negative gain configured");
        }
        self.gains = gains;
    }

    /// Set the anti-windup limit of the integral cumulation.
    ///
    /// Negative values are taken by magnitude. The limit is only applied if
    /// that magnitude is greater than 1.
    pub fn set_max_integral_cumulation(&mut self, max: i32) -> ControlResult<()> {
        let magnitude = max.unsigned_abs();
        if magnitude <= 1 {
            debug!(max, "rejected max integral cumulation");
            return Err(ControlError::InvalidMaxCumulation {
                value: i64::from(max),
            });
        }
        self.max_cumulation = magnitude;
        Ok(())
    }

    pub fn max_integral_cumulation(&self) -> u32 {
        self.max_cumulation
    }

    /// Clamp every feedback sample into `[lower, upper]`.
    ///
    /// Rejected, with no change, unless `upper > lower`.
    pub fn set_input_bounds(&mut self, lower: i32, upper: i32) -> ControlResult<()> {
        self.input_bounds = Some(checked_bounds("input", lower, upper)?);
        Ok(())
    }

    /// Clamp every output into `[lower, upper]`.
    ///
    /// Rejected, with no change, unless `upper > lower`.
    pub fn set_output_bounds(&mut self, lower: i32, upper: i32) -> ControlResult<()> {
        self.output_bounds = Some(checked_bounds("output", lower, upper)?);
        Ok(())
    }

    /// Treat feedback as circular over `[lower, upper]`, both ends being the
    /// same point.
    ///
    /// Input bounds are set to the same pair so no sample falls outside the
    /// circle. Rejected, with no change, unless `upper > lower`.
    pub fn set_feedback_wrap_bounds(&mut self, lower: i32, upper: i32) -> ControlResult<()> {
        self.set_input_bounds(lower, upper)?;
        self.feedback_wrap = Some(Bounds { lower, upper });
        Ok(())
    }

    pub fn clear_input_bounds(&mut self) {
        self.input_bounds = None;
    }

    pub fn clear_output_bounds(&mut self) {
        self.output_bounds = None;
    }

    /// Stop wrapping. Input bounds set by the wrap stay in place.
    pub fn clear_feedback_wrap(&mut self) {
        self.feedback_wrap = None;
    }

    pub fn input_bounds(&self) -> Option<Bounds> {
        self.input_bounds
    }

    pub fn output_bounds(&self) -> Option<Bounds> {
        self.output_bounds
    }

    pub fn feedback_wrap_bounds(&self) -> Option<Bounds> {
        self.feedback_wrap
    }

    /// Contribution of the proportional term to the last output.
    pub fn proportional_component(&self) -> Real {
        self.error * self.gains.p
    }

    /// Contribution of the integral term to the last output.
    pub fn integral_component(&self) -> Real {
        self.integral_cumulation * self.gains.i
    }

    /// Contribution of the derivative term to the last output.
    pub fn derivative_component(&self) -> Real {
        self.cycle_derivative * self.gains.d
    }

    pub fn output(&self) -> i32 {
        self.output
    }

    pub fn error(&self) -> Real {
        self.error
    }

    pub fn last_error(&self) -> Real {
        self.last_error
    }

    /// Feedback of the last cycle, after input clamping.
    pub fn feedback(&self) -> i32 {
        self.current_feedback
    }

    pub fn last_feedback(&self) -> i32 {
        self.last_feedback
    }

    pub fn integral_cumulation(&self) -> Real {
        self.integral_cumulation
    }

    pub fn cycle_derivative(&self) -> Real {
        self.cycle_derivative
    }

    /// Timestamp of the last timed cycle.
    pub fn last_time(&self) -> i64 {
        self.last_time
    }

    pub fn feedback_source(&self) -> &S {
        &self.source
    }

    pub fn feedback_source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn output_sink(&self) -> &O {
        &self.sink
    }

    pub fn output_sink_mut(&mut self) -> &mut O {
        &mut self.sink
    }

    /// Snapshot of the last cycle for diagnostics.
    pub fn snapshot(&self) -> CycleSnapshot {
        CycleSnapshot {
            target: self.target,
            feedback: self.current_feedback,
            error: self.error,
            integral_cumulation: self.integral_cumulation,
            cycle_derivative: self.cycle_derivative,
            proportional_component: self.proportional_component(),
            integral_component: self.integral_component(),
            derivative_component: self.derivative_component(),
            output: self.output,
            enabled: self.enabled,
            time: self.clock.as_ref().map(|_| self.current_time),
        }
    }

    /// Current tuning as a configuration.
    pub fn config(&self) -> ControllerConfig {
        ControllerConfig {
            gains: self.gains,
            target: self.target,
            max_integral_cumulation: self.max_cumulation,
            input_bounds: self.input_bounds,
            output_bounds: self.output_bounds,
            feedback_wrap: self.feedback_wrap,
            enabled: self.enabled,
        }
    }

    /// Apply a configuration. Cycle history is kept.
    ///
    /// The configuration is validated first; on error nothing changes.
    pub fn apply_config(&mut self, config: &ControllerConfig) -> ControlResult<()> {
        config.validate()?;

        self.gains = config.gains;
        self.target = config.target;
        self.max_cumulation = config.max_integral_cumulation;
        self.input_bounds = config.input_bounds;
        self.output_bounds = config.output_bounds;
        self.feedback_wrap = None;
        if let Some(wrap) = config.feedback_wrap {
            self.set_feedback_wrap_bounds(wrap.lower, wrap.upper)?;
        }
        self.set_enabled(config.enabled);

        debug!(
            p = self.gains.p,
            i = self.gains.i,
            d = self.gains.d,
            target = self.target,
            "controller configured"
        );
        Ok(())
    }
}

fn checked_bounds(what: &'static str, lower: i32, upper: i32) -> ControlResult<Bounds> {
    let bounds = Bounds { lower, upper };
    if !bounds.is_valid() {
        debug!(what, lower, upper, "rejected bounds");
        return Err(ControlError::InvalidBounds { what, lower, upper });
    }
    Ok(bounds)
}

impl<S, O, C> fmt::Debug for Controller<S, O, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("gains", &self.gains)
            .field("target", &self.target)
            .field("current_feedback", &self.current_feedback)
            .field("error", &self.error)
            .field("integral_cumulation", &self.integral_cumulation)
            .field("max_cumulation", &self.max_cumulation)
            .field("cycle_derivative", &self.cycle_derivative)
            .field("output", &self.output)
            .field("enabled", &self.enabled)
            .field("input_bounds", &self.input_bounds)
            .field("output_bounds", &self.output_bounds)
            .field("feedback_wrap", &self.feedback_wrap)
            .field("has_time_source", &self.clock.is_some())
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn cycling(
        samples: Vec<i32>,
    ) -> Controller<impl FnMut() -> i32, impl FnMut(i32)> {
        let mut idx = 0usize;
        let source = move || {
            let v = samples[idx % samples.len()];
            idx += 1;
            v
        };
        Controller::new(0.8, 0.3, 0.2, source, |_out: i32| {})
    }

    proptest! {
        #[test]
        fn integral_never_exceeds_limit(
            samples in prop::collection::vec(-100_000i32..100_000, 1..40),
            target in -100_000i32..100_000,
            max in 2i32..50_000,
        ) {
            let mut c = cycling(samples.clone());
            c.set_target(target);
            c.set_max_integral_cumulation(max).unwrap();
            for _ in 0..samples.len() * 2 {
                c.tick();
                prop_assert!(c.integral_cumulation().abs() <= max as Real);
            }
        }

        #[test]
        fn bounded_feedback_and_output_stay_in_range(
            samples in prop::collection::vec(any::<i32>(), 1..40),
            target in any::<i32>(),
            lo in -1000i32..1000,
            span in 1i32..1000,
        ) {
            let mut c = cycling(samples.clone());
            c.set_target(target);
            c.set_input_bounds(lo, lo + span).unwrap();
            c.set_output_bounds(lo, lo + span).unwrap();
            for _ in 0..samples.len() {
                let out = c.tick().unwrap();
                prop_assert!(out >= lo && out <= lo + span);
                prop_assert!(c.feedback() >= lo && c.feedback() <= lo + span);
            }
        }

        #[test]
        fn rejected_bounds_change_nothing(lower in any::<i32>(), upper in any::<i32>()) {
            prop_assume!(upper <= lower);
            let mut c = cycling(vec![0]);
            prop_assert!(c.set_input_bounds(lower, upper).is_err());
            prop_assert!(c.set_output_bounds(lower, upper).is_err());
            prop_assert!(c.input_bounds().is_none());
            prop_assert!(c.output_bounds().is_none());
        }
    }
}
