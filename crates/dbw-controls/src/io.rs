//! Callback capabilities invoked by the controller each cycle.
//!
//! The controller never talks to hardware directly. A [`FeedbackSource`]
//! supplies the measured process value, an [`OutputSink`] receives the
//! correction and an optional [`TimeSource`] stamps each cycle. Closures with
//! the matching signature implement these traits, so
//! `|| adc.read()` is a feedback source and `|out| motor.drive(out)` a sink.
//!
//! All three are called synchronously from inside `tick` and should return
//! quickly.

/// Supplies the current feedback value of the controlled process.
pub trait FeedbackSource {
    /// Read the current feedback sample.
    fn read_feedback(&mut self) -> i32;
}

impl<F> FeedbackSource for F
where
    F: FnMut() -> i32,
{
    fn read_feedback(&mut self) -> i32 {
        self()
    }
}

/// Consumes the correction computed for a cycle.
pub trait OutputSink {
    /// Deliver the output to the actuation path.
    fn write_output(&mut self, output: i32);
}

impl<F> OutputSink for F
where
    F: FnMut(i32),
{
    fn write_output(&mut self, output: i32) {
        self(output)
    }
}

/// Monotonic, non-decreasing timestamp source.
///
/// Units are up to the host; the derivative is expressed per unit and the
/// integral accumulates error times units.
pub trait TimeSource {
    /// Current timestamp.
    fn now(&mut self) -> i64;
}

impl<F> TimeSource for F
where
    F: FnMut() -> i64,
{
    fn now(&mut self) -> i64 {
        self()
    }
}

/// Sink that discards every output.
///
/// For hosts that read the value returned by `tick` instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn write_output(&mut self, _output: i32) {}
}

/// Marker for a controller without a time source.
///
/// Uninhabited: a controller of this clock type can never hold one and always
/// runs in one-tick-per-unit mode.
#[derive(Debug, Clone, Copy)]
pub enum NoTimeSource {}

impl TimeSource for NoTimeSource {
    fn now(&mut self) -> i64 {
        match *self {}
    }
}
