//! PID control loop for drive-by-wire actuators.
//!
//! The crate centers on [`Controller`], an owned PID loop that pulls feedback
//! from a callback, computes a correction and pushes it to another callback
//! once per [`tick`](Controller::tick).
//!
//! # Architecture
//!
//! - [`controller`]: controller state, the per-cycle update and its setters
//! - [`bounds`]: input/output range limits and circular (wrapped) error
//! - [`io`]: feedback source, output sink and time source capabilities
//! - [`config`]: serializable tuning used by loop configuration files
//!
//! # Numeric model
//!
//! Target, feedback and output are integers in sensor/actuator units. Error,
//! integral and derivative are carried as [`Real`](dbw_core::Real) and the sum
//! is rounded once, at the output.
//!
//! # Example
//!
//! ```
//! use dbw_controls::Controller;
//!
//! let position: i32 = 20;
//! let mut commands = Vec::new();
//! let mut pid = Controller::new(1.0, 0.0, 0.0, || position, |out: i32| commands.push(out));
//! pid.set_target(100);
//! pid.set_output_bounds(-50, 50).unwrap();
//! pid.tick();
//! drop(pid);
//! assert_eq!(commands, vec![50]);
//! ```

pub mod bounds;
pub mod config;
pub mod controller;
pub mod error;
pub mod io;

pub use bounds::{Bounds, WrapPath, WrappedError, wrapped_error};
pub use config::{ControllerConfig, DEFAULT_MAX_CUMULATION, Gains};
pub use controller::{Controller, CycleSnapshot};
pub use error::{ControlError, ControlResult};
pub use io::{FeedbackSource, NoTimeSource, NullSink, OutputSink, TimeSource};
