//! Range limits and circular-domain error.
//!
//! Input and output limits share one value type, [`Bounds`]. A bound pair is
//! only valid when `upper > lower`. The same type describes a wrap domain,
//! where `lower` and `upper` name the same physical point (a compass heading
//! with bounds `[0, 360]`, for instance).

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Inclusive integer range `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower limit (inclusive).
    pub lower: i32,
    /// Upper limit (inclusive).
    pub upper: i32,
}

impl Bounds {
    /// Create a bound pair.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidBounds`] unless `upper > lower`.
    pub fn new(lower: i32, upper: i32) -> ControlResult<Self> {
        let bounds = Self { lower, upper };
        if !bounds.is_valid() {
            return Err(ControlError::InvalidBounds {
                what: "range",
                lower,
                upper,
            });
        }
        Ok(bounds)
    }

    /// `upper > lower`.
    pub fn is_valid(&self) -> bool {
        self.upper > self.lower
    }

    /// Trim `value` into the range.
    pub fn clamp(&self, value: i32) -> i32 {
        if value > self.upper {
            self.upper
        } else if value < self.lower {
            self.lower
        } else {
            value
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Distance from `lower` to `upper`. Widened so extreme pairs cannot overflow.
    pub fn width(&self) -> i64 {
        i64::from(self.upper) - i64::from(self.lower)
    }
}

/// Which way around the circle the chosen error travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapPath {
    /// Target to feedback without crossing the seam.
    Direct,
    /// Target, down to the lower bound, across to the upper bound, then feedback.
    LowerBridge,
    /// Target, up to the upper bound, across to the lower bound, then feedback.
    UpperBridge,
}

/// Signed error selected on a circular domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedError {
    /// Signed error along the chosen path.
    pub value: i64,
    /// Path the error was measured along.
    pub path: WrapPath,
}

/// Shortest signed error from `feedback` to `target` on the circle `domain`.
///
/// Three candidates are considered: the direct error, the direct error plus
/// one domain width (bridging through the lower bound) and the direct error
/// minus one width (bridging through the upper bound). The candidate with the
/// smallest magnitude wins and keeps its sign. Ties prefer `Direct`, then
/// `LowerBridge`, then `UpperBridge`.
///
/// ```
/// use dbw_controls::{wrapped_error, Bounds, WrapPath};
///
/// let heading = Bounds::new(0, 360).unwrap();
/// let err = wrapped_error(350, 10, heading);
/// assert_eq!(err.value, -20);
/// assert_eq!(err.path, WrapPath::UpperBridge);
/// ```
pub fn wrapped_error(target: i32, feedback: i32, domain: Bounds) -> WrappedError {
    let direct = i64::from(target) - i64::from(feedback);
    let width = domain.width();

    let candidates = [
        (direct, WrapPath::Direct),
        (direct + width, WrapPath::LowerBridge),
        (direct - width, WrapPath::UpperBridge),
    ];

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        // Strict comparison keeps the earlier candidate on ties.
        if candidate.0.unsigned_abs() < best.0.unsigned_abs() {
            best = *candidate;
        }
    }

    WrappedError {
        value: best.0,
        path: best.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading() -> Bounds {
        Bounds::new(0, 360).unwrap()
    }

    #[test]
    fn bounds_reject_inverted_and_empty() {
        assert!(Bounds::new(10, 10).is_err());
        assert!(Bounds::new(10, -10).is_err());
        assert!(Bounds::new(-10, 10).is_ok());
    }

    #[test]
    fn bounds_clamp() {
        let b = Bounds::new(-100, 100).unwrap();
        assert_eq!(b.clamp(150), 100);
        assert_eq!(b.clamp(-150), -100);
        assert_eq!(b.clamp(42), 42);
        assert!(b.contains(100));
        assert!(!b.contains(101));
    }

    #[test]
    fn width_does_not_overflow() {
        let b = Bounds::new(i32::MIN, i32::MAX).unwrap();
        assert_eq!(b.width(), u32::MAX as i64);
    }

    #[test]
    fn wrapped_error_prefers_short_way_across_seam() {
        // Feedback 10 must decrease through the seam to reach 350.
        let err = wrapped_error(350, 10, heading());
        assert_eq!(err.value, -20);
        assert_eq!(err.path, WrapPath::UpperBridge);

        let err = wrapped_error(10, 350, heading());
        assert_eq!(err.value, 20);
        assert_eq!(err.path, WrapPath::LowerBridge);
    }

    #[test]
    fn wrapped_error_direct_when_shorter() {
        let err = wrapped_error(100, 40, heading());
        assert_eq!(err.value, 60);
        assert_eq!(err.path, WrapPath::Direct);

        let err = wrapped_error(40, 100, heading());
        assert_eq!(err.value, -60);
        assert_eq!(err.path, WrapPath::Direct);
    }

    #[test]
    fn wrapped_error_tie_prefers_direct() {
        let err = wrapped_error(0, 180, heading());
        assert_eq!(err.value, -180);
        assert_eq!(err.path, WrapPath::Direct);

        let err = wrapped_error(180, 0, heading());
        assert_eq!(err.value, 180);
        assert_eq!(err.path, WrapPath::Direct);
    }

    #[test]
    fn wrapped_error_at_seam_is_direct_zero_or_bridge() {
        // Lower and upper are the same point on the circle.
        let err = wrapped_error(0, 360, heading());
        assert_eq!(err.value, 0);
        assert_eq!(err.path, WrapPath::LowerBridge);

        let err = wrapped_error(360, 360, heading());
        assert_eq!(err.value, 0);
        assert_eq!(err.path, WrapPath::Direct);
    }

    #[test]
    fn wrapped_error_offset_domain() {
        let domain = Bounds::new(-180, 180).unwrap();
        let err = wrapped_error(170, -170, domain);
        assert_eq!(err.value, -20);
        assert_eq!(err.path, WrapPath::UpperBridge);
    }
}
