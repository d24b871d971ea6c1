use crate::CoreError;

/// Floating point type used for error, integral and derivative terms.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Finite and `>= 0`. Used for controller gains.
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(CoreError::InvalidArg { what });
    }
    Ok(v)
}

/// Round half away from zero and saturate into the `i32` range.
///
/// NaN maps to 0, matching the behavior of an `as` cast.
pub fn round_to_i32(v: Real) -> i32 {
    let rounded = v.round();
    if rounded >= i32::MAX as Real {
        i32::MAX
    } else if rounded <= i32::MIN as Real {
        i32::MIN
    } else {
        rounded as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_non_negative_rejects_negative() {
        assert_eq!(ensure_non_negative(0.0, "gain"), Ok(0.0));
        assert_eq!(
            ensure_non_negative(-0.5, "gain"),
            Err(CoreError::InvalidArg { what: "gain" })
        );
        assert!(ensure_non_negative(Real::INFINITY, "gain").is_err());
    }

    #[test]
    fn round_to_i32_rounds_half_away_from_zero() {
        assert_eq!(round_to_i32(2.5), 3);
        assert_eq!(round_to_i32(-2.5), -3);
        assert_eq!(round_to_i32(2.49), 2);
        assert_eq!(round_to_i32(-0.4), 0);
    }

    #[test]
    fn round_to_i32_saturates() {
        assert_eq!(round_to_i32(1e12), i32::MAX);
        assert_eq!(round_to_i32(-1e12), i32::MIN);
        assert_eq!(round_to_i32(Real::NAN), 0);
    }
}
