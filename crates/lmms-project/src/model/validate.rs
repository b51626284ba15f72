//! Range checks shared by the model constructors and setters.

use std::fmt::Display;
use std::ops::RangeInclusive;

use crate::error::ModelError;

/// Accept `value` if it lies within `range`; NaN is always rejected.
pub(crate) fn within<T>(
    field: &'static str,
    value: T,
    range: RangeInclusive<T>,
    expected: &'static str,
) -> Result<T, ModelError>
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ModelError::OutOfRange {
            field,
            value: value.to_string(),
            expected,
        })
    }
}

/// Accept finite `value >= min`.
pub(crate) fn at_least(
    field: &'static str,
    value: f64,
    min: f64,
    expected: &'static str,
) -> Result<f64, ModelError> {
    if value.is_finite() && value >= min {
        Ok(value)
    } else {
        Err(ModelError::OutOfRange {
            field,
            value: value.to_string(),
            expected,
        })
    }
}

/// Accept finite `value > 0`.
pub(crate) fn positive(field: &'static str, value: f64) -> Result<f64, ModelError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ModelError::OutOfRange {
            field,
            value: value.to_string(),
            expected: "> 0",
        })
    }
}

/// Convert a decoded integer into a narrower field type.
pub(crate) fn narrow<T>(field: &'static str, value: i64, expected: &'static str) -> Result<T, ModelError>
where
    T: TryFrom<i64>,
{
    T::try_from(value).map_err(|_| ModelError::OutOfRange {
        field,
        value: value.to_string(),
        expected,
    })
}

/// Pan in -1.0..=1.0.
pub(crate) fn pan(field: &'static str, value: f64) -> Result<f64, ModelError> {
    within(field, value, -1.0..=1.0, "-1.0..=1.0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_rejects_overflow() {
        assert_eq!(narrow::<u8>("pitch", 127, "0..=127"), Ok(127));
        assert!(narrow::<u8>("pitch", 300, "0..=127").is_err());
        assert!(narrow::<u32>("position", -1, ">= 0").is_err());
    }

    #[test]
    fn within_accepts_bounds() {
        assert_eq!(within("bpm", 20u16, 20..=999, "20..=999"), Ok(20));
        assert_eq!(within("bpm", 999u16, 20..=999, "20..=999"), Ok(999));
        assert!(within("bpm", 1000u16, 20..=999, "20..=999").is_err());
    }

    #[test]
    fn nan_is_rejected() {
        assert!(pan("pan", f64::NAN).is_err());
        assert!(positive("length", f64::NAN).is_err());
        assert!(at_least("volume", f64::NAN, 0.0, ">= 0").is_err());
    }

    #[test]
    fn positive_excludes_zero() {
        assert!(positive("length", 0.0).is_err());
        assert_eq!(positive("length", 0.25), Ok(0.25));
    }
}
