//! Form input coercion and validation.

use crate::types::{VariantInput, WorkoutKind};
use crate::ValidationError;

/// Raw form values as typed by the user
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormInput {
    pub kind: String,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

/// A submission that passed validation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidInput {
    pub distance_km: f64,
    pub duration_min: f64,
    pub variant: VariantInput,
}

/// Coerce a raw field to a number
///
/// Whitespace is trimmed and an empty field reads as 0. Unsigned `0x`, `0o`
/// and `0b` literals are read in their radix; anything else that is not a
/// decimal number reads as NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(value) = radix_literal(trimmed) {
        return value;
    }
    // `f64::from_str` also accepts "inf"/"nan" spellings; only plain
    // numerals count as numbers here.
    if trimmed
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
    {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

fn radix_literal(s: &str) -> Option<f64> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &s[2..];
    // from_str_radix takes a leading sign; a literal must not have one
    if digits.starts_with(['+', '-']) {
        return Some(f64::NAN);
    }
    Some(
        u128::from_str_radix(digits, radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN),
    )
}

fn require_finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NotPositive { field })
    }
}

/// Validate a submitted form
///
/// Running: distance, duration and cadence must all be finite and strictly
/// positive. Cycling: all three must be finite but only distance and duration
/// must be positive; elevation gain may be zero or negative.
pub fn validate(input: &FormInput) -> Result<ValidInput, ValidationError> {
    let kind: WorkoutKind = input.kind.parse()?;
    let distance = coerce_number(&input.distance);
    let duration = coerce_number(&input.duration);

    let variant = match kind {
        WorkoutKind::Running => {
            let cadence = coerce_number(&input.cadence);
            require_finite("distance", distance)?;
            require_finite("duration", duration)?;
            require_finite("cadence", cadence)?;
            require_positive("distance", distance)?;
            require_positive("duration", duration)?;
            require_positive("cadence", cadence)?;
            VariantInput::Running { cadence }
        }
        WorkoutKind::Cycling => {
            let elevation = coerce_number(&input.elevation);
            require_finite("distance", distance)?;
            require_finite("duration", duration)?;
            require_finite("elevation", elevation)?;
            require_positive("distance", distance)?;
            require_positive("duration", duration)?;
            VariantInput::Cycling {
                elevation_gain_m: elevation,
            }
        }
    };

    Ok(ValidInput {
        distance_km: distance,
        duration_min: duration,
        variant,
    })
}
