//! BMI computation and classification.
//!
//! Everything in this module is pure: raw form text goes in, a validated
//! [`Measurement`], a BMI value, or a [`Category`] comes out. Nothing here
//! touches storage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound (exclusive) of the underweight band.
pub const UNDERWEIGHT_LIMIT: f64 = 18.5;

/// Upper bound (exclusive) of the normal weight band.
pub const NORMAL_LIMIT: f64 = 24.9;

/// Upper bound (exclusive) of the overweight band. Anything at or above is obese.
pub const OVERWEIGHT_LIMIT: f64 = 29.9;

/// Centimeters per meter, used to normalize the height input.
const CM_PER_M: f64 = 100.0;

/// A numeric form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Height, entered in centimeters.
    Height,
    /// Weight, entered in kilograms.
    Weight,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Height => write!(f, "height (cm)"),
            Self::Weight => write!(f, "weight (kg)"),
        }
    }
}

/// Reasons a calculation request is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// The name field is empty or whitespace.
    #[error("name must not be empty")]
    EmptyName,

    /// A numeric field did not parse as a real number.
    #[error("{field} must be a number, got '{value}'")]
    NotANumber {
        /// The offending field.
        field: Field,
        /// The raw text that was entered.
        value: String,
    },

    /// A numeric field parsed to infinity or NaN.
    #[error("{field} must be a finite number, got '{value}'")]
    NotFinite {
        /// The offending field.
        field: Field,
        /// The raw text that was entered.
        value: String,
    },

    /// A numeric field was zero or negative.
    #[error("{field} must be greater than 0, got {value}")]
    NotPositive {
        /// The offending field.
        field: Field,
        /// The parsed value, in the unit the field was entered in.
        value: f64,
    },
}

impl InputError {
    /// The field that failed validation, or `None` for the name.
    #[must_use]
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::EmptyName => None,
            Self::NotANumber { field, .. }
            | Self::NotFinite { field, .. }
            | Self::NotPositive { field, .. } => Some(*field),
        }
    }
}

/// A validated calculation request with height normalized to meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Person the measurement belongs to.
    pub name: String,
    /// Height in meters.
    pub height_m: f64,
    /// Weight in kilograms.
    pub weight_kg: f64,
}

impl Measurement {
    /// Compute the BMI for this measurement.
    #[must_use]
    pub fn bmi(&self) -> f64 {
        compute_bmi(self.height_m, self.weight_kg)
    }
}

/// BMI classification band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// BMI below 18.5.
    #[serde(rename = "Underweight")]
    Underweight,
    /// BMI in `[18.5, 24.9)`.
    #[serde(rename = "Normal weight")]
    NormalWeight,
    /// BMI in `[24.9, 29.9)`.
    #[serde(rename = "Overweight")]
    Overweight,
    /// BMI of 29.9 or more.
    #[serde(rename = "Obese")]
    Obese,
}

impl Category {
    /// All categories, lowest band first.
    pub const ALL: [Self; 4] = [
        Self::Underweight,
        Self::NormalWeight,
        Self::Overweight,
        Self::Obese,
    ];

    /// The human-readable label, which is also the persisted form.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::NormalWeight => "Normal weight",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }

    /// Parse a persisted label back into a category.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Validate raw form input and normalize it into a [`Measurement`].
///
/// The name is trimmed and must not be empty. Height (centimeters) and
/// weight (kilograms) must parse as finite numbers greater than zero;
/// surrounding whitespace is ignored. Height is converted to meters.
///
/// # Errors
///
/// Returns an [`InputError`] describing the first field that failed.
pub fn validate_and_normalize(
    name: &str,
    raw_height_cm: &str,
    raw_weight_kg: &str,
) -> Result<Measurement, InputError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InputError::EmptyName);
    }

    let height_cm = parse_positive(Field::Height, raw_height_cm)?;
    let weight_kg = parse_positive(Field::Weight, raw_weight_kg)?;

    Ok(Measurement {
        name: name.to_string(),
        height_m: height_cm / CM_PER_M,
        weight_kg,
    })
}

fn parse_positive(field: Field, raw: &str) -> Result<f64, InputError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed.parse().map_err(|_| InputError::NotANumber {
        field,
        value: raw.to_string(),
    })?;

    if !value.is_finite() {
        return Err(InputError::NotFinite {
            field,
            value: raw.to_string(),
        });
    }
    if value <= 0.0 {
        return Err(InputError::NotPositive { field, value });
    }
    Ok(value)
}

/// Compute BMI as `weight_kg / height_m²`.
///
/// No rounding is applied. The caller guarantees `height_m > 0`.
#[must_use]
pub fn compute_bmi(height_m: f64, weight_kg: f64) -> f64 {
    weight_kg / (height_m * height_m)
}

/// Classify a BMI value.
///
/// Bands are left-closed and right-open with boundaries at 18.5, 24.9 and
/// 29.9. Total over `f64`: NaN lands in [`Category::Obese`].
///
/// Overweight starts at 24.9, so `[24.9, 25)` is Overweight. A classifier
/// that opens the Overweight band at 25 instead drops this interval through
/// to Obese.
#[must_use]
pub fn categorize(bmi: f64) -> Category {
    if bmi < UNDERWEIGHT_LIMIT {
        Category::Underweight
    } else if bmi < NORMAL_LIMIT {
        Category::NormalWeight
    } else if bmi < OVERWEIGHT_LIMIT {
        Category::Overweight
    } else {
        Category::Obese
    }
}

/// Round a BMI value for display.
#[must_use]
pub fn format_bmi(bmi: f64, precision: usize) -> String {
    format!("{bmi:.precision$}")
}
