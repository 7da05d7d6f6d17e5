//! Fixed unit conversion formulas.
//!
//! # Responsibility
//! - Map a `(ConversionType, value)` pair to a rounded result.
//! - Own the closed set of supported conversions and their unit labels.
//!
//! # Invariants
//! - Every result is rounded to 2 decimal places, half away from zero.
//! - Non-finite inputs are rejected; formulas never produce NaN.
//! - Formulas are pure: no I/O, no clock, no global state.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Exact pounds-to-kilograms factor (international avoirdupois pound).
pub const KG_PER_LB: f64 = 0.453_592_37;
/// Exact inches-to-centimeters factor.
pub const CM_PER_INCH: f64 = 2.54;

/// Formula-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Type string is not one of the supported conversions.
    #[error("invalid conversion type `{0}`; expected lbs_to_kg|kg_to_lbs|in_to_cm|cm_to_in")]
    InvalidConversionType(String),
    /// Value is not a finite number.
    #[error("input must be a number, got `{0}`")]
    InvalidInput(String),
}

/// Supported conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionType {
    LbsToKg,
    KgToLbs,
    InToCm,
    CmToIn,
}

impl ConversionType {
    /// All conversions in menu order.
    pub const ALL: [ConversionType; 4] = [
        ConversionType::LbsToKg,
        ConversionType::KgToLbs,
        ConversionType::InToCm,
        ConversionType::CmToIn,
    ];

    /// Stable wire/storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LbsToKg => "lbs_to_kg",
            Self::KgToLbs => "kg_to_lbs",
            Self::InToCm => "in_to_cm",
            Self::CmToIn => "cm_to_in",
        }
    }

    /// Human-readable label for menus and help output.
    pub fn label(self) -> &'static str {
        match self {
            Self::LbsToKg => "Pounds to Kilograms",
            Self::KgToLbs => "Kilograms to Pounds",
            Self::InToCm => "Inches to Centimeters",
            Self::CmToIn => "Centimeters to Inches",
        }
    }

    /// `(input_unit, output_unit)` display labels.
    pub fn units(self) -> (&'static str, &'static str) {
        match self {
            Self::LbsToKg => ("lbs", "kg"),
            Self::KgToLbs => ("kg", "lbs"),
            Self::InToCm => ("in", "cm"),
            Self::CmToIn => ("cm", "in"),
        }
    }

    /// The conversion that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::LbsToKg => Self::KgToLbs,
            Self::KgToLbs => Self::LbsToKg,
            Self::InToCm => Self::CmToIn,
            Self::CmToIn => Self::InToCm,
        }
    }

    /// Applies the formula and rounds to 2 decimal places.
    ///
    /// # Errors
    /// - `InvalidInput` when `value` is NaN or infinite, or when the exact
    ///   result does not fit in an `f64`.
    pub fn apply(self, value: f64) -> Result<f64, ConversionError> {
        if !value.is_finite() {
            return Err(ConversionError::InvalidInput(value.to_string()));
        }

        let raw = match self {
            Self::LbsToKg => value * KG_PER_LB,
            Self::KgToLbs => value / KG_PER_LB,
            Self::InToCm => value * CM_PER_INCH,
            Self::CmToIn => value / CM_PER_INCH,
        };

        let rounded = round_to_cents(raw);
        if !rounded.is_finite() {
            // Division by the pound factor can push inputs near f64::MAX past it.
            return Err(ConversionError::InvalidInput(value.to_string()));
        }
        Ok(rounded)
    }
}

impl Display for ConversionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversionType {
    type Err = ConversionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "lbs_to_kg" => Ok(Self::LbsToKg),
            "kg_to_lbs" => Ok(Self::KgToLbs),
            "in_to_cm" => Ok(Self::InToCm),
            "cm_to_in" => Ok(Self::CmToIn),
            other => Err(ConversionError::InvalidConversionType(other.to_string())),
        }
    }
}

/// Converts `value` using the conversion named by `conversion_type`.
///
/// # Errors
/// - `InvalidConversionType` for unknown type names.
/// - `InvalidInput` for non-finite values.
pub fn convert(conversion_type: &str, value: f64) -> Result<f64, ConversionError> {
    conversion_type.parse::<ConversionType>()?.apply(value)
}

/// Parses user-provided numeric text into a finite `f64`.
pub fn parse_input_value(raw: &str) -> Result<f64, ConversionError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ConversionError::InvalidInput(trimmed.to_string())),
    }
}

/// Beyond 2^52 every `f64` is already a whole number.
const EXACT_INTEGER_LIMIT: f64 = 4_503_599_627_370_496.0;

fn round_to_cents(value: f64) -> f64 {
    if value.abs() >= EXACT_INTEGER_LIMIT {
        return value;
    }
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{convert, parse_input_value, ConversionError, ConversionType};

    fn approx_eq(left: f64, right: f64, tolerance: f64) -> bool {
        (left - right).abs() <= tolerance
    }

    #[test]
    fn reference_values_match() {
        assert_eq!(convert("lbs_to_kg", 150.0).unwrap(), 68.04);
        assert_eq!(convert("in_to_cm", 70.0).unwrap(), 177.8);
        assert_eq!(convert("kg_to_lbs", 90.0).unwrap(), 198.42);
        assert!(approx_eq(convert("cm_to_in", 177.8).unwrap(), 70.0, 1e-9));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = convert("xyz", 1.0).unwrap_err();
        assert_eq!(err, ConversionError::InvalidConversionType("xyz".to_string()));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = ConversionType::LbsToKg.apply(value).unwrap_err();
            assert!(matches!(err, ConversionError::InvalidInput(_)));
        }
    }

    #[test]
    fn overflowing_result_is_rejected() {
        let err = ConversionType::KgToLbs.apply(f64::MAX).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidInput(_)));
    }

    #[test]
    fn huge_finite_results_skip_cent_rounding() {
        let pounds = ConversionType::KgToLbs.apply(1e307).unwrap();
        assert!(pounds.is_finite());
        assert_eq!(pounds, 1e307 / super::KG_PER_LB);

        let big = 2f64.powi(60);
        assert_eq!(ConversionType::InToCm.apply(big).unwrap(), big * 2.54);
        assert_eq!(ConversionType::LbsToKg.apply(-1e300).unwrap(), -1e300 * super::KG_PER_LB);
    }

    #[test]
    fn weight_round_trip_stays_within_a_cent() {
        for x in [0.0, 10.0, 45.5, 150.0, 200.0, 999.99, 2500.0] {
            let kg = convert("lbs_to_kg", x).unwrap();
            let back = convert("kg_to_lbs", kg).unwrap();
            assert!(approx_eq(back, x, 0.01 + 1e-9), "{x} -> {kg} -> {back}");
        }
    }

    #[test]
    fn length_round_trip_stays_within_a_cent() {
        for x in [0.0, 1.0, 5.5, 70.0, 180.25] {
            let cm = ConversionType::InToCm.apply(x).unwrap();
            let back = ConversionType::CmToIn.apply(cm).unwrap();
            assert!(approx_eq(back, x, 0.01), "{x} -> {cm} -> {back}");
        }
    }

    #[test]
    fn negative_values_round_away_from_zero() {
        assert_eq!(ConversionType::InToCm.apply(-1.0).unwrap(), -2.54);
        assert_eq!(ConversionType::LbsToKg.apply(-150.0).unwrap(), -68.04);
    }

    #[test]
    fn every_type_round_trips_through_its_name() {
        for kind in ConversionType::ALL {
            assert_eq!(kind.as_str().parse::<ConversionType>().unwrap(), kind);
            assert_eq!(kind.inverse().inverse(), kind);
            let (input, output) = kind.units();
            assert_eq!(kind.inverse().units(), (output, input));
        }
    }

    #[test]
    fn parse_input_value_accepts_numbers_and_rejects_text() {
        assert_eq!(parse_input_value(" 12.5 ").unwrap(), 12.5);
        assert_eq!(parse_input_value("-3").unwrap(), -3.0);
        assert!(matches!(
            parse_input_value("twelve"),
            Err(ConversionError::InvalidInput(value)) if value == "twelve"
        ));
        assert!(parse_input_value("inf").is_err());
        assert!(parse_input_value("").is_err());
    }
}
