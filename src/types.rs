//! Amount newtypes and minor-unit conversion.

use std::fmt::Display;

use error_stack::ResultExt;
use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::{
    enums::Currency,
    errors::{CustomResult, ValidationError},
};

/// This Unit struct represents MinorUnit in which the signed `paymentAmount`
/// field works
#[derive(
    Debug, serde::Deserialize, serde::Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd,
)]
pub struct MinorUnit(i64);

impl MinorUnit {
    /// forms a new minor unit from amount
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// gets amount as i64 value
    pub fn get_amount_as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for MinorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount in the major denomination, as supplied by the merchant application
/// (e.g. `"20.00"` for twenty euro).
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize, PartialEq, Eq)]
pub struct StringMajorUnit(String);

impl StringMajorUnit {
    /// forms a new major unit from amount
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Whether the caller supplied any amount at all.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Convert the amount to the smallest unit of the given currency.
    ///
    /// Scaling is done in decimal arithmetic so `"20.00"` EUR is exactly
    /// `2000`, never a float neighbour of it. Amounts that do not land on a
    /// whole minor unit (e.g. `"10.005"` USD) are rejected rather than
    /// rounded.
    pub fn to_minor_unit(&self, currency: Currency) -> CustomResult<MinorUnit, ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::MissingRequiredField {
                field_name: "amount".to_string(),
            }
            .into());
        }
        let major = Decimal::from_str_exact(self.0.trim())
            .change_context(ValidationError::IncorrectValueProvided {
                field_name: "amount",
            })?;
        let exponent = currency.number_of_digits_after_decimal_point();
        let scaled = major * Decimal::from(10_i64.pow(u32::from(exponent)));
        if !scaled.fract().is_zero() {
            return Err(ValidationError::IncorrectValueProvided {
                field_name: "amount",
            }
            .into());
        }
        scaled
            .to_i64()
            .map(MinorUnit::new)
            .ok_or(ValidationError::IncorrectValueProvided {
                field_name: "amount",
            })
            .map_err(Into::into)
    }
}
