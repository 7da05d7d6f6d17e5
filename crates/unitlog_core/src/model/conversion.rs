//! Logged conversion record.
//!
//! # Invariants
//! - `result_value`, `input_unit` and `output_unit` are derived from
//!   `(conversion_type, input_value)` and cannot be set by callers.
//! - `user_id` always names exactly one owner.

use crate::formula::{ConversionError, ConversionType};
use crate::model::now_epoch_ms;
use crate::model::user::UserId;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a logged conversion.
pub type ConversionId = Uuid;

/// One unit transformation performed for a specific user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    id: ConversionId,
    conversion_type: ConversionType,
    input_value: f64,
    result_value: f64,
    input_unit: &'static str,
    output_unit: &'static str,
    user_id: UserId,
    /// Unix epoch milliseconds.
    created_at: i64,
}

impl Conversion {
    /// Computes a new conversion owned by `user_id`.
    ///
    /// # Errors
    /// - `InvalidInput` when `input_value` is not finite.
    pub fn compute(
        conversion_type: ConversionType,
        input_value: f64,
        user_id: UserId,
    ) -> Result<Self, ConversionError> {
        Self::restore(
            Uuid::new_v4(),
            conversion_type,
            input_value,
            user_id,
            now_epoch_ms(),
        )
    }

    /// Rebuilds a conversion from persisted identity fields.
    ///
    /// The result and unit labels are recomputed, never trusted from storage.
    pub(crate) fn restore(
        id: ConversionId,
        conversion_type: ConversionType,
        input_value: f64,
        user_id: UserId,
        created_at: i64,
    ) -> Result<Self, ConversionError> {
        let result_value = conversion_type.apply(input_value)?;
        let (input_unit, output_unit) = conversion_type.units();
        Ok(Self {
            id,
            conversion_type,
            input_value,
            result_value,
            input_unit,
            output_unit,
            user_id,
            created_at,
        })
    }

    pub fn id(&self) -> ConversionId {
        self.id
    }

    pub fn conversion_type(&self) -> ConversionType {
        self.conversion_type
    }

    pub fn input_value(&self) -> f64 {
        self.input_value
    }

    pub fn result_value(&self) -> f64 {
        self.result_value
    }

    pub fn input_unit(&self) -> &'static str {
        self.input_unit
    }

    pub fn output_unit(&self) -> &'static str {
        self.output_unit
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }
}

impl Display for Conversion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2} {} → {:.2} {} ({})",
            self.input_value,
            self.input_unit,
            self.result_value,
            self.output_unit,
            self.conversion_type
        )
    }
}
