//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for users, conversions
//!   and favorite links.
//! - Isolate SQLite query details from workflow orchestration.
//!
//! # Invariants
//! - Write paths validate input before opening a transaction.
//! - Every mutating call commits fully or rolls back; no partial writes.
//! - Repository APIs return semantic errors (`NotFound`, `Ownership`) in
//!   addition to storage transport errors.

use crate::db::DbError;
use crate::formula::ConversionError;
use crate::model::validation::ValidationError;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use uuid::Uuid;

pub mod conversion_repo;
pub mod favorite_repo;
pub mod store;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Record kinds addressed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Conversion,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Conversion => f.write_str("conversion"),
        }
    }
}

/// Error surfaced by the record store and the workflow layer.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Bad name or bad numeric input.
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("invalid conversion type `{0}`; expected lbs_to_kg|kg_to_lbs|in_to_cm|cm_to_in")]
    InvalidConversionType(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: Uuid },
    #[error("conversion {conversion_id} does not belong to user {user_id}")]
    Ownership { user_id: Uuid, conversion_id: Uuid },
    /// Underlying persistence failure; the in-flight transaction was rolled back.
    #[error("store error: {0}")]
    Store(#[from] DbError),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error(
        "connection schema version {actual_version} does not match expected {expected_version}"
    )]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("missing required table `{0}`")]
    MissingRequiredTable(&'static str),
    #[error("missing required column `{table}.{column}`")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub(crate) fn user_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: Entity::User,
            id,
        }
    }

    pub(crate) fn conversion_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: Entity::Conversion,
            id,
        }
    }

    /// Stable machine-readable code for logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidConversionType(_) => "invalid_conversion_type",
            Self::NotFound { .. } => "not_found",
            Self::Ownership { .. } => "ownership_error",
            Self::Store(_) => "store_error",
            Self::InvalidData(_) => "invalid_data",
            Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => "uninitialized_store",
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(DbError::Sqlite(value))
    }
}

impl From<ConversionError> for RepoError {
    fn from(value: ConversionError) -> Self {
        match value {
            ConversionError::InvalidConversionType(raw) => Self::InvalidConversionType(raw),
            ConversionError::InvalidInput(raw) => {
                Self::Validation(ValidationError::InvalidInput(raw))
            }
        }
    }
}
