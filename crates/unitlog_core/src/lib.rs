//! Core domain logic for the unit conversion log.
//! This crate is the single source of truth for record invariants.

pub mod db;
pub mod formula;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{close_db, open_db, open_db_in_memory, DbError, DbResult};
pub use formula::{convert, parse_input_value, ConversionError, ConversionType};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::conversion::{Conversion, ConversionId};
pub use model::user::{User, UserId};
pub use model::validation::{validate_user_name, ValidationError, MAX_USER_NAME_CHARS};
pub use repo::conversion_repo::ConversionRepository;
pub use repo::favorite_repo::FavoriteRepository;
pub use repo::store::SqliteStore;
pub use repo::user_repo::UserRepository;
pub use repo::{Entity, RepoError, RepoResult};
pub use service::converter_service::{
    ConversionPreview, ConvertRequest, ConverterService, LoggedConversion,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
