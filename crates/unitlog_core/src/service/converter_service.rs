//! Conversion workflow service.
//!
//! # Responsibility
//! - Sequence "convert and log": user lookup, input parsing, formula,
//!   persistence, optional favorite.
//! - Expose user/history/favorite operations to outer surfaces.
//! - Emit one structured log event per operation.
//!
//! # Invariants
//! - No business rules live here; validation belongs to the model and the
//!   store, ownership checks to the store.
//! - Lookup and parse failures are reported before any write happens.

use crate::formula::{parse_input_value, ConversionType};
use crate::model::conversion::{Conversion, ConversionId};
use crate::model::user::{User, UserId};
use crate::repo::conversion_repo::ConversionRepository;
use crate::repo::favorite_repo::FavoriteRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult};
use log::{debug, info, warn};

/// Request model for one logged conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    /// Owner of the logged conversion.
    pub user_id: UserId,
    /// Wire name such as `lbs_to_kg`.
    pub conversion_type: String,
    /// Raw numeric text as typed by the user.
    pub value: String,
    /// Also add the new conversion to the user's favorites.
    pub favorite: bool,
}

/// Outcome of a successful convert-and-log call.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedConversion {
    pub conversion: Conversion,
    pub favorited: bool,
}

/// Result of a conversion computed without logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionPreview {
    pub conversion_type: ConversionType,
    pub input_value: f64,
    pub result_value: f64,
}

/// Workflow facade over any store implementing the repository contracts.
pub struct ConverterService<S> {
    store: S,
}

impl<S> ConverterService<S>
where
    S: UserRepository + ConversionRepository + FavoriteRepository,
{
    /// Creates a service using the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn create_user(&mut self, name: &str) -> RepoResult<User> {
        let result = self.store.create_user(name);
        match &result {
            Ok(user) => info!(
                "event=user_create module=service status=ok user_id={}",
                user.id
            ),
            Err(err) => log_failure("user_create", err),
        }
        result
    }

    pub fn delete_user(&mut self, id: UserId) -> RepoResult<()> {
        let result = self.store.delete_user(id);
        match &result {
            Ok(()) => info!("event=user_delete module=service status=ok user_id={id}"),
            Err(err) => log_failure("user_delete", err),
        }
        result
    }

    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        let result = self.store.list_users();
        log_read("user_list", &result, |users| users.len());
        result
    }

    pub fn find_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let result = self.store.find_user(id);
        log_read("user_find", &result, |user| usize::from(user.is_some()));
        result
    }

    /// Computes a conversion without touching storage.
    pub fn preview(&self, conversion_type: &str, value: &str) -> RepoResult<ConversionPreview> {
        let result = compute_preview(conversion_type, value);
        match &result {
            Ok(preview) => debug!(
                "event=conversion_preview module=service status=ok type={}",
                preview.conversion_type
            ),
            Err(err) => log_failure("conversion_preview", err),
        }
        result
    }

    /// Converts a value for a user, logs it to history and optionally
    /// favorites it.
    ///
    /// # Errors
    /// - `NotFound` when the user does not exist.
    /// - `Validation` when `value` is not a finite number.
    /// - `InvalidConversionType` for unknown type names.
    /// - `Store` for persistence failures.
    pub fn convert_and_log(&mut self, request: &ConvertRequest) -> RepoResult<LoggedConversion> {
        let result = self.convert_and_log_inner(request);
        match &result {
            Ok(logged) => info!(
                "event=conversion_log module=service status=ok user_id={} conversion_id={} type={} favorited={}",
                request.user_id,
                logged.conversion.id(),
                logged.conversion.conversion_type(),
                logged.favorited
            ),
            Err(err) => log_failure("conversion_log", err),
        }
        result
    }

    fn convert_and_log_inner(&mut self, request: &ConvertRequest) -> RepoResult<LoggedConversion> {
        self.require_user(request.user_id)?;
        let preview = compute_preview(&request.conversion_type, &request.value)?;

        let conversion = self.store.log_conversion(
            preview.conversion_type.as_str(),
            preview.input_value,
            request.user_id,
            request.favorite,
        )?;

        Ok(LoggedConversion {
            conversion,
            favorited: request.favorite,
        })
    }

    /// Returns a user's history, most recent first.
    pub fn get_history(&self, user_id: UserId) -> RepoResult<Vec<Conversion>> {
        let result = self
            .require_user(user_id)
            .and_then(|_| self.store.list_conversions_for_user(user_id));
        log_read("history_list", &result, Vec::len);
        result
    }

    /// Returns recent conversions across all users.
    pub fn recent_conversions(&self, limit: Option<u32>) -> RepoResult<Vec<Conversion>> {
        let result = self.store.list_recent_conversions(limit);
        log_read("recent_list", &result, Vec::len);
        result
    }

    /// Deletes one logged conversion.
    pub fn undo_conversion(&mut self, id: ConversionId) -> RepoResult<()> {
        let result = self.store.delete_conversion(id);
        match &result {
            Ok(()) => info!("event=conversion_undo module=service status=ok conversion_id={id}"),
            Err(err) => log_failure("conversion_undo", err),
        }
        result
    }

    pub fn add_favorite(&mut self, user_id: UserId, conversion_id: ConversionId) -> RepoResult<bool> {
        let result = self.store.add_favorite(user_id, conversion_id);
        match &result {
            Ok(changed) => info!(
                "event=favorite_add module=service status=ok user_id={user_id} conversion_id={conversion_id} changed={changed}"
            ),
            Err(err) => log_failure("favorite_add", err),
        }
        result
    }

    pub fn remove_favorite(
        &mut self,
        user_id: UserId,
        conversion_id: ConversionId,
    ) -> RepoResult<bool> {
        let result = self.store.remove_favorite(user_id, conversion_id);
        match &result {
            Ok(changed) => info!(
                "event=favorite_remove module=service status=ok user_id={user_id} conversion_id={conversion_id} changed={changed}"
            ),
            Err(err) => log_failure("favorite_remove", err),
        }
        result
    }

    /// Returns a user's favorites, most recently favorited first.
    pub fn list_favorites(&self, user_id: UserId) -> RepoResult<Vec<Conversion>> {
        let result = self
            .require_user(user_id)
            .and_then(|_| self.store.list_favorites(user_id));
        log_read("favorite_list", &result, Vec::len);
        result
    }

    fn require_user(&self, user_id: UserId) -> RepoResult<User> {
        self.store
            .find_user(user_id)?
            .ok_or_else(|| RepoError::user_not_found(user_id))
    }
}

fn compute_preview(conversion_type: &str, value: &str) -> RepoResult<ConversionPreview> {
    let input_value = parse_input_value(value)?;
    let kind = conversion_type.parse::<ConversionType>()?;
    Ok(ConversionPreview {
        conversion_type: kind,
        input_value,
        result_value: kind.apply(input_value)?,
    })
}

fn log_read<T>(event: &str, result: &RepoResult<T>, count: impl FnOnce(&T) -> usize) {
    match result {
        Ok(value) => debug!(
            "event={} module=service status=ok count={}",
            event,
            count(value)
        ),
        Err(err) => log_failure(event, err),
    }
}

fn log_failure(event: &str, err: &RepoError) {
    warn!(
        "event={} module=service status=error error_code={} error={}",
        event,
        err.code(),
        err
    );
}
