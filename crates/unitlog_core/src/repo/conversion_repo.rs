//! Conversion history repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist conversions computed by the formula module, with owner link.
//! - Serve per-user history and cross-user recent activity.
//!
//! # Invariants
//! - Type and value are validated before the owner lookup and before SQL
//!   mutation, so a rejected call never leaves a row behind.
//! - History order is `created_at DESC`, ties broken by insertion order.
//! - Logging a conversion with its favorite link is one transaction.

use crate::formula::ConversionType;
use crate::model::conversion::{Conversion, ConversionId};
use crate::model::now_epoch_ms;
use crate::model::user::UserId;
use crate::repo::store::{query_conversions, row_exists, SqliteStore, CONVERSION_SELECT_SQL};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Transaction};

const RECENT_DEFAULT_LIMIT: u32 = 5;
const RECENT_LIMIT_MAX: u32 = 100;

/// Repository interface for logged conversions.
pub trait ConversionRepository {
    /// Computes and persists a conversion owned by `user_id`.
    fn create_conversion(
        &mut self,
        conversion_type: &str,
        input_value: f64,
        user_id: UserId,
    ) -> RepoResult<Conversion>;
    /// Persists a conversion and, when `favorite` is set, links it into the
    /// owner's favorites in the same transaction.
    fn log_conversion(
        &mut self,
        conversion_type: &str,
        input_value: f64,
        user_id: UserId,
        favorite: bool,
    ) -> RepoResult<Conversion>;
    /// Gets one conversion by id.
    fn find_conversion(&self, id: ConversionId) -> RepoResult<Option<Conversion>>;
    /// Lists a user's conversions, most recent first.
    fn list_conversions_for_user(&self, user_id: UserId) -> RepoResult<Vec<Conversion>>;
    /// Lists the most recent conversions across all users.
    fn list_recent_conversions(&self, limit: Option<u32>) -> RepoResult<Vec<Conversion>>;
    /// Deletes one conversion ("undo") and its favorite links.
    fn delete_conversion(&mut self, id: ConversionId) -> RepoResult<()>;
}

impl ConversionRepository for SqliteStore<'_> {
    fn create_conversion(
        &mut self,
        conversion_type: &str,
        input_value: f64,
        user_id: UserId,
    ) -> RepoResult<Conversion> {
        self.log_conversion(conversion_type, input_value, user_id, false)
    }

    fn log_conversion(
        &mut self,
        conversion_type: &str,
        input_value: f64,
        user_id: UserId,
        favorite: bool,
    ) -> RepoResult<Conversion> {
        let kind = conversion_type.parse::<ConversionType>()?;
        let conversion = Conversion::compute(kind, input_value, user_id)?;

        let tx = self.write_tx()?;
        if !row_exists(&tx, "users", &user_id.to_string())? {
            return Err(RepoError::user_not_found(user_id));
        }

        insert_conversion(&tx, &conversion)?;
        if favorite {
            tx.execute(
                "INSERT INTO favorite_links (user_id, conversion_id, created_at)
                 VALUES (?1, ?2, ?3);",
                params![
                    user_id.to_string(),
                    conversion.id().to_string(),
                    now_epoch_ms()
                ],
            )?;
        }
        tx.commit()?;

        Ok(conversion)
    }

    fn find_conversion(&self, id: ConversionId) -> RepoResult<Option<Conversion>> {
        let mut found = query_conversions(
            self.connection(),
            &format!("{CONVERSION_SELECT_SQL} WHERE c.id = ?1;"),
            [id.to_string()],
        )?;
        Ok(found.pop())
    }

    fn list_conversions_for_user(&self, user_id: UserId) -> RepoResult<Vec<Conversion>> {
        query_conversions(
            self.connection(),
            &format!(
                "{CONVERSION_SELECT_SQL}
                 WHERE c.user_id = ?1
                 ORDER BY c.created_at DESC, c.rowid DESC;"
            ),
            [user_id.to_string()],
        )
    }

    fn list_recent_conversions(&self, limit: Option<u32>) -> RepoResult<Vec<Conversion>> {
        let limit = normalize_recent_limit(limit);
        query_conversions(
            self.connection(),
            &format!(
                "{CONVERSION_SELECT_SQL}
                 ORDER BY c.created_at DESC, c.rowid DESC
                 LIMIT ?1;"
            ),
            [i64::from(limit)],
        )
    }

    fn delete_conversion(&mut self, id: ConversionId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self.write_tx()?;
        tx.execute(
            "DELETE FROM favorite_links WHERE conversion_id = ?1;",
            [id_text.as_str()],
        )?;
        let changed = tx.execute("DELETE FROM conversions WHERE id = ?1;", [id_text.as_str()])?;
        if changed == 0 {
            return Err(RepoError::conversion_not_found(id));
        }
        tx.commit()?;

        Ok(())
    }
}

fn insert_conversion(tx: &Transaction<'_>, conversion: &Conversion) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO conversions (
            id,
            conversion_type,
            input_value,
            result_value,
            input_unit,
            output_unit,
            user_id,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        params![
            conversion.id().to_string(),
            conversion.conversion_type().as_str(),
            conversion.input_value(),
            conversion.result_value(),
            conversion.input_unit(),
            conversion.output_unit(),
            conversion.user_id().to_string(),
            conversion.created_at(),
        ],
    )?;
    Ok(())
}

/// Normalizes the recent-activity limit: default 5, capped at 100.
pub fn normalize_recent_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => RECENT_DEFAULT_LIMIT,
        Some(value) if value > RECENT_LIMIT_MAX => RECENT_LIMIT_MAX,
        Some(value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_recent_limit;

    #[test]
    fn recent_limit_defaults_and_caps() {
        assert_eq!(normalize_recent_limit(None), 5);
        assert_eq!(normalize_recent_limit(Some(0)), 5);
        assert_eq!(normalize_recent_limit(Some(12)), 12);
        assert_eq!(normalize_recent_limit(Some(1_000)), 100);
    }
}
