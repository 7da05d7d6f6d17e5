//! Favorite-link repository contract and SQLite implementation.
//!
//! # Invariants
//! - A link `(user_id, conversion_id)` exists only when the conversion is
//!   owned by that user. Checked at write time and by the composite
//!   foreign key on `favorite_links`.
//! - Adding an existing link and removing a missing one are no-ops that
//!   report `false`.

use crate::model::conversion::{Conversion, ConversionId};
use crate::model::now_epoch_ms;
use crate::model::user::UserId;
use crate::repo::store::{query_conversions, row_exists, SqliteStore, CONVERSION_SELECT_SQL};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for per-user favorite conversions.
pub trait FavoriteRepository {
    /// Links a user's own conversion as favorite; `false` when already linked.
    fn add_favorite(&mut self, user_id: UserId, conversion_id: ConversionId) -> RepoResult<bool>;
    /// Unlinks a favorite; `false` when no link existed.
    fn remove_favorite(&mut self, user_id: UserId, conversion_id: ConversionId)
        -> RepoResult<bool>;
    /// Returns whether the link exists.
    fn is_favorite(&self, user_id: UserId, conversion_id: ConversionId) -> RepoResult<bool>;
    /// Lists a user's favorite conversions, most recently favorited first.
    fn list_favorites(&self, user_id: UserId) -> RepoResult<Vec<Conversion>>;
}

impl FavoriteRepository for SqliteStore<'_> {
    fn add_favorite(&mut self, user_id: UserId, conversion_id: ConversionId) -> RepoResult<bool> {
        let user_text = user_id.to_string();
        let conversion_text = conversion_id.to_string();

        let tx = self.write_tx()?;
        if !row_exists(&tx, "users", &user_text)? {
            return Err(RepoError::user_not_found(user_id));
        }

        let owner: Option<String> = tx
            .query_row(
                "SELECT user_id FROM conversions WHERE id = ?1;",
                [conversion_text.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        match owner {
            None => return Err(RepoError::conversion_not_found(conversion_id)),
            Some(owner) if owner != user_text => {
                return Err(RepoError::Ownership {
                    user_id,
                    conversion_id,
                });
            }
            Some(_) => {}
        }

        if link_exists(&tx, &user_text, &conversion_text)? {
            return Ok(false);
        }

        tx.execute(
            "INSERT INTO favorite_links (user_id, conversion_id, created_at)
             VALUES (?1, ?2, ?3);",
            params![user_text, conversion_text, now_epoch_ms()],
        )?;
        tx.commit()?;

        Ok(true)
    }

    fn remove_favorite(
        &mut self,
        user_id: UserId,
        conversion_id: ConversionId,
    ) -> RepoResult<bool> {
        let tx = self.write_tx()?;
        let changed = tx.execute(
            "DELETE FROM favorite_links WHERE user_id = ?1 AND conversion_id = ?2;",
            params![user_id.to_string(), conversion_id.to_string()],
        )?;
        tx.commit()?;

        Ok(changed > 0)
    }

    fn is_favorite(&self, user_id: UserId, conversion_id: ConversionId) -> RepoResult<bool> {
        link_exists(
            self.connection(),
            &user_id.to_string(),
            &conversion_id.to_string(),
        )
    }

    fn list_favorites(&self, user_id: UserId) -> RepoResult<Vec<Conversion>> {
        query_conversions(
            self.connection(),
            &format!(
                "{CONVERSION_SELECT_SQL}
                 INNER JOIN favorite_links f ON f.conversion_id = c.id AND f.user_id = c.user_id
                 WHERE f.user_id = ?1
                 ORDER BY f.created_at DESC, f.rowid DESC;"
            ),
            [user_id.to_string()],
        )
    }
}

fn link_exists(conn: &Connection, user_id: &str, conversion_id: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM favorite_links
            WHERE user_id = ?1 AND conversion_id = ?2
        );",
        [user_id, conversion_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
