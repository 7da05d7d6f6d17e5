//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - Names are trimmed and validated before any SQL runs.
//! - Deleting a user removes owned conversions and every favorite link
//!   touching them in the same transaction.

use crate::model::user::{User, UserId};
use crate::repo::store::{parse_user_row, row_exists, SqliteStore};
use crate::repo::{RepoError, RepoResult};
use rusqlite::params;

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Validates `name` and persists a new user.
    fn create_user(&mut self, name: &str) -> RepoResult<User>;
    /// Deletes a user and cascades to its conversions and favorite links.
    fn delete_user(&mut self, id: UserId) -> RepoResult<()>;
    /// Lists all users sorted by name.
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Gets one user by id.
    fn find_user(&self, id: UserId) -> RepoResult<Option<User>>;
}

impl UserRepository for SqliteStore<'_> {
    fn create_user(&mut self, name: &str) -> RepoResult<User> {
        let user = User::new(name)?;

        let tx = self.write_tx()?;
        tx.execute(
            "INSERT INTO users (id, name, created_at) VALUES (?1, ?2, ?3);",
            params![user.id.to_string(), user.name.as_str(), user.created_at],
        )?;
        tx.commit()?;

        Ok(user)
    }

    fn delete_user(&mut self, id: UserId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self.write_tx()?;
        if !row_exists(&tx, "users", &id_text)? {
            return Err(RepoError::user_not_found(id));
        }

        tx.execute(
            "DELETE FROM favorite_links
             WHERE user_id = ?1
                OR conversion_id IN (SELECT id FROM conversions WHERE user_id = ?1);",
            [id_text.as_str()],
        )?;
        tx.execute(
            "DELETE FROM conversions WHERE user_id = ?1;",
            [id_text.as_str()],
        )?;
        tx.execute("DELETE FROM users WHERE id = ?1;", [id_text.as_str()])?;
        tx.commit()?;

        Ok(())
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, name, created_at
             FROM users
             ORDER BY name ASC, created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn find_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT id, name, created_at FROM users WHERE id = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}
