//! Schema migrations for the conversion log.
//!
//! # Responsibility
//! - Keep the ordered list of schema steps and the tables each one creates.
//! - Bring a connection up to the latest schema inside one transaction.
//!
//! # Invariants
//! - Versions are strictly increasing, starting at 1.
//! - A step only counts as applied once every table it declares exists.
//! - The applied version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    tables: &'static [&'static str],
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "users_conversions_favorites",
    tables: &["users", "conversions", "favorite_links"],
    sql: include_str!("0001_init.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
/// - `IncompleteMigration` when a step ran but did not create its tables.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    apply_registry(conn, MIGRATIONS)
}

/// Reads the schema version recorded in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn apply_registry(conn: &mut Connection, registry: &[Migration]) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let latest = registry.last().map_or(0, |migration| migration.version);

    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }
    if from_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in registry.iter().filter(|m| m.version > from_version) {
        apply_step(&tx, migration)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        from_version, latest
    );
    Ok(())
}

fn apply_step(tx: &Transaction<'_>, migration: &Migration) -> DbResult<()> {
    tx.execute_batch(migration.sql)?;

    for &table in migration.tables {
        let present: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table],
            |row| row.get(0),
        )?;
        if present != 1 {
            return Err(DbError::IncompleteMigration {
                version: migration.version,
                table,
            });
        }
    }

    tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    info!(
        "event=db_migration_step module=db status=ok version={} name={} tables={}",
        migration.version,
        migration.name,
        migration.tables.join(",")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_registry, current_user_version, Migration, MIGRATIONS};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn registry_versions_start_at_one_and_increase() {
        let mut expected = 1;
        for migration in MIGRATIONS {
            assert_eq!(migration.version, expected, "{}", migration.name);
            assert!(!migration.tables.is_empty());
            expected += 1;
        }
    }

    #[test]
    fn step_missing_a_declared_table_is_rolled_back() {
        let mut conn = Connection::open_in_memory().unwrap();
        let broken = [Migration {
            version: 1,
            name: "broken",
            tables: &["users", "conversions"],
            sql: "CREATE TABLE users (id TEXT PRIMARY KEY NOT NULL);",
        }];

        let err = apply_registry(&mut conn, &broken).unwrap_err();
        assert!(matches!(
            err,
            DbError::IncompleteMigration {
                version: 1,
                table: "conversions"
            }
        ));

        assert_eq!(current_user_version(&conn).unwrap(), 0);
        let users_tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(users_tables, 0);
    }
}
