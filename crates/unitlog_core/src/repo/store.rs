//! SQLite store handle shared by all repository implementations.
//!
//! # Responsibility
//! - Own the borrowed connection for the lifetime of a unit of work.
//! - Refuse connections whose schema is not fully migrated.
//! - Parse persisted rows into domain records, rejecting invalid state.
//!
//! # Invariants
//! - Write transactions use `BEGIN IMMEDIATE` and roll back on drop.
//! - Read paths never mask malformed rows; they return `InvalidData`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::formula::ConversionType;
use crate::model::conversion::Conversion;
use crate::model::user::User;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{Connection, Params, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

pub(crate) const CONVERSION_SELECT_SQL: &str = "SELECT
    c.id AS id,
    c.conversion_type AS conversion_type,
    c.input_value AS input_value,
    c.result_value AS result_value,
    c.input_unit AS input_unit,
    c.output_unit AS output_unit,
    c.user_id AS user_id,
    c.created_at AS created_at
FROM conversions c";

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("users", &["id", "name", "created_at"]),
    (
        "conversions",
        &[
            "id",
            "conversion_type",
            "input_value",
            "result_value",
            "input_unit",
            "output_unit",
            "user_id",
            "created_at",
        ],
    ),
    ("favorite_links", &["user_id", "conversion_id", "created_at"]),
];

/// SQLite-backed record store implementing every repository contract.
pub struct SqliteStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` for schema drift.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Read-only access to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &*self.conn
    }

    pub(crate) fn write_tx(&mut self) -> RepoResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

pub(crate) fn row_exists(conn: &Connection, table: &'static str, id: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn query_conversions(
    conn: &Connection,
    sql: &str,
    params: impl Params,
) -> RepoResult<Vec<Conversion>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut conversions = Vec::new();
    while let Some(row) = rows.next()? {
        conversions.push(parse_conversion_row(row)?);
    }
    Ok(conversions)
}

pub(crate) fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn parse_conversion_row(row: &Row<'_>) -> RepoResult<Conversion> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "conversions.id")?;

    let user_text: String = row.get("user_id")?;
    let user_id = parse_uuid(&user_text, "conversions.user_id")?;

    let type_text: String = row.get("conversion_type")?;
    let kind = type_text.parse::<ConversionType>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid conversion type `{type_text}` in conversions.conversion_type"
        ))
    })?;

    let input_value: f64 = row.get("input_value")?;
    let conversion = Conversion::restore(id, kind, input_value, user_id, row.get("created_at")?)
        .map_err(|err| RepoError::InvalidData(format!("conversion {id}: {err}")))?;

    let stored_result: f64 = row.get("result_value")?;
    if stored_result != conversion.result_value() {
        return Err(RepoError::InvalidData(format!(
            "conversion {id}: stored result {stored_result} does not match derived {}",
            conversion.result_value()
        )));
    }

    let input_unit: String = row.get("input_unit")?;
    let output_unit: String = row.get("output_unit")?;
    if input_unit != conversion.input_unit() || output_unit != conversion.output_unit() {
        return Err(RepoError::InvalidData(format!(
            "conversion {id}: stored units `{input_unit}`/`{output_unit}` do not match `{kind}`"
        )));
    }

    Ok(conversion)
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
