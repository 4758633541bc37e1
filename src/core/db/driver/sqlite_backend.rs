/// SQLite backend built on rusqlite.
///
/// `dbname` is the database file path, or `:memory:`. Host, port, charset and
/// credentials have no meaning for SQLite and are ignored.

use crate::core::db::dsn::Dsn;
use crate::core::db::query::ResultSet;
use crate::core::db::value::Value;
use crate::core::DriverError;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags, Statement};
use std::path::Path;

pub const DRIVER_NAME: &str = "sqlite";

/// Opens an existing SQLite database file.
///
/// A missing file is reported as an unknown database rather than created.
/// Connection settings are left at the library defaults.
pub(crate) fn connect(dsn: &Dsn) -> Result<Connection, DriverError> {
    let path = dsn
        .dbname()
        .ok_or_else(|| DriverError::new("no dbname given in data source name"))?;

    if path == ":memory:" {
        Ok(Connection::open_in_memory()?)
    } else {
        if !Path::new(path).exists() {
            return Err(DriverError::new(format!("unknown database '{}'", path)));
        }
        Ok(Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?)
    }
}

/// Runs `sql` once without arguments
pub(crate) fn query(conn: &Connection, sql: &str) -> Result<ResultSet, DriverError> {
    let stmt = conn.prepare(sql)?;
    collect(conn, sql, stmt, &[])
}

/// Prepares `sql` and runs it with `args` bound positionally
pub(crate) fn execute_prepared(
    conn: &Connection,
    sql: &str,
    args: &[Value],
) -> Result<ResultSet, DriverError> {
    let stmt = conn.prepare(sql)?;
    collect(conn, sql, stmt, args)
}

fn collect(
    conn: &Connection,
    sql: &str,
    mut stmt: Statement<'_>,
    args: &[Value],
) -> Result<ResultSet, DriverError> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    if columns.is_empty() {
        let rowid_before = conn.last_insert_rowid();
        let changed = stmt.execute(params_from_iter(args.iter()))?;
        // the connection keeps its last rowid across non-inserting statements
        let rowid_after = conn.last_insert_rowid();
        let inserted = rowid_after != rowid_before || (changed > 0 && starts_with_insert(sql));
        let last_insert_id = if inserted {
            u64::try_from(rowid_after).ok().filter(|id| *id > 0)
        } else {
            None
        };
        return Ok(ResultSet::new(columns, Vec::new(), changed as u64, last_insert_id));
    }

    let column_count = columns.len();
    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            (0..column_count)
                .map(|i| row.get_ref(i).map(Value::from))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let row_count = rows.len() as u64;
    Ok(ResultSet::new(columns, rows, row_count, None))
}

fn starts_with_insert(sql: &str) -> bool {
    let keyword: String = sql
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    keyword.eq_ignore_ascii_case("insert") || keyword.eq_ignore_ascii_case("replace")
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Int(i),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(t) => match std::str::from_utf8(t) {
                Ok(s) => Value::Text(s.to_string()),
                Err(_) => Value::Bytes(t.to_vec()),
            },
            ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Int(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::UInt(u) => {
                let i = i64::try_from(*u)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                ToSqlOutput::Borrowed(ValueRef::Integer(i))
            }
            Value::Float(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}
