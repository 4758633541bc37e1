/// MySQL backend built on the synchronous `mysql` crate.
///
/// Persistent connections are checked out of a driver pool kept per
/// (DSN, user, password digest) for the life of the process. Dropping the
/// connection hands it back to that pool. Non-persistent connections are
/// dedicated and closed on drop.

use crate::core::db::dsn::{Dsn, DEFAULT_HOST, DEFAULT_PORT};
use crate::core::db::options::ConnectionOptions;
use crate::core::db::query::ResultSet;
use crate::core::db::value::Value;
use crate::core::DriverError;
use mysql::prelude::{Protocol, Queryable};
use mysql::{Conn, OptsBuilder, Params, Pool, PoolConstraints, PoolOpts, PooledConn, QueryResult};
use once_cell::sync::OnceCell;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

pub const DRIVER_NAME: &str = "mysql";

/// Upper bound on idle plus checked-out connections per persistent pool
const PERSISTENT_POOL_MAX: usize = 16;

type PoolKey = (String, String, u64);

/// Pools backing persistent connections, keyed by DSN, user and password digest
static PERSISTENT_POOLS: OnceCell<Mutex<HashMap<PoolKey, Pool>>> = OnceCell::new();

/// An open MySQL connection
pub enum MySqlConnection {
    /// Opened for this instance only
    Dedicated(Conn),
    /// Borrowed from a persistent pool
    Persistent(PooledConn),
}

impl fmt::Debug for MySqlConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MySqlConnection::Dedicated(conn) => {
                f.debug_tuple("Dedicated").field(&conn.connection_id()).finish()
            }
            MySqlConnection::Persistent(conn) => f
                .debug_tuple("Persistent")
                .field(&conn.connection_id())
                .finish(),
        }
    }
}

impl MySqlConnection {
    /// Runs `sql` over the text protocol
    pub(crate) fn query(&mut self, sql: &str) -> Result<ResultSet, DriverError> {
        match self {
            MySqlConnection::Dedicated(conn) => text_query(conn, sql),
            MySqlConnection::Persistent(conn) => text_query(conn, sql),
        }
    }

    /// Prepares `sql` on the server and executes it with `args`
    pub(crate) fn execute_prepared(&mut self, sql: &str, args: &[Value]) -> Result<ResultSet, DriverError> {
        match self {
            MySqlConnection::Dedicated(conn) => prepared_query(conn, sql, args),
            MySqlConnection::Persistent(conn) => prepared_query(conn, sql, args),
        }
    }

    /// The server-side connection id
    pub fn connection_id(&self) -> u32 {
        match self {
            MySqlConnection::Dedicated(conn) => conn.connection_id(),
            MySqlConnection::Persistent(conn) => conn.connection_id(),
        }
    }
}

pub(crate) fn connect(
    dsn: &Dsn,
    username: &str,
    password: &str,
    options: &ConnectionOptions,
) -> Result<MySqlConnection, DriverError> {
    if options.emulate_prepares {
        debug!("mysql backend has no client-side prepare emulation; using server-side prepares");
    }

    let builder = build_opts(dsn, username, password)?;
    if options.persistent {
        let key = pool_key(dsn, username, password);
        Ok(MySqlConnection::Persistent(checkout_persistent(dsn, key, builder)?))
    } else {
        Ok(MySqlConnection::Dedicated(Conn::new(builder)?))
    }
}

fn build_opts(dsn: &Dsn, username: &str, password: &str) -> Result<OptsBuilder, DriverError> {
    let port = dsn.port()?.unwrap_or(DEFAULT_PORT);
    let mut builder = OptsBuilder::new()
        .ip_or_hostname(Some(dsn.host().unwrap_or(DEFAULT_HOST)))
        .tcp_port(port)
        .prefer_socket(false)
        .user(Some(username))
        .pass(Some(password))
        .db_name(dsn.dbname());

    if let Some(charset) = dsn.charset() {
        builder = builder.init(vec![format!("SET NAMES {}", charset)]);
    }
    Ok(builder)
}

/// Checks a connection out of the pool for `key`, creating the pool on first use.
///
/// A new pool is only registered once a checkout from it has succeeded, so
/// failed attempts leave nothing behind.
fn checkout_persistent(dsn: &Dsn, key: PoolKey, builder: OptsBuilder) -> Result<PooledConn, DriverError> {
    let pools = PERSISTENT_POOLS.get_or_init(|| Mutex::new(HashMap::new()));
    let existing = pools
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .cloned();
    if let Some(pool) = existing {
        return Ok(pool.get_conn()?);
    }

    // min 0 so creating the pool never connects; failures surface on checkout
    let constraints = PoolConstraints::new(0, PERSISTENT_POOL_MAX).unwrap_or_default();
    let pool = Pool::new(builder.pool_opts(PoolOpts::default().with_constraints(constraints)))?;
    let conn = pool.get_conn()?;

    pools
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(key)
        .or_insert(pool);
    debug!(dsn = %dsn, "registered persistent connection pool");
    Ok(conn)
}

/// Registry key for a DSN and credentials. The password is only kept as a digest.
fn pool_key(dsn: &Dsn, username: &str, password: &str) -> PoolKey {
    let mut hasher = DefaultHasher::new();
    password.hash(&mut hasher);
    (dsn.to_string(), username.to_string(), hasher.finish())
}

#[cfg(test)]
fn registered_pools(dsn: &Dsn) -> usize {
    let prefix = dsn.to_string();
    PERSISTENT_POOLS
        .get()
        .map(|pools| {
            pools
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .keys()
                .filter(|(key_dsn, _, _)| *key_dsn == prefix)
                .count()
        })
        .unwrap_or(0)
}

fn text_query<Q: Queryable>(conn: &mut Q, sql: &str) -> Result<ResultSet, DriverError> {
    let result = conn.query_iter(sql)?;
    collect(result)
}

fn prepared_query<Q: Queryable>(conn: &mut Q, sql: &str, args: &[Value]) -> Result<ResultSet, DriverError> {
    let params = Params::Positional(args.iter().map(mysql::Value::from).collect());
    let result = conn.exec_iter(sql, params)?;
    collect(result)
}

/// Buffers the first result set so the connection is free for the next statement
fn collect<P: Protocol>(mut result: QueryResult<'_, '_, '_, P>) -> Result<ResultSet, DriverError> {
    let columns: Vec<String> = result
        .columns()
        .as_ref()
        .iter()
        .map(|column| column.name_str().into_owned())
        .collect();
    let affected_rows = result.affected_rows();
    let last_insert_id = result.last_insert_id().filter(|id| *id > 0);

    let mut rows = Vec::new();
    for row in result.by_ref() {
        let row = row?;
        rows.push(
            (0..row.len())
                .map(|i| row.as_ref(i).cloned().map_or(Value::Null, Value::from))
                .collect(),
        );
    }

    let row_count = if columns.is_empty() {
        affected_rows
    } else {
        rows.len() as u64
    };
    Ok(ResultSet::new(columns, rows, row_count, last_insert_id))
}

impl From<&Value> for mysql::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => mysql::Value::NULL,
            Value::Int(i) => mysql::Value::Int(*i),
            Value::UInt(u) => mysql::Value::UInt(*u),
            Value::Float(f) => mysql::Value::Double(*f),
            Value::Text(s) => mysql::Value::Bytes(s.as_bytes().to_vec()),
            Value::Bytes(b) => mysql::Value::Bytes(b.clone()),
        }
    }
}

impl From<mysql::Value> for Value {
    fn from(value: mysql::Value) -> Self {
        match value {
            mysql::Value::NULL => Value::Null,
            mysql::Value::Int(i) => Value::Int(i),
            mysql::Value::UInt(u) => Value::UInt(u),
            mysql::Value::Float(f) => Value::Float(f64::from(f)),
            mysql::Value::Double(f) => Value::Float(f),
            mysql::Value::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Value::Text(text),
                Err(e) => Value::Bytes(e.into_bytes()),
            },
            mysql::Value::Date(year, month, day, hour, minute, second, micros) => {
                let mut text = format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, minute, second
                );
                if micros > 0 {
                    text.push_str(&format!(".{:06}", micros));
                }
                Value::Text(text)
            }
            mysql::Value::Time(negative, days, hours, minutes, seconds, micros) => {
                let total_hours = u64::from(days) * 24 + u64::from(hours);
                let mut text = format!(
                    "{}{:02}:{:02}:{:02}",
                    if negative { "-" } else { "" },
                    total_hours,
                    minutes,
                    seconds
                );
                if micros > 0 {
                    text.push_str(&format!(".{:06}", micros));
                }
                Value::Text(text)
            }
        }
    }
}
