/// Connection Management Module
///
/// `Database` owns one open connection, runs statements against it and
/// holds the result of the most recent one. The connection is released on
/// `close` or when the value is dropped.

use super::driver::{self, RawConnection};
use super::dsn::Dsn;
use super::options::{ConnectionOptions, ErrorMode};
use super::query::ResultSet;
use super::value::Value;
use crate::config::Config;
use crate::core::{classify_connect_failure, DbError, Result};
use tracing::{debug, warn};

/// A database connection and the result of the last statement run on it.
///
/// # Examples
///
/// ```no_run
/// use dbwrap::{Database, Value};
///
/// let mut db = Database::new("app", "secret", "shop", None)?;
/// let rows = db
///     .run("SELECT username FROM users WHERE blurb LIKE ?", &[Value::from("%pog%")])?
///     .fetch_all();
/// db.close();
/// # Ok::<(), dbwrap::DbError>(())
/// ```
#[derive(Debug)]
pub struct Database {
    /// Active connection (None once closed)
    connection: Option<RawConnection>,
    /// Handle from the most recent `run`
    result: Option<ResultSet>,
    options: ConnectionOptions,
    dsn: Dsn,
}

impl Database {
    /// Connects to `database` on the fixed MySQL host
    /// (`mysql:host=database;port=3306;charset=utf8mb4;dbname=<database>`).
    ///
    /// `options` replaces the defaults entirely when given.
    ///
    /// # Errors
    ///
    /// `DriverUnavailable`, `DatabaseNotFound` or
    /// `AuthenticationOrConnectionFailed`, depending on the driver's failure.
    pub fn new(
        username: &str,
        password: &str,
        database: &str,
        options: Option<ConnectionOptions>,
    ) -> Result<Self> {
        Self::open(&Dsn::for_database(database), username, password, options)
    }

    /// Connects using a DSN string such as `sqlite:dbname=/var/lib/app.db`.
    ///
    /// A malformed DSN is classified like any other connection failure.
    pub fn connect(
        dsn: &str,
        username: &str,
        password: &str,
        options: Option<ConnectionOptions>,
    ) -> Result<Self> {
        let dsn = Dsn::parse(dsn).map_err(classify_connect_failure)?;
        Self::open(&dsn, username, password, options)
    }

    /// Connects using an already parsed DSN
    pub fn open(
        dsn: &Dsn,
        username: &str,
        password: &str,
        options: Option<ConnectionOptions>,
    ) -> Result<Self> {
        let options = options.unwrap_or_default();
        let connection = driver::connect(dsn, username, password, &options)
            .map_err(classify_connect_failure)?;

        debug!(driver = connection.driver_name(), dbname = ?dsn.dbname(), "opened database connection");
        Ok(Database {
            connection: Some(connection),
            result: None,
            options,
            dsn: dsn.clone(),
        })
    }

    /// Connects with the DSN, credentials and options from a settings file
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open(
            &config.dsn.to_dsn(),
            &config.username,
            &config.password,
            config.options,
        )
    }

    /// Runs a statement and returns its result handle.
    ///
    /// Without `args` the SQL is executed directly; otherwise it is prepared
    /// and `args` are bound to its `?` placeholders in order. The previous
    /// handle is dropped first.
    ///
    /// # Errors
    ///
    /// `NotConnected` after `close`. Driver failures are returned as
    /// `StatementExecutionFailed` in exception mode; in silent mode they come
    /// back as a handle for which `is_failed()` is true.
    pub fn run(&mut self, sql: &str, args: &[Value]) -> Result<&mut ResultSet> {
        let connection = self.connection.as_mut().ok_or(DbError::NotConnected)?;
        self.result = None;

        let outcome = if args.is_empty() {
            connection.query(sql)
        } else {
            connection.execute_prepared(sql, args)
        };

        let fetch_mode = self.options.fetch_mode;
        let result = match outcome {
            Ok(result) => result.with_fetch_mode(fetch_mode),
            Err(failure) => match self.options.error_mode {
                ErrorMode::Exception => return Err(DbError::StatementExecutionFailed(failure)),
                ErrorMode::Silent => {
                    warn!(error = %failure, "statement failed");
                    ResultSet::failed(failure, fetch_mode)
                }
            },
        };

        Ok(self.result.insert(result))
    }

    /// Runs a statement without arguments
    pub fn query(&mut self, sql: &str) -> Result<&mut ResultSet> {
        self.run(sql, &[])
    }

    /// The handle from the most recent `run`, if any
    pub fn result(&mut self) -> Option<&mut ResultSet> {
        self.result.as_mut()
    }

    /// Releases the connection and the held result. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.result = None;
        if let Some(connection) = self.connection.take() {
            debug!(driver = connection.driver_name(), "closed database connection");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// The underlying driver connection, `None` once closed
    pub fn raw_connection(&self) -> Option<&RawConnection> {
        self.connection.as_ref()
    }

    pub fn raw_connection_mut(&mut self) -> Option<&mut RawConnection> {
        self.connection.as_mut()
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.close();
    }
}
