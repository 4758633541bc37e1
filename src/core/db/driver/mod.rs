/// Database Drivers
///
/// Resolves a DSN's driver prefix to a compiled-in backend and dispatches
/// statements to it. Unknown prefixes, and prefixes whose cargo feature is
/// disabled, fail with `could not find driver`.

#[cfg(feature = "mysql")]
pub mod mysql_backend;
pub mod sqlite_backend;

use super::dsn::Dsn;
use super::options::ConnectionOptions;
use super::query::ResultSet;
use super::value::Value;
use crate::core::DriverError;

/// Driver-level message for an unavailable driver
pub const DRIVER_NOT_FOUND: &str = "could not find driver";

/// An open connection on one of the compiled-in backends
#[derive(Debug)]
pub enum RawConnection {
    Sqlite(rusqlite::Connection),
    #[cfg(feature = "mysql")]
    MySql(mysql_backend::MySqlConnection),
}

impl RawConnection {
    /// The DSN prefix this connection was opened with
    pub fn driver_name(&self) -> &'static str {
        match self {
            RawConnection::Sqlite(_) => sqlite_backend::DRIVER_NAME,
            #[cfg(feature = "mysql")]
            RawConnection::MySql(_) => mysql_backend::DRIVER_NAME,
        }
    }

    /// Runs `sql` once without bound arguments
    pub(crate) fn query(&mut self, sql: &str) -> Result<ResultSet, DriverError> {
        match self {
            RawConnection::Sqlite(conn) => sqlite_backend::query(conn, sql),
            #[cfg(feature = "mysql")]
            RawConnection::MySql(conn) => conn.query(sql),
        }
    }

    /// Prepares `sql`, binds `args` positionally and executes it
    pub(crate) fn execute_prepared(
        &mut self,
        sql: &str,
        args: &[Value],
    ) -> Result<ResultSet, DriverError> {
        match self {
            RawConnection::Sqlite(conn) => sqlite_backend::execute_prepared(conn, sql, args),
            #[cfg(feature = "mysql")]
            RawConnection::MySql(conn) => conn.execute_prepared(sql, args),
        }
    }
}

/// Opens a connection for `dsn` on the matching backend
#[cfg_attr(not(feature = "mysql"), allow(unused_variables))]
pub(crate) fn connect(
    dsn: &Dsn,
    username: &str,
    password: &str,
    options: &ConnectionOptions,
) -> Result<RawConnection, DriverError> {
    match dsn.driver() {
        sqlite_backend::DRIVER_NAME => sqlite_backend::connect(dsn).map(RawConnection::Sqlite),
        #[cfg(feature = "mysql")]
        mysql_backend::DRIVER_NAME => {
            mysql_backend::connect(dsn, username, password, options).map(RawConnection::MySql)
        }
        _ => Err(DriverError::new(DRIVER_NOT_FOUND)),
    }
}
