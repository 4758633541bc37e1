//! A minimal wrapper around a relational database connection.
//!
//! `Database` opens a connection with fixed default options, runs statements
//! directly or as prepared statements with positional arguments, reports
//! connection failures as one of three user-facing errors and releases the
//! connection when closed or dropped.

// Core infrastructure modules
pub mod core;

pub mod config;

#[cfg(test)]
mod test_utils;

pub use crate::core::db::{
    ConnectionOptions, Database, Dsn, ErrorMode, FetchMode, RawConnection, ResultSet, Row, Value,
};
pub use crate::core::{classify_connect_failure, DbError, DriverError, Result};
