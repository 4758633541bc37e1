/// Core Module for dbwrap
///
/// Shared infrastructure: the database layer and the error types every
/// operation reports through.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{classify_connect_failure, DbError, DriverError, Result};
