/// Database Module
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`): `Database`, which opens,
///   runs statements on, and closes one connection
/// - **Query Results** (`query.rs`): the result handle returned by `run`
/// - **Drivers** (`driver/`): the compiled-in backends (SQLite always, MySQL
///   behind the `mysql` feature)
/// - **DSN, options and values** (`dsn.rs`, `options.rs`, `value.rs`)
///
/// ## Error Handling
///
/// Connection failures are classified into `DbError`'s three connection
/// variants. Statement failures pass through as the driver reported them.
pub mod connection;
pub mod driver;
pub mod dsn;
pub mod options;
pub mod query;
pub mod value;

pub use connection::Database;
pub use driver::RawConnection;
pub use dsn::Dsn;
pub use options::{ConnectionOptions, ErrorMode, FetchMode};
pub use query::ResultSet;
pub use value::{Row, Value};
