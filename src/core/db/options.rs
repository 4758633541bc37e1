/// Connection options chosen when a database is opened.

use serde::{Deserialize, Serialize};

/// How statement failures are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Failures come back as a failed result handle
    #[default]
    Silent,
    /// Failures come back as `DbError::StatementExecutionFailed`
    Exception,
}

/// Shape in which fetched rows serialize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Column name to value, in column order
    #[default]
    Assoc,
    /// Values by position
    Num,
}

/// Options applied to a connection.
///
/// A caller-supplied set replaces the defaults entirely; nothing is merged.
/// Every field is required when deserializing for the same reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    pub error_mode: ErrorMode,
    pub fetch_mode: FetchMode,
    /// Client-side emulation of prepared statements
    pub emulate_prepares: bool,
    /// Reuse connections across instances (MySQL only)
    pub persistent: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        ConnectionOptions {
            error_mode: ErrorMode::Silent,
            fetch_mode: FetchMode::Assoc,
            emulate_prepares: false,
            persistent: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConnectionOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Silent);
        assert_eq!(options.fetch_mode, FetchMode::Assoc);
        assert!(!options.emulate_prepares);
        assert!(options.persistent);
    }

    #[test]
    fn test_partial_options_are_rejected() {
        let partial = r#"error_mode = "exception""#;
        assert!(toml::from_str::<ConnectionOptions>(partial).is_err());

        let full = r#"
error_mode = "exception"
fetch_mode = "num"
emulate_prepares = true
persistent = false
"#;
        let options: ConnectionOptions = toml::from_str(full).unwrap();
        assert_eq!(options.error_mode, ErrorMode::Exception);
        assert_eq!(options.fetch_mode, FetchMode::Num);
        assert!(options.emulate_prepares);
        assert!(!options.persistent);
    }
}
