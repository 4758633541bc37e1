/// Data Source Names
///
/// A DSN names the driver and the connection parameters in the form
/// `driver:key=value;key=value`.

use crate::core::DriverError;
use std::fmt;
use std::str::FromStr;

/// Driver used by [`Dsn::for_database`]
pub const DEFAULT_DRIVER: &str = "mysql";
/// Host used by [`Dsn::for_database`]
pub const DEFAULT_HOST: &str = "database";
/// Port used by [`Dsn::for_database`]
pub const DEFAULT_PORT: u16 = 3306;
/// Character set used by [`Dsn::for_database`]
pub const DEFAULT_CHARSET: &str = "utf8mb4";

/// A parsed data source name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    driver: String,
    params: Vec<(String, String)>,
}

impl Dsn {
    /// Creates a DSN for `driver` with no parameters
    pub fn new(driver: impl Into<String>) -> Self {
        Dsn {
            driver: driver.into(),
            params: Vec::new(),
        }
    }

    /// Builds the fixed MySQL DSN for `database`:
    /// `mysql:host=database;port=3306;charset=utf8mb4;dbname=<database>`
    pub fn for_database(database: &str) -> Self {
        Dsn::new(DEFAULT_DRIVER)
            .with("host", DEFAULT_HOST)
            .with("port", DEFAULT_PORT.to_string())
            .with("charset", DEFAULT_CHARSET)
            .with("dbname", database)
    }

    /// Sets `key` to `value`, replacing an existing entry in place
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key, value)),
        }
        self
    }

    /// Parses a DSN string
    ///
    /// # Errors
    ///
    /// Returns a `DriverError` with the message `invalid data source name`
    /// when the driver prefix is missing or a parameter has no `=`.
    pub fn parse(dsn: &str) -> std::result::Result<Self, DriverError> {
        let invalid = || DriverError::new(format!("invalid data source name: '{}'", dsn));

        let (driver, rest) = dsn.split_once(':').ok_or_else(invalid)?;
        let driver = driver.trim();
        if driver.is_empty() {
            return Err(invalid());
        }

        let mut parsed = Dsn::new(driver);
        for pair in rest.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(invalid)?;
            parsed = parsed.with(key.trim(), value.trim());
        }
        Ok(parsed)
    }

    /// The driver prefix, e.g. `mysql`
    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// Looks up a parameter by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn host(&self) -> Option<&str> {
        self.get("host")
    }

    /// The `port` parameter, `Ok(None)` if absent
    pub fn port(&self) -> std::result::Result<Option<u16>, DriverError> {
        self.get("port")
            .map(|raw| {
                raw.parse::<u16>().map_err(|e| {
                    DriverError::with_source(
                        format!("invalid port '{}' in data source name", raw),
                        e,
                    )
                })
            })
            .transpose()
    }

    pub fn charset(&self) -> Option<&str> {
        self.get("charset")
    }

    pub fn dbname(&self) -> Option<&str> {
        self.get("dbname")
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.driver)?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

impl FromStr for Dsn {
    type Err = DriverError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Dsn::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_dsn_shape() {
        let dsn = Dsn::for_database("shop");
        assert_eq!(
            dsn.to_string(),
            "mysql:host=database;port=3306;charset=utf8mb4;dbname=shop"
        );
        assert_eq!(dsn.port().unwrap(), Some(3306));
    }

    #[test]
    fn test_parse_matches_display() {
        let raw = "mysql:host=database;port=3306;charset=utf8mb4;dbname=shop";
        let dsn: Dsn = raw.parse().unwrap();
        assert_eq!(dsn, Dsn::for_database("shop"));
        assert_eq!(dsn.to_string(), raw);
    }

    #[test]
    fn test_parse_trims_and_skips_empty_pairs() {
        let dsn = Dsn::parse("sqlite: dbname = /tmp/app.db ;;").unwrap();
        assert_eq!(dsn.driver(), "sqlite");
        assert_eq!(dsn.dbname(), Some("/tmp/app.db"));
        assert_eq!(dsn.host(), None);
    }

    #[test]
    fn test_invalid_dsn() {
        for raw in ["no-colon-here", ":dbname=x", "mysql:host"] {
            let err = Dsn::parse(raw).unwrap_err();
            assert!(err.message().contains("invalid data source name"), "{}", raw);
        }
    }

    #[test]
    fn test_invalid_port() {
        let dsn = Dsn::new("mysql").with("port", "eighty");
        assert!(dsn.port().unwrap_err().message().contains("invalid port"));
    }

    #[test]
    fn test_with_replaces_existing_key() {
        let dsn = Dsn::for_database("a").with("dbname", "b");
        assert_eq!(dsn.dbname(), Some("b"));
        assert!(dsn.to_string().ends_with(";dbname=b"));
    }
}
