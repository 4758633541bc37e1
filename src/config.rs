use crate::core::db::dsn::{Dsn, DEFAULT_CHARSET, DEFAULT_DRIVER, DEFAULT_HOST, DEFAULT_PORT};
use crate::core::db::options::ConnectionOptions;
use crate::core::{DbError, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Deserialize)]
pub struct Config {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub dsn: DsnConfig,
    /// Replaces the default connection options when present
    pub options: Option<ConnectionOptions>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"***")
            .field("dsn", &self.dsn)
            .field("options", &self.options)
            .finish()
    }
}

/// Parts of the data source name.
#[derive(Debug, Deserialize)]
pub struct DsnConfig {
    #[serde(default = "default_driver")]
    pub driver: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_charset")]
    pub charset: String,
    pub dbname: String,
}

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

impl DsnConfig {
    pub fn to_dsn(&self) -> Dsn {
        Dsn::new(self.driver.as_str())
            .with("host", self.host.as_str())
            .with("port", self.port.to_string())
            .with("charset", self.charset.as_str())
            .with("dbname", self.dbname.as_str())
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = dbwrap::config::load_config("dbwrap.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| DbError::Config(e.to_string()))?;
    toml::from_str(&content).map_err(|e| DbError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::options::{ErrorMode, FetchMode};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_CONFIG: &str = r#"
username = "app"
password = "secret"

[dsn]
dbname = "shop"

[options]
error_mode = "exception"
fetch_mode = "num"
emulate_prepares = false
persistent = false
"#;

    #[test]
    fn test_load_config_from_str() {
        let config: Config = toml::from_str(SAMPLE_CONFIG).expect("Failed to parse sample config");
        assert_eq!(config.username, "app");
        assert_eq!(config.password, "secret");
        assert_eq!(
            config.dsn.to_dsn().to_string(),
            "mysql:host=database;port=3306;charset=utf8mb4;dbname=shop"
        );

        let options = config.options.expect("options table");
        assert_eq!(options.error_mode, ErrorMode::Exception);
        assert_eq!(options.fetch_mode, FetchMode::Num);
        assert!(!options.persistent);
    }

    #[test]
    fn test_debug_output_hides_password() {
        let config: Config = toml::from_str(SAMPLE_CONFIG).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret"), "{}", printed);
        assert!(printed.contains("app"));
        assert!(printed.contains("shop"));
    }

    #[test]
    fn test_options_are_optional() {
        let config: Config = toml::from_str(
            r#"
[dsn]
driver = "sqlite"
dbname = ":memory:"
"#,
        )
        .unwrap();
        assert!(config.options.is_none());
        assert_eq!(config.username, "");
        assert_eq!(config.dsn.driver, "sqlite");
    }

    #[test]
    fn test_incomplete_options_table_is_an_error() {
        let err = toml::from_str::<Config>(
            r#"
[dsn]
dbname = "shop"

[options]
persistent = false
"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_CONFIG.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.dsn.dbname, "shop");

        let missing = load_config(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(DbError::Config(_))));
    }
}
