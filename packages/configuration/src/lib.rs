//! Configuration for the Bittrack tracker.
//!
//! The configuration is a flat TOML file. Every key has a default, so an
//! empty file (or no file at all) gives a working local tracker:
//!
//! ```toml
//! log_level = "info"
//! bind_address = "0.0.0.0:6969"
//! announce_interval = 60
//! compact_default = false
//! created_by = "bittrack"
//!
//! [database]
//! driver = "sqlite3"
//! path = "./storage/bittrack.db"
//! ```
//!
//! The file location comes from the `-c` command line flag, falling back to
//! the `BITTRACK_CONFIG_TOML_PATH` environment variable.
use std::env;
use std::panic::Location;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The `config.toml` file location environment variable.
pub const ENV_VAR_CONFIG_TOML_PATH: &str = "BITTRACK_CONFIG_TOML_PATH";

/// The policy the tracker announces to clients: how often they should come
/// back. A peer whose announce is older than twice this interval is treated
/// as gone.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct AnnouncePolicy {
    /// Interval in seconds that clients should wait between regular announce
    /// requests.
    #[serde(default = "AnnouncePolicy::default_interval")]
    pub interval: u32,
}

impl AnnouncePolicy {
    #[must_use]
    pub fn new(interval: u32) -> Self {
        Self { interval }
    }

    fn default_interval() -> u32 {
        60
    }
}

impl Default for AnnouncePolicy {
    fn default() -> Self {
        Self::new(Self::default_interval())
    }
}

/// The database driver the persistence layer should use.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    Sqlite3,
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Driver::Sqlite3 => write!(f, "sqlite3"),
        }
    }
}

/// Database connection settings.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Database {
    #[serde(default = "Database::default_driver")]
    pub driver: Driver,
    /// Driver-specific connection target. For `sqlite3` it is the database
    /// file path.
    #[serde(default = "Database::default_path")]
    pub path: String,
}

impl Database {
    fn default_driver() -> Driver {
        Driver::Sqlite3
    }

    fn default_path() -> String {
        "./storage/bittrack.db".to_string()
    }
}

impl Default for Database {
    fn default() -> Self {
        Self {
            driver: Self::default_driver(),
            path: Self::default_path(),
        }
    }
}

/// The whole tracker configuration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Configuration {
    /// Logging threshold: `off`, `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// The socket address the HTTP tracker binds to.
    #[serde(default = "Configuration::default_bind_address")]
    pub bind_address: String,

    /// IP to record for announcing peers when the request does not carry an
    /// `ip` param. When unset, the connection's remote address is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ip: Option<String>,

    /// Whether announce responses use the compact peer format when the
    /// client does not ask for one explicitly.
    #[serde(default)]
    pub compact_default: bool,

    /// Value stamped into the `created by` field of published torrents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default)]
    pub announce_policy: AnnouncePolicy,

    #[serde(default)]
    pub database: Database,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            log_level: None,
            bind_address: Self::default_bind_address(),
            database: Database::default(),
            announce_policy: AnnouncePolicy::default(),
            default_ip: None,
            compact_default: false,
            created_by: None,
        }
    }
}

impl Configuration {
    fn default_bind_address() -> String {
        "0.0.0.0:6969".to_string()
    }

    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Will return an [`enum@Error`] if the file cannot be read or does not
    /// parse as a configuration.
    pub fn load_from_file(path: &str) -> Result<Configuration, Error> {
        let toml = std::fs::read_to_string(path).map_err(|err| Error::UnableToReadFile {
            location: Location::caller(),
            path: path.to_owned(),
            source: err,
        })?;
        Self::load_from_toml(&toml)
    }

    /// Parses the configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Will return an [`enum@Error`] if the TOML does not parse as a
    /// configuration.
    pub fn load_from_toml(toml: &str) -> Result<Configuration, Error> {
        toml::from_str(toml).map_err(|err| Error::UnableToParse {
            location: Location::caller(),
            source: err,
        })
    }

    /// Resolves the config file location: the explicit path when given, else
    /// the `BITTRACK_CONFIG_TOML_PATH` environment variable, else none (the
    /// defaults apply).
    #[must_use]
    pub fn resolve_path(explicit: Option<String>) -> Option<String> {
        explicit.or_else(|| env::var(ENV_VAR_CONFIG_TOML_PATH).ok())
    }
}

/// Errors loading the configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unable to read config file {path}: {source} in {location}")]
    UnableToReadFile {
        location: &'static Location<'static>,
        path: String,
        source: std::io::Error,
    },
    #[error("unable to parse config: {source} in {location}")]
    UnableToParse {
        location: &'static Location<'static>,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use crate::{Configuration, Driver};

    #[test]
    fn it_should_have_a_working_default_configuration() {
        let configuration = Configuration::default();

        assert_eq!(configuration.bind_address, "0.0.0.0:6969");
        assert_eq!(configuration.announce_policy.interval, 60);
        assert_eq!(configuration.database.driver, Driver::Sqlite3);
        assert!(!configuration.compact_default);
        assert!(configuration.default_ip.is_none());
    }

    #[test]
    fn it_should_load_a_partial_toml_file_using_defaults_for_the_rest() {
        let configuration = Configuration::load_from_toml(
            r#"
            announce_policy = { interval = 120 }
            default_ip = "192.0.2.1"

            [database]
            path = "/tmp/tracker.db"
            "#,
        )
        .unwrap();

        assert_eq!(configuration.announce_policy.interval, 120);
        assert_eq!(configuration.default_ip.as_deref(), Some("192.0.2.1"));
        assert_eq!(configuration.database.path, "/tmp/tracker.db");
        assert_eq!(configuration.bind_address, "0.0.0.0:6969");
    }

    #[test]
    fn it_should_fail_loading_an_invalid_toml_file() {
        assert!(Configuration::load_from_toml("announce_policy = 7").is_err());
    }

    #[test]
    fn it_should_serialize_back_to_toml() {
        let configuration = Configuration::default();

        let toml = toml::to_string(&configuration).unwrap();

        assert!(toml.contains("bind_address"));
    }
}
