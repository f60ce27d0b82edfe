//! Database errors.
//!
//! Driver-level failures are mapped into this error type together with the
//! driver that produced them and the code location that observed them.
use std::panic::Location;

use bittrack_configuration::Driver;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The pool could not hand out a connection, even after the one
    /// reconnect the driver attempts per call.
    #[error("connection to the {driver} database was lost: {message} in {location}")]
    ConnectionLost {
        driver: Driver,
        message: String,
        location: &'static Location<'static>,
    },

    /// A query failed to prepare or execute.
    #[error("{driver} query failed: {message} in {location}")]
    Query {
        driver: Driver,
        message: String,
        location: &'static Location<'static>,
    },

    /// An insert or upsert affected no rows.
    #[error("insert into the {driver} database failed in {location}")]
    InsertFailed {
        driver: Driver,
        location: &'static Location<'static>,
    },

    /// A stored row does not round-trip into its domain type (bad packed
    /// IP, unknown status value, corrupt serialized list).
    #[error("stored {driver} row is corrupt: {message} in {location}")]
    CorruptRow {
        driver: Driver,
        message: String,
        location: &'static Location<'static>,
    },
}

impl From<(r2d2_sqlite::rusqlite::Error, Driver)> for Error {
    #[track_caller]
    fn from((err, driver): (r2d2_sqlite::rusqlite::Error, Driver)) -> Self {
        Error::Query {
            driver,
            message: err.to_string(),
            location: Location::caller(),
        }
    }
}

impl From<(r2d2::Error, Driver)> for Error {
    #[track_caller]
    fn from((err, driver): (r2d2::Error, Driver)) -> Self {
        Error::ConnectionLost {
            driver,
            message: err.to_string(),
            location: Location::caller(),
        }
    }
}
