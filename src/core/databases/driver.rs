//! The factory of database drivers.
use bittrack_configuration::Driver;

use super::error::Error;
use super::sqlite::Sqlite;
use super::Database;

/// It builds a new database driver for the given configuration and creates
/// the tables if they are missing.
///
/// # Errors
///
/// Will return an [`enum@Error`] if the driver cannot connect or the schema
/// cannot be created.
pub fn build(driver: &Driver, db_path: &str) -> Result<Box<dyn Database>, Error> {
    let database: Box<dyn Database> = match driver {
        Driver::Sqlite3 => Box::new(Sqlite::new(db_path)?),
    };

    database.create_database_tables()?;

    Ok(database)
}
