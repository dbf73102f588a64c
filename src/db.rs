//! Database setup and access to the shared connection.

use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{
    Error,
    auth::{create_otp_table, create_user_table},
    transaction::create_transaction_table,
};

/// Create the tables for the domain models if they do not exist.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    create_user_table(connection)?;
    create_otp_table(connection)?;
    create_transaction_table(connection)?;

    Ok(())
}

/// Acquire the lock on the shared database connection.
///
/// # Errors
/// Returns an [Error::DatabaseLockError] if the lock is poisoned.
pub(crate) fn lock_connection(
    connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
