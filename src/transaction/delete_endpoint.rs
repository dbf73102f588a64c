//! Defines the endpoint for deleting a transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Envelope, Error,
    auth::UserID,
    database_id::TransactionId,
    db::lock_connection,
    envelope::ApiPath,
    transaction::core::get_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting one of the current user's transactions.
///
/// # Errors
///
/// Returns an [Error::DeleteMissingTransaction] if the current user has no
/// transaction with the ID.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
) -> Result<Envelope<()>, Error> {
    delete_transaction(
        user_id,
        transaction_id,
        &*lock_connection(&state.db_connection)?,
    )?;
    tracing::debug!("User {user_id} deleted transaction {transaction_id}");

    Ok(Envelope::message("Transaction deleted successfully"))
}

/// Delete the transaction `id` owned by `user_id`.
///
/// The transaction is looked up before it is deleted. A transaction owned by
/// another user is treated as missing.
///
/// # Errors
///
/// Returns an [Error::DeleteMissingTransaction] if the transaction does not
/// exist or nothing was deleted, or an [Error::SqlError] on other SQL errors.
pub(crate) fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    match get_transaction(id, connection) {
        Ok(transaction) if transaction.user_id == user_id => {}
        Ok(_) | Err(Error::NotFound) => return Err(Error::DeleteMissingTransaction),
        Err(error) => return Err(error),
    }

    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}
