//! Defines the endpoint for listing the current user's transactions.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Envelope, Error,
    auth::UserID,
    db::lock_connection,
    transaction::{Transaction, core::list_transactions},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with every transaction owned by the current
/// user, newest date first.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Envelope<Vec<Transaction>>, Error> {
    let transactions = list_transactions(user_id, &*lock_connection(&state.db_connection)?)?;

    Ok(Envelope::data(transactions))
}
