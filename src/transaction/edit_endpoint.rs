//! Defines the endpoint for replacing the fields of an existing transaction.
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
    envelope::{ApiJson, ApiPath},
    transaction::{Transaction, TransactionBuilder, TransactionForm, core::map_transaction_row},
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that replaces the editable fields of one of the current
/// user's transactions and responds with the updated transaction.
///
/// # Errors
///
/// - [Error::MissingFields] or [Error::Validation] if the body does not
///   describe a valid transaction.
/// - [Error::UpdateMissingTransaction] if the current user has no
///   transaction with the ID.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<Envelope<Transaction>, Error> {
    let builder = form.validate()?;
    let transaction = update_transaction(
        user_id,
        transaction_id,
        &builder,
        &*lock_connection(&state.db_connection)?,
    )?;

    Ok(Envelope::data(transaction).with_message("Transaction updated successfully"))
}

/// Replace the amount, category, reference, description and date of the
/// transaction `id` owned by `user_id`.
///
/// # Errors
///
/// Returns an [Error::UpdateMissingTransaction] if no such transaction
/// exists, or an [Error::SqlError] if there is some other SQL error.
pub(crate) fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    builder: &TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "UPDATE \"transaction\"
             SET amount = ?1, category = ?2, reference = ?3, description = ?4, date = ?5
             WHERE id = ?6 AND user_id = ?7
             RETURNING id, user_id, amount, category, reference, description, date",
        )?
        .query_row(
            (
                builder.amount,
                &builder.category,
                &builder.reference,
                &builder.description,
                &builder.date,
                id,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}


#[cfg(test)]
mod edit_transaction_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        Envelope, Error,
        endpoints::{self, format_endpoint},
        test_utils::{add_transaction_request, log_in_new_user, test_server, test_state},
        transaction::Transaction,
    };

    #[tokio::test]
    async fn edit_replaces_transaction() {
        let state = test_state();
        let server = test_server(&state);
        let cookie = log_in_new_user(&server, "alice@example.com").await;
        let created = add_transaction_request(&server, &cookie, "2025-01-01", 10.0).await;

        let response = server
            .put(&format_endpoint(endpoints::EDIT_TRANSACTION, created.id))
            .add_cookie(cookie)
            .json(&json!({
                "amount": "20",
                "category": "Bills",
                "description": "Power",
                "date": "2025-01-05"
            }))
            .await;

        response.assert_status_ok();
        let envelope = response.json::<Envelope<Transaction>>();
        assert_eq!(
            envelope.message.as_deref(),
            Some("Transaction updated successfully")
        );
        let updated = envelope.data.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.user_id, created.user_id);
        assert_eq!(updated.amount, 20.0);
        assert_eq!(updated.category, "Bills");
        assert_eq!(updated.date, "2025-01-05");
    }

    #[tokio::test]
    async fn edit_missing_transaction_is_not_found() {
        let state = test_state();
        let server = test_server(&state);
        let cookie = log_in_new_user(&server, "alice@example.com").await;

        let response = server
            .put(&format_endpoint(endpoints::EDIT_TRANSACTION, 1337))
            .add_cookie(cookie)
            .json(&json!({
                "amount": 20,
                "category": "Bills",
                "description": "Power",
                "date": "2025-01-05"
            }))
            .await;

        response.assert_status_not_found();
        assert_eq!(
            response.json::<Envelope<()>>().error.as_deref(),
            Some("Transaction not found")
        );
    }

    #[tokio::test]
    async fn edit_other_users_transaction_is_not_found() {
        let state = test_state();
        let server = test_server(&state);
        let alice = log_in_new_user(&server, "alice@example.com").await;
        let bob = log_in_new_user(&server, "bob@example.com").await;
        let created = add_transaction_request(&server, &alice, "2025-01-01", 10.0).await;

        server
            .put(&format_endpoint(endpoints::EDIT_TRANSACTION, created.id))
            .add_cookie(bob)
            .json(&json!({
                "amount": 20,
                "category": "Bills",
                "description": "Power",
                "date": "2025-01-05"
            }))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn edit_with_missing_fields_is_bad_request() {
        let state = test_state();
        let server = test_server(&state);
        let cookie = log_in_new_user(&server, "alice@example.com").await;
        let created = add_transaction_request(&server, &cookie, "2025-01-01", 10.0).await;

        let response = server
            .put(&format_endpoint(endpoints::EDIT_TRANSACTION, created.id))
            .add_cookie(cookie)
            .json(&json!({"amount": 20, "category": "Bills"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Envelope<()>>().error,
            Some(Error::MissingFields(vec!["description", "date"]).to_string())
        );
    }

    #[tokio::test]
    async fn edit_with_non_numeric_id_is_bad_request() {
        let state = test_state();
        let server = test_server(&state);
        let cookie = log_in_new_user(&server, "alice@example.com").await;

        server
            .put("/api/transaction/edit-transaction/abc")
            .add_cookie(cookie)
            .json(&json!({
                "amount": 20,
                "category": "Bills",
                "description": "Power",
                "date": "2025-01-05"
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
