//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Envelope, Error,
    auth::UserID,
    db::lock_connection,
    envelope::ApiJson,
    transaction::{Transaction, TransactionForm, core::create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new transaction owned by the current user.
///
/// Responds with 201 and the stored transaction, including its new ID.
///
/// # Errors
///
/// Returns an [Error::MissingFields] or [Error::Validation] if the body does
/// not describe a valid transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<(StatusCode, Envelope<Transaction>), Error> {
    let builder = form.validate()?;
    let transaction =
        create_transaction(user_id, builder, &*lock_connection(&state.db_connection)?)?;
    tracing::debug!("User {user_id} created transaction {}", transaction.id);

    Ok((
        StatusCode::CREATED,
        Envelope::data(transaction).with_message("Transaction Created"),
    ))
}

#[cfg(test)]
mod create_transaction_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        Envelope, Error, endpoints,
        test_utils::{log_in_new_user, test_server, test_state},
        transaction::{Transaction, count_transactions},
    };

    #[tokio::test]
    async fn can_create_transaction() {
        let state = test_state();
        let server = test_server(&state);
        let cookie = log_in_new_user(&server, "alice@example.com").await;

        let response = server
            .post(endpoints::ADD_TRANSACTION)
            .add_cookie(cookie)
            .json(&json!({
                "amount": 12.5,
                "category": "Food",
                "reference": "INV-1",
                "description": "Lunch",
                "date": "2025-06-01"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let envelope = response.json::<Envelope<Transaction>>();
        assert!(envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("Transaction Created"));
        let transaction = envelope.data.unwrap();
        assert!(transaction.id > 0);
        assert_eq!(transaction.amount, 12.5);
        assert_eq!(transaction.category, "Food");
        assert_eq!(transaction.reference.as_deref(), Some("INV-1"));
        assert_eq!(transaction.description, "Lunch");
        assert_eq!(transaction.date, "2025-06-01");
    }

    #[tokio::test]
    async fn owner_comes_from_session_not_body() {
        let state = test_state();
        let server = test_server(&state);
        let cookie = log_in_new_user(&server, "alice@example.com").await;

        let response = server
            .post(endpoints::ADD_TRANSACTION)
            .add_cookie(cookie)
            .json(&json!({
                "userId": 999,
                "user_id": 999,
                "amount": 1,
                "category": "Food",
                "description": "Snack",
                "date": "2025-06-01"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction = response.json::<Envelope<Transaction>>().data.unwrap();
        assert_ne!(transaction.user_id.as_i64(), 999);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_without_insert() {
        let state = test_state();
        let server = test_server(&state);
        let cookie = log_in_new_user(&server, "alice@example.com").await;

        let response = server
            .post(endpoints::ADD_TRANSACTION)
            .add_cookie(cookie)
            .json(&json!({"amount": 12.5, "category": "Food", "date": "2025-06-01"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let envelope = response.json::<Envelope<()>>();
        assert!(!envelope.success);
        assert_eq!(
            envelope.error,
            Some(Error::MissingFields(vec!["description"]).to_string())
        );
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection), Ok(0));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let state = test_state();
        let server = test_server(&state);
        let cookie = log_in_new_user(&server, "alice@example.com").await;

        let response = server
            .post(endpoints::ADD_TRANSACTION)
            .add_cookie(cookie)
            .content_type("application/json")
            .text(r#"{"amount": 12.5,"#)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(!response.json::<Envelope<()>>().success);
    }

    #[tokio::test]
    async fn create_requires_log_in() {
        let state = test_state();
        let server = test_server(&state);

        let response = server
            .post(endpoints::ADD_TRANSACTION)
            .json(&json!({
                "amount": 12.5,
                "category": "Food",
                "description": "Lunch",
                "date": "2025-06-01"
            }))
            .await;

        response.assert_status_unauthorized();
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection), Ok(0));
    }
}
