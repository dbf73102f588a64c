#![allow(missing_docs)]

use std::sync::Arc;

use axum_extra::extract::cookie::Cookie;
use axum_test::{TestResponse, TestServer};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Envelope, Mail, build_router,
    auth::{COOKIE_TOKEN, get_user_by_email, set_user_verified},
    endpoints,
    mailer::RecordingMailer,
    transaction::Transaction,
};

/// A password strong enough to pass registration.
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// App state backed by an in-memory database and a low bcrypt cost.
pub(crate) fn test_state() -> AppState {
    test_state_with_mailer().0
}

/// Same as [test_state], also returning the mailer so tests can read sent codes.
pub(crate) fn test_state_with_mailer() -> (AppState, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let conn = Connection::open_in_memory().expect("Could not open database in memory.");
    let state = AppState::new(conn, "foobar", mailer.clone())
        .expect("Could not create app state.")
        .with_password_cost(4);

    (state, mailer)
}

pub(crate) fn test_server(state: &AppState) -> TestServer {
    TestServer::new(build_router(state.clone()))
}

pub(crate) async fn register_user_request(
    server: &TestServer,
    name: &str,
    email: &str,
    password: &str,
) -> TestResponse {
    server
        .post(endpoints::REGISTER)
        .json(&json!({"name": name, "email": email, "password": password}))
        .await
}

/// Register a user with [TEST_PASSWORD] and return their auth cookie.
pub(crate) async fn log_in_new_user(server: &TestServer, email: &str) -> Cookie<'static> {
    let response = register_user_request(server, "Test User", email, TEST_PASSWORD).await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.cookie(COOKIE_TOKEN)
}

#[track_caller]
pub(crate) fn verify_user(state: &AppState, email: &str) {
    let connection = state.db_connection.lock().unwrap();
    let user = get_user_by_email(email, &connection).expect("Could not find user.");
    set_user_verified(user.id, &connection).expect("Could not verify user.");
}

/// Create a transaction dated `date` for the user with `cookie`.
pub(crate) async fn add_transaction_request(
    server: &TestServer,
    cookie: &Cookie<'static>,
    date: &str,
    amount: f64,
) -> Transaction {
    server
        .post(endpoints::ADD_TRANSACTION)
        .add_cookie(cookie.clone())
        .json(&json!({
            "amount": amount,
            "category": "Food",
            "description": "Groceries",
            "date": date
        }))
        .await
        .json::<Envelope<Transaction>>()
        .data
        .expect("Could not create transaction.")
}

/// The first six digit code in the body of `mail`.
#[track_caller]
pub(crate) fn otp_from_mail(mail: &Mail) -> String {
    mail.body
        .as_bytes()
        .windows(6)
        .find(|window| window.iter().all(u8::is_ascii_digit))
        .map(|digits| String::from_utf8_lossy(digits).to_string())
        .expect("Mail does not contain a code.")
}
