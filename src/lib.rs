//! Expensave is a web service for tracking personal expenses.
//!
//! This library provides a JSON REST API for registering, authenticating and
//! verifying users, and for managing each user's transactions. The [client]
//! module holds the client-side data layer: an explicit session object and pure
//! functions that summarise a user's spending for dashboards and tables.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
pub mod client;
mod database_id;
mod db;
pub mod endpoints;
mod envelope;
mod logging;
mod mailer;
mod not_found;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, create_cookie_key};
pub use auth::{
    PasswordHash, Profile, User, UserData, UserID, ValidatedPassword, create_user,
    get_user_by_email, set_user_verified, update_password,
};
pub use database_id::TransactionId;
pub use db::initialize as initialize_db;
pub use envelope::Envelope;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use mailer::{LogMailer, Mail, Mailer};
pub use routing::build_router;
pub use timezone::{get_local_offset, local_today};
pub use transaction::{
    AmountInput, Transaction, TransactionBuilder, TransactionForm, create_transaction,
    list_transactions,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more required fields were missing or blank in the request body.
    ///
    /// Holds the names of the missing fields in the order they are declared.
    #[error("Please provide all required fields (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A field was present but its value could not be accepted.
    #[error("{0}")]
    Validation(String),

    /// The request body could not be parsed, e.g. malformed JSON or the wrong
    /// content type.
    #[error("invalid request: {0}")]
    InvalidBody(String),

    /// The request did not carry a valid, unexpired auth cookie.
    #[error("Not authorized, log in again")]
    Unauthorized,

    /// The email and password combination did not match a registered user.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The caller is logged in but has not verified their email address yet.
    #[error("Account is not verified")]
    NotVerified,

    /// The caller asked to verify an account that is already verified.
    #[error("Account is already verified")]
    AlreadyVerified,

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// Another user has already registered with the email address.
    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The one-time code did not match the one issued to the user, or no code
    /// has been issued.
    #[error("Invalid OTP")]
    InvalidOtp,

    /// The one-time code matched but it has expired.
    #[error("OTP expired")]
    OtpExpired,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("The requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist for the caller.
    #[error("Transaction not found")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist for the caller.
    #[error("Transaction not found")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The auth cookie could not be created.
    #[error("could not create the auth cookie: {0}")]
    CookieError(String),

    /// The mailer could not send a message.
    #[error("could not send mail: {0}")]
    MailError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}

impl Error {
    /// The HTTP status code that the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFields(_)
            | Error::Validation(_)
            | Error::InvalidBody(_)
            | Error::AlreadyVerified
            | Error::InvalidEmail(_)
            | Error::TooWeak(_)
            | Error::InvalidOtp
            | Error::OtpExpired => StatusCode::BAD_REQUEST,
            Error::Unauthorized | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::NotVerified => StatusCode::FORBIDDEN,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::CookieError(_)
            | Error::MailError(_)
            | Error::InvalidTimezone(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                Some(ref desc),
            ) if desc.ends_with("user.email") => Error::DuplicateEmail,
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidBody(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal errors are not intended to be shown to the client.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Envelope::<()>::error(&message)).into_response()
    }
}
