//! The route for creating a new account.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Envelope, Error, Mail, Mailer,
    auth::{PasswordHash, Profile, ValidatedPassword, create_user, set_auth_cookie},
    db::lock_connection,
    envelope::{ApiJson, RequiredFields},
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The bcrypt cost used when hashing the new password.
    pub password_cost: u32,
    /// The database connection for storing the new user.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Sends the welcome message.
    pub mailer: Arc<dyn Mailer>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            password_cost: state.password_cost,
            db_connection: state.db_connection.clone(),
            mailer: state.mailer.clone(),
        }
    }
}

impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The details sent by the client to create an account.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The name to display for the user.
    pub name: Option<String>,
    /// The address used to log in.
    pub email: Option<String>,
    /// The plain text password, checked for strength before hashing.
    pub password: Option<String>,
}

/// Create a new, unverified user and log them in.
///
/// A welcome message is mailed to the new user. Failing to send it does not
/// fail the registration.
///
/// # Errors
///
/// - [Error::MissingFields] if any of the fields are blank.
/// - [Error::InvalidEmail] if the email address is malformed.
/// - [Error::TooWeak] if the password is easy to guess.
/// - [Error::DuplicateEmail] if the email address is already registered.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    ApiJson(form): ApiJson<RegisterForm>,
) -> Result<(StatusCode, PrivateCookieJar, Envelope<Profile>), Error> {
    let mut required = RequiredFields::default();
    let name = required.take("name", &form.name);
    let email = required.take("email", &form.email);
    let password = required.take_secret("password", &form.password);
    required.check()?;

    let email =
        EmailAddress::from_str(email).map_err(|_| Error::InvalidEmail(email.to_owned()))?;
    let password = ValidatedPassword::new(password, &[name, email.as_ref()])?;
    let password_hash = PasswordHash::new(password, state.password_cost)?;

    let user = create_user(
        name,
        &email,
        password_hash,
        &*lock_connection(&state.db_connection)?,
    )?;
    tracing::info!("Registered user {}", user.id);

    let welcome = Mail {
        to: user.email.clone(),
        subject: "Welcome to Expensave".to_owned(),
        body: format!(
            "Hi {}, your account has been created with the email address {}.",
            user.name, user.email
        ),
    };
    if let Err(error) = state.mailer.send(welcome) {
        tracing::error!("Could not send welcome mail to user {}: {error}", user.id);
    }

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((
        StatusCode::CREATED,
        jar,
        Envelope::data(Profile::from(user)).with_message("Account created"),
    ))
}
