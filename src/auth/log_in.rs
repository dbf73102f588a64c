//! The route for handling log-in requests.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Envelope, Error,
    auth::{Profile, User, get_user_by_email, set_auth_cookie},
    db::lock_connection,
    envelope::{ApiJson, RequiredFields},
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw credentials sent by the client.
///
/// There is no need for validation beyond presence since they are compared
/// against the email and password in the database.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: Option<String>,
    /// Password entered during log-in.
    pub password: Option<String>,
    /// Whether to extend the initial auth cookie duration.
    #[serde(default)]
    pub remember_me: bool,
}

/// Handler for log-in requests.
///
/// On success the auth cookie is set and the user's profile is returned.
///
/// # Errors
///
/// - [Error::MissingFields] if the email or password is blank.
/// - [Error::InvalidCredentials] if the email does not belong to a registered
///   user or the password is not correct.
/// - An internal error if the password could not be verified.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    ApiJson(credentials): ApiJson<LogInData>,
) -> Result<(PrivateCookieJar, Envelope<Profile>), Error> {
    let mut required = RequiredFields::default();
    let email = required.take("email", &credentials.email);
    let password = required.take_secret("password", &credentials.password);
    required.check()?;

    let user: User = match get_user_by_email(email, &*lock_connection(&state.db_connection)?) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    let is_password_valid = user
        .password_hash
        .verify(password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        tracing::debug!("Failed log-in attempt for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let cookie_duration = if credentials.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let jar = set_auth_cookie(jar, user.id, cookie_duration)?;
    tracing::info!("User {} logged in", user.id);

    Ok((
        jar,
        Envelope::data(Profile::from(user)).with_message("Logged in successfully"),
    ))
}
