//! The shared state handed to every request handler.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, Mailer, PasswordHash, auth::DEFAULT_COOKIE_DURATION, db::initialize};

/// Everything the API handlers share.
///
/// Handlers do not take the whole state, they take a smaller state struct
/// built from it with [FromRef].
#[derive(Debug, Clone)]
pub struct AppState {
    /// Encrypts and decrypts the auth cookie.
    pub cookie_key: Key,
    /// How long a login lasts without activity, unless "remember me" was set.
    pub cookie_duration: Duration,
    /// The bcrypt cost for new password hashes.
    pub password_cost: u32,
    /// The single SQLite connection, shared behind a lock.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Sends one-time codes and notifications to users.
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Set up the tables in `db_connection` and wrap it in a new [AppState].
    ///
    /// The cookie key is derived from `cookie_secret`, so sessions survive a
    /// restart as long as the secret stays the same.
    ///
    /// # Errors
    /// Returns an error if the tables cannot be created.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            password_cost: PasswordHash::DEFAULT_COST,
            db_connection: Arc::new(Mutex::new(db_connection)),
            mailer,
        })
    }

    /// Use `duration` for sessions instead of [DEFAULT_COOKIE_DURATION].
    pub fn with_cookie_duration(mut self, duration: Duration) -> Self {
        self.cookie_duration = duration;
        self
    }

    /// Hash new passwords with bcrypt `cost` instead of [PasswordHash::DEFAULT_COST].
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the cookie key from a secret of any length.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}
