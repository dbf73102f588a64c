//! One-time codes for account verification and password resets.

use rand::Rng;
use rusqlite::{Connection, OptionalExtension};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID};

/// What a one-time code may be used for.
///
/// A user holds at most one pending code per purpose. Issuing a new code
/// replaces the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OtpPurpose {
    /// Confirms the user owns their email address.
    VerifyAccount,
    /// Authorises setting a new password without logging in.
    ResetPassword,
}

impl OtpPurpose {
    fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::VerifyAccount => "verify_account",
            OtpPurpose::ResetPassword => "reset_password",
        }
    }

    /// How long a code stays valid after it is issued.
    pub(crate) fn lifetime(&self) -> Duration {
        match self {
            OtpPurpose::VerifyAccount => Duration::hours(24),
            OtpPurpose::ResetPassword => Duration::minutes(15),
        }
    }
}

/// Create the table for pending one-time codes.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_otp_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS otp (
                user_id INTEGER NOT NULL,
                purpose TEXT NOT NULL,
                code TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, purpose),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// A random six digit code.
fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Generate a new code for `user_id`, replacing any pending code with the same purpose.
///
/// The code expires [OtpPurpose::lifetime] after `now`.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the code could not be stored.
pub(crate) fn issue_otp(
    user_id: UserID,
    purpose: OtpPurpose,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<String, Error> {
    let code = generate_code();
    let expires_at = now + purpose.lifetime();

    connection.execute(
        "INSERT OR REPLACE INTO otp (user_id, purpose, code, expires_at) VALUES (?1, ?2, ?3, ?4)",
        (
            user_id.as_i64(),
            purpose.as_str(),
            &code,
            expires_at.unix_timestamp(),
        ),
    )?;

    Ok(code)
}

/// Check `code` against the pending code for `user_id` and remove it if it matches.
///
/// # Errors
///
/// Returns an [Error::InvalidOtp] if no code is pending or `code` does not
/// match, and an [Error::OtpExpired] if the code matched but expired before `now`.
pub(crate) fn redeem_otp(
    user_id: UserID,
    purpose: OtpPurpose,
    code: &str,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let pending: Option<(String, i64)> = connection
        .query_row(
            "SELECT code, expires_at FROM otp WHERE user_id = ?1 AND purpose = ?2",
            (user_id.as_i64(), purpose.as_str()),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((pending_code, expires_at)) = pending else {
        return Err(Error::InvalidOtp);
    };

    if pending_code != code.trim() {
        return Err(Error::InvalidOtp);
    }

    if expires_at <= now.unix_timestamp() {
        return Err(Error::OtpExpired);
    }

    connection.execute(
        "DELETE FROM otp WHERE user_id = ?1 AND purpose = ?2",
        (user_id.as_i64(), purpose.as_str()),
    )?;

    Ok(())
}
