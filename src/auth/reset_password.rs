//! Routes for resetting a forgotten password with a mailed one-time code.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Envelope, Error, Mail, Mailer,
    auth::{
        PasswordHash, ValidatedPassword, get_user_by_email,
        otp::{OtpPurpose, issue_otp, redeem_otp},
        update_password,
    },
    db::lock_connection,
    envelope::{ApiJson, RequiredFields},
};

/// The state needed to reset passwords.
#[derive(Debug, Clone)]
pub struct PasswordResetState {
    /// The database connection for storing codes and users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Delivers the codes to users.
    pub mailer: Arc<dyn Mailer>,
    /// The bcrypt cost used when hashing the new password.
    pub password_cost: u32,
}

impl FromRef<AppState> for PasswordResetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            mailer: state.mailer.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The account to send a reset code to.
#[derive(Clone, Serialize, Deserialize)]
pub struct SendResetOtpForm {
    /// The email address of the account.
    pub email: Option<String>,
}

/// Mail a password reset code to the user registered with the given email.
///
/// # Errors
///
/// Returns an [Error::NotFound] if no user has the email address, or an
/// [Error::MailError] if the code could not be sent.
pub async fn send_reset_otp(
    State(state): State<PasswordResetState>,
    ApiJson(form): ApiJson<SendResetOtpForm>,
) -> Result<Envelope<()>, Error> {
    let mut required = RequiredFields::default();
    let email = required.take("email", &form.email);
    required.check()?;

    let (user, code) = {
        let connection = lock_connection(&state.db_connection)?;
        let user = get_user_by_email(email, &connection)?;
        let code = issue_otp(
            user.id,
            OtpPurpose::ResetPassword,
            OffsetDateTime::now_utc(),
            &connection,
        )?;

        (user, code)
    };

    state.mailer.send(Mail {
        to: user.email,
        subject: "Password reset code".to_owned(),
        body: format!(
            "Your password reset code is {code}. It expires in {} minutes.",
            OtpPurpose::ResetPassword.lifetime().whole_minutes()
        ),
    })?;

    Ok(Envelope::message("Password reset code sent to your email"))
}

/// The details needed to set a new password.
#[derive(Clone, Serialize, Deserialize)]
pub struct ResetPasswordForm {
    /// The email address of the account.
    pub email: Option<String>,
    /// The code the user received by mail.
    pub otp: Option<String>,
    /// The plain text replacement password.
    pub new_password: Option<String>,
}

/// Replace a user's password if the reset code matches.
///
/// The new password is checked for strength before the code is used up, so a
/// weak password can be retried with the same code.
///
/// # Errors
///
/// - [Error::MissingFields] if any of the fields are blank.
/// - [Error::NotFound] if no user has the email address.
/// - [Error::TooWeak] if the new password is easy to guess.
/// - [Error::InvalidOtp] or [Error::OtpExpired] if the code is not accepted.
pub async fn reset_password(
    State(state): State<PasswordResetState>,
    ApiJson(form): ApiJson<ResetPasswordForm>,
) -> Result<Envelope<()>, Error> {
    let mut required = RequiredFields::default();
    let email = required.take("email", &form.email);
    let otp = required.take("otp", &form.otp);
    let new_password = required.take_secret("new_password", &form.new_password);
    required.check()?;

    let user = get_user_by_email(email, &*lock_connection(&state.db_connection)?)?;
    let new_password = ValidatedPassword::new(new_password, &[&user.name, &user.email])?;
    let password_hash = PasswordHash::new(new_password, state.password_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    redeem_otp(
        user.id,
        OtpPurpose::ResetPassword,
        otp,
        OffsetDateTime::now_utc(),
        &connection,
    )?;
    update_password(user.id, &password_hash, &connection)?;
    tracing::info!("User {} reset their password", user.id);

    Ok(Envelope::message("Password has been reset successfully"))
}
