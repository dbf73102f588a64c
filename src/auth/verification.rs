//! Routes for verifying that a user owns their email address.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Envelope, Error, Mail, Mailer,
    auth::{
        UserID, get_user_by_id,
        otp::{OtpPurpose, issue_otp, redeem_otp},
        set_user_verified,
    },
    db::lock_connection,
    envelope::{ApiJson, RequiredFields},
};

/// The state needed to issue and check one-time codes.
#[derive(Debug, Clone)]
pub struct OtpState {
    /// The database connection for storing codes and users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Delivers the codes to users.
    pub mailer: Arc<dyn Mailer>,
}

impl FromRef<AppState> for OtpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            mailer: state.mailer.clone(),
        }
    }
}

/// Mail a new account verification code to the current user.
///
/// # Errors
///
/// Returns an [Error::AlreadyVerified] if the account is already verified,
/// or an [Error::MailError] if the code could not be sent.
pub async fn send_verify_otp(
    State(state): State<OtpState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Envelope<()>, Error> {
    let (user, code) = {
        let connection = lock_connection(&state.db_connection)?;
        let user = get_user_by_id(user_id, &connection)?;

        if user.is_verified {
            return Err(Error::AlreadyVerified);
        }

        let code = issue_otp(
            user_id,
            OtpPurpose::VerifyAccount,
            OffsetDateTime::now_utc(),
            &connection,
        )?;

        (user, code)
    };

    state.mailer.send(Mail {
        to: user.email,
        subject: "Account verification code".to_owned(),
        body: format!(
            "Your verification code is {code}. It expires in {} hours.",
            OtpPurpose::VerifyAccount.lifetime().whole_hours()
        ),
    })?;

    Ok(Envelope::message("Verification code sent to your email"))
}

/// The code the user received by mail.
#[derive(Clone, Serialize, Deserialize)]
pub struct VerifyAccountForm {
    /// The six digit one-time code.
    pub otp: Option<String>,
}

/// Mark the current user's account as verified if the code matches.
///
/// # Errors
///
/// - [Error::MissingFields] if the code is blank.
/// - [Error::AlreadyVerified] if the account is already verified.
/// - [Error::InvalidOtp] if the code does not match, or [Error::OtpExpired]
///   if it matched but expired.
pub async fn verify_account(
    State(state): State<OtpState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<VerifyAccountForm>,
) -> Result<Envelope<()>, Error> {
    let mut required = RequiredFields::default();
    let otp = required.take("otp", &form.otp);
    required.check()?;

    let connection = lock_connection(&state.db_connection)?;
    if get_user_by_id(user_id, &connection)?.is_verified {
        return Err(Error::AlreadyVerified);
    }

    redeem_otp(
        user_id,
        OtpPurpose::VerifyAccount,
        otp,
        OffsetDateTime::now_utc(),
        &connection,
    )?;
    set_user_verified(user_id, &connection)?;
    tracing::info!("User {user_id} verified their account");

    Ok(Envelope::message("Account verified successfully"))
}

/// Confirms the caller is logged in with a verified account.
///
/// The checks are done by the auth and verification middleware, so reaching
/// this handler is the success case.
pub async fn is_authenticated() -> Envelope<()> {
    Envelope::ok()
}
