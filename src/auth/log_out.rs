//! The route for logging out the current user.

use axum_extra::extract::PrivateCookieJar;

use crate::{Envelope, auth::invalidate_auth_cookie};

/// Invalidate the auth cookie.
///
/// Succeeds even if the caller was not logged in.
pub async fn post_log_out(jar: PrivateCookieJar) -> (PrivateCookieJar, Envelope<()>) {
    (invalidate_auth_cookie(jar), Envelope::message("Logged out"))
}
