//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transaction/edit-transaction/{id}', use [format_endpoint].

/// The root route, used as a health check.
pub const ROOT: &str = "/";

/// The route for creating an account.
pub const REGISTER: &str = "/api/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/auth/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/auth/logout";
/// The route that mails an account verification code to the current user.
pub const SEND_VERIFY_OTP: &str = "/api/auth/send-verify-otp";
/// The route that verifies the current user's account with a code.
pub const VERIFY_ACCOUNT: &str = "/api/auth/verify-account";
/// The route that checks the caller is logged in with a verified account.
pub const IS_AUTH: &str = "/api/auth/is-auth";
/// The route for the current user's profile.
pub const PROFILE: &str = "/api/auth/profile";
/// The route for changing the current user's display name.
pub const UPDATE_PROFILE: &str = "/api/auth/update-profile";
/// The route that mails a password reset code.
pub const SEND_RESET_OTP: &str = "/api/auth/send-reset-otp";
/// The route for setting a new password with a reset code.
pub const RESET_PASSWORD: &str = "/api/auth/reset-password";
/// The route for the session data the client loads at start up.
pub const USER_DATA: &str = "/api/user/data";

/// The route to create a transaction.
pub const ADD_TRANSACTION: &str = "/api/transaction/add-transaction";
/// The route to list the current user's transactions.
pub const GET_TRANSACTIONS: &str = "/api/transaction/get-transaction";
/// The route to replace a transaction.
pub const EDIT_TRANSACTION: &str = "/api/transaction/edit-transaction/{transaction_id}";
/// The route to delete a transaction.
pub const DELETE_TRANSACTION: &str = "/api/transaction/delete-transaction/{transaction_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
