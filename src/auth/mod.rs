//! User accounts and the cookie based auth gate.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod otp;
mod password;
mod profile;
mod register;
mod reset_password;
mod token;
mod user;
mod verification;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::{auth_guard, verified_guard};
pub use otp::create_otp_table;
pub use password::{PasswordHash, ValidatedPassword};
pub use profile::{Profile, UserData, get_profile, get_user_data, update_profile};
pub use register::register_user;
pub use reset_password::{reset_password, send_reset_otp};
pub use user::{
    User, UserID, create_user, create_user_table, get_user_by_email, get_user_by_id,
    set_user_verified, update_password,
};
pub use verification::{is_authenticated, send_verify_otp, verify_account};

pub(crate) use token::Token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
