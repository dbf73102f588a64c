//! The fallback handler for routes that do not exist.

use axum::response::{IntoResponse, Response};

use crate::Error;

/// Respond with a 404 envelope.
pub async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
