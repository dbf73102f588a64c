//! The uniform JSON response body and the extractors that reject into it.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The wrapper used for every response body sent by the API.
///
/// Successful responses set `success` and carry `data` and/or a `message`.
/// Failed responses clear `success` and carry an `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// The payload of a successful response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// A human readable description of what happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// A human readable description of why the request failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// A successful response carrying `data`.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    /// Attach a message to the envelope.
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }
}

impl Envelope<()> {
    /// A successful response with no payload.
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            error: None,
        }
    }

    /// A successful response carrying only a message.
    pub fn message(message: &str) -> Self {
        Self::ok().with_message(message)
    }

    /// A failed response.
    pub fn error(error: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.to_owned()),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// A JSON body extractor that rejects with an [Error] envelope instead of axum's
/// plain text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// A path parameter extractor that rejects with an [Error] envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct ApiPath<T>(pub T);

/// Collects the names of required request fields that were absent or blank.
///
/// ```ignore
/// let mut required = RequiredFields::default();
/// let email = required.take("email", &form.email);
/// required.check()?;
/// ```
#[derive(Debug, Default)]
pub(crate) struct RequiredFields {
    missing: Vec<&'static str>,
}

impl RequiredFields {
    /// The trimmed value of a required field, or an empty string if it is
    /// missing, in which case `name` is recorded.
    pub(crate) fn take<'a>(&mut self, name: &'static str, value: &'a Option<String>) -> &'a str {
        match value.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => {
                self.missing.push(name);
                ""
            }
        }
    }

    /// Like [RequiredFields::take] but returns the value untouched, for
    /// secrets such as passwords where whitespace is significant.
    pub(crate) fn take_secret<'a>(
        &mut self,
        name: &'static str,
        value: &'a Option<String>,
    ) -> &'a str {
        match value.as_deref() {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                self.missing.push(name);
                ""
            }
        }
    }

    /// Record `name` as missing when `is_missing` holds.
    pub(crate) fn require(&mut self, name: &'static str, is_missing: bool) {
        if is_missing {
            self.missing.push(name);
        }
    }

    /// # Errors
    ///
    /// Returns an [Error::MissingFields] listing every field recorded as missing.
    pub(crate) fn check(self) -> Result<(), Error> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingFields(self.missing))
        }
    }
}
