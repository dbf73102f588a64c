//! The calls the client makes to the backend.
//!
//! [SessionApi] and [TransactionApi] are the seams the client state is written
//! against, so that it can be driven by [HttpSessionApi] or by a stub in tests.

use std::future::Future;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;

use crate::{
    Envelope, Profile, Transaction, TransactionForm, TransactionId, UserData,
    endpoints::{self, format_endpoint},
};

/// The errors that may occur when calling the backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a failure envelope.
    #[error("{message} (status {status})")]
    Api {
        /// The HTTP status code of the response.
        status: u16,
        /// The error message from the envelope.
        message: String,
    },

    /// The backend reported success but left out the expected data.
    #[error("the response did not contain any data")]
    MissingData,
}

/// The calls needed to keep a [ClientSession](crate::client::ClientSession) current.
pub trait SessionApi {
    /// Succeeds if the caller is logged in with a verified account.
    fn auth_state(&self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// The current user's session data.
    fn user_data(&self) -> impl Future<Output = Result<UserData, ClientError>> + Send;
}

/// The calls needed to load the current user's transactions.
pub trait TransactionApi {
    /// Every transaction owned by the current user, newest first.
    fn list_transactions(
        &self,
    ) -> impl Future<Output = Result<Vec<Transaction>, ClientError>> + Send;
}

/// Talks to the backend over HTTP, keeping the auth cookie between calls.
#[derive(Debug, Clone)]
pub struct HttpSessionApi {
    client: Client,
    base_url: String,
}

impl HttpSessionApi {
    /// Create a client for the backend at `base_url`, e.g. "http://localhost:4000".
    ///
    /// # Errors
    ///
    /// Returns a [ClientError::Request] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder().cookie_store(true).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    /// Create an account and log in as the new user.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Profile, ClientError> {
        let body = json!({"name": name, "email": email, "password": password});
        let response = self
            .request(Method::POST, endpoints::REGISTER)
            .json(&body)
            .send()
            .await?;

        read_data(response).await
    }

    /// Log in, keeping the session for seven days if `remember_me` is set.
    pub async fn log_in(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<Profile, ClientError> {
        let body = json!({"email": email, "password": password, "remember_me": remember_me});
        let response = self
            .request(Method::POST, endpoints::LOG_IN)
            .json(&body)
            .send()
            .await?;

        read_data(response).await
    }

    /// Log out and drop the auth cookie.
    pub async fn log_out(&self) -> Result<(), ClientError> {
        let response = self.request(Method::POST, endpoints::LOG_OUT).send().await?;

        read_envelope::<()>(response).await.map(|_| ())
    }

    /// Record a new transaction.
    pub async fn add_transaction(
        &self,
        form: &TransactionForm,
    ) -> Result<Transaction, ClientError> {
        self.send_form(Method::POST, endpoints::ADD_TRANSACTION, form)
            .await
    }

    /// Replace the fields of an existing transaction.
    pub async fn edit_transaction(
        &self,
        id: TransactionId,
        form: &TransactionForm,
    ) -> Result<Transaction, ClientError> {
        let path = format_endpoint(endpoints::EDIT_TRANSACTION, id);

        self.send_form(Method::PUT, &path, form).await
    }

    /// Delete a transaction.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<(), ClientError> {
        let path = format_endpoint(endpoints::DELETE_TRANSACTION, id);
        let response = self.request(Method::DELETE, &path).send().await?;

        read_envelope::<()>(response).await.map(|_| ())
    }

    async fn send_form<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: &impl Serialize,
    ) -> Result<T, ClientError> {
        let response = self.request(method, path).json(form).send().await?;

        read_data(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ClientError> {
        let response = self.request(Method::GET, path).send().await?;

        read_envelope(response).await
    }
}

impl SessionApi for HttpSessionApi {
    async fn auth_state(&self) -> Result<(), ClientError> {
        self.get::<()>(endpoints::IS_AUTH).await.map(|_| ())
    }

    async fn user_data(&self) -> Result<UserData, ClientError> {
        self.get(endpoints::USER_DATA)
            .await?
            .data
            .ok_or(ClientError::MissingData)
    }
}

impl TransactionApi for HttpSessionApi {
    async fn list_transactions(&self) -> Result<Vec<Transaction>, ClientError> {
        self.get(endpoints::GET_TRANSACTIONS)
            .await?
            .data
            .ok_or(ClientError::MissingData)
    }
}

/// Parse the envelope of `response`, turning failures into [ClientError::Api].
async fn read_envelope<T: DeserializeOwned>(
    response: Response,
) -> Result<Envelope<T>, ClientError> {
    let status = response.status();
    let envelope: Envelope<T> = response.json().await?;

    if !status.is_success() || !envelope.success {
        let message = envelope
            .error
            .or(envelope.message)
            .unwrap_or_else(|| status.to_string());

        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(envelope)
}

async fn read_data<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    read_envelope(response)
        .await?
        .data
        .ok_or(ClientError::MissingData)
}

#[cfg(test)]
mod http_session_api_tests {
    use tokio::net::TcpListener;

    use crate::{
        TransactionForm, build_router,
        test_utils::{TEST_PASSWORD, test_state},
    };

    use super::{ClientError, HttpSessionApi, SessionApi, TransactionApi};

    /// Serve a fresh app on a random local port and return its base URL.
    async fn spawn_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Could not bind test listener.");
        let address = listener.local_addr().unwrap();
        let app = build_router(test_state());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{address}")
    }

    #[track_caller]
    fn assert_api_error(result: Result<impl std::fmt::Debug, ClientError>, want_status: u16) {
        match result {
            Err(ClientError::Api { status, .. }) => assert_eq!(status, want_status),
            other => panic!("want API error with status {want_status}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn anonymous_auth_state_is_unauthorized() {
        let api = HttpSessionApi::new(&spawn_server().await).unwrap();

        assert_api_error(api.auth_state().await, 401);
    }

    #[tokio::test]
    async fn anonymous_list_is_unauthorized() {
        let api = HttpSessionApi::new(&spawn_server().await).unwrap();

        match api.list_transactions().await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Not authorized, log in again");
            }
            other => panic!("want unauthorized error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_then_log_in() {
        let base_url = spawn_server().await;
        let api = HttpSessionApi::new(&format!("{base_url}/")).unwrap();

        let profile = api
            .register("Alice", "alice@example.com", TEST_PASSWORD)
            .await
            .unwrap();
        let logged_in = api
            .log_in("alice@example.com", TEST_PASSWORD, false)
            .await
            .unwrap();

        assert_eq!(profile.email, "alice@example.com");
        assert!(!profile.is_verified);
        assert_eq!(logged_in, profile);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let api = HttpSessionApi::new(&spawn_server().await).unwrap();
        api.register("Alice", "alice@example.com", TEST_PASSWORD)
            .await
            .unwrap();

        assert_api_error(
            api.log_in("alice@example.com", "wrong password", false)
                .await,
            401,
        );
    }

    #[tokio::test]
    async fn anonymous_add_transaction_is_unauthorized() {
        let api = HttpSessionApi::new(&spawn_server().await).unwrap();

        assert_api_error(api.add_transaction(&TransactionForm::default()).await, 401);
    }

    #[tokio::test]
    async fn log_out_always_succeeds() {
        let api = HttpSessionApi::new(&spawn_server().await).unwrap();

        assert!(api.log_out().await.is_ok());
    }
}
