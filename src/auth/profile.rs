//! Routes for reading and updating the current user's details.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Envelope, Error,
    auth::{User, UserID, get_user_by_id, user::update_user_name},
    db::lock_connection,
    envelope::{ApiJson, RequiredFields},
};

/// The details of a user that are safe to send to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// The name shown to the user.
    pub name: String,
    /// The address used to log in.
    pub email: String,
    /// Whether the user has verified their email address.
    pub is_verified: bool,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            email: user.email,
            is_verified: user.is_verified,
        }
    }
}

/// The session data the client loads when it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    /// The name shown to the user.
    pub name: String,
    /// Whether the user has verified their email address.
    pub is_verified: bool,
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            is_verified: user.is_verified,
        }
    }
}

/// The state needed to read and update profiles.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The new details for a profile.
#[derive(Clone, Serialize, Deserialize)]
pub struct UpdateProfileForm {
    /// The new display name.
    pub name: Option<String>,
}

/// Get the current user's profile.
pub async fn get_profile(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Envelope<Profile>, Error> {
    let user = get_user_by_id(user_id, &*lock_connection(&state.db_connection)?)?;

    Ok(Envelope::data(user.into()))
}

/// Get the name and verification status of the current user.
pub async fn get_user_data(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Envelope<UserData>, Error> {
    let user = get_user_by_id(user_id, &*lock_connection(&state.db_connection)?)?;

    Ok(Envelope::data(user.into()))
}

/// Change the current user's display name.
///
/// # Errors
///
/// Returns an [Error::MissingFields] if the name is blank.
pub async fn update_profile(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<UpdateProfileForm>,
) -> Result<Envelope<Profile>, Error> {
    let mut required = RequiredFields::default();
    let name = required.take("name", &form.name);
    required.check()?;

    let connection = lock_connection(&state.db_connection)?;
    update_user_name(user_id, name, &connection)?;
    let user = get_user_by_id(user_id, &connection)?;

    Ok(Envelope::data(user.into()).with_message("Profile updated"))
}

#[cfg(test)]
mod profile_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        Envelope, Error,
        auth::{Profile, UserData},
        endpoints,
        test_utils::{log_in_new_user, test_server, test_state, verify_user},
    };

    #[tokio::test]
    async fn get_profile_returns_current_user() {
        let state = test_state();
        let server = test_server(&state);
        let cookie = log_in_new_user(&server, "alice@example.com").await;

        let response = server.get(endpoints::PROFILE).add_cookie(cookie).await;

        response.assert_status_ok();
        let profile = response.json::<Envelope<Profile>>().data.unwrap();
        assert_eq!(profile.email, "alice@example.com");
        assert!(!profile.is_verified);
    }

    #[tokio::test]
    async fn get_profile_requires_log_in() {
        let state = test_state();
        let server = test_server(&state);

        server
            .get(endpoints::PROFILE)
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn get_user_data_reflects_verification() {
        let state = test_state();
        let server = test_server(&state);
        let cookie = log_in_new_user(&server, "alice@example.com").await;
        verify_user(&state, "alice@example.com");

        let response = server.get(endpoints::USER_DATA).add_cookie(cookie).await;

        response.assert_status_ok();
        let user_data = response.json::<Envelope<UserData>>().data.unwrap();
        assert!(user_data.is_verified);
    }

    #[tokio::test]
    async fn update_profile_changes_name() {
        let state = test_state();
        let server = test_server(&state);
        let cookie = log_in_new_user(&server, "alice@example.com").await;

        let response = server
            .put(endpoints::UPDATE_PROFILE)
            .add_cookie(cookie.clone())
            .json(&json!({"name": "Alice Smith"}))
            .await;

        response.assert_status_ok();
        let response = server.get(endpoints::PROFILE).add_cookie(cookie).await;
        assert_eq!(
            response.json::<Envelope<Profile>>().data.unwrap().name,
            "Alice Smith"
        );
    }

    #[tokio::test]
    async fn update_profile_rejects_blank_name() {
        let state = test_state();
        let server = test_server(&state);
        let cookie = log_in_new_user(&server, "alice@example.com").await;

        let response = server
            .put(endpoints::UPDATE_PROFILE)
            .add_cookie(cookie)
            .json(&json!({"name": "  "}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Envelope<()>>().error,
            Some(Error::MissingFields(vec!["name"]).to_string())
        );
    }
}
