//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    auth::{
        auth_guard, get_profile, get_user_data, is_authenticated, post_log_in, post_log_out,
        register_user, reset_password, send_reset_otp, send_verify_otp, update_profile,
        verified_guard, verify_account,
    },
    endpoints,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_root))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out))
        .route(endpoints::SEND_RESET_OTP, post(send_reset_otp))
        .route(endpoints::RESET_PASSWORD, post(reset_password));

    // Layered inside the auth guard since it reads the user ID the guard provides.
    let verified_routes = Router::new()
        .route(endpoints::IS_AUTH, get(is_authenticated))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            verified_guard,
        ));

    let protected_routes = Router::new()
        .route(endpoints::SEND_VERIFY_OTP, post(send_verify_otp))
        .route(endpoints::VERIFY_ACCOUNT, post(verify_account))
        .route(endpoints::PROFILE, get(get_profile))
        .route(endpoints::UPDATE_PROFILE, put(update_profile))
        .route(endpoints::USER_DATA, get(get_user_data))
        .route(
            endpoints::ADD_TRANSACTION,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::GET_TRANSACTIONS,
            get(list_transactions_endpoint),
        )
        .route(
            endpoints::EDIT_TRANSACTION,
            put(edit_transaction_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION,
            delete(delete_transaction_endpoint),
        )
        .merge(verified_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' is a health check.
async fn get_root() -> &'static str {
    "Server is running"
}
