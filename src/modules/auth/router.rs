use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{
    change_password, confirm_email, forgot_password, reset_password, sign_in, sign_in_refresh,
    sign_out, sign_up, token, token_refresh, who_am_i,
};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
        .route("/signin/refresh", post(sign_in_refresh))
        .route("/token", post(token))
        .route("/token/refresh", post(token_refresh))
        .route("/signout", post(sign_out))
        .route("/whoami", get(who_am_i))
        .route("/change-password", post(change_password))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/confirm-email", post(confirm_email))
}
