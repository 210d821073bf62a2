use axum::{
    Router,
    routing::{get, post, put},
};

use super::controller::{
    delete_user, get_user, list_users, resend_confirmation, set_lockout, update_roles,
};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user).delete(delete_user))
        .route("/{id}/lockout", put(set_lockout))
        .route("/{id}/roles", put(update_roles))
        .route("/{id}/resend-confirmation", post(resend_confirmation))
}
