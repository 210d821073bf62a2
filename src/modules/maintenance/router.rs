use axum::{Router, routing::get};

use super::controller::{get_maintenance, set_maintenance};
use crate::state::AppState;

pub fn init_maintenance_router() -> Router<AppState> {
    Router::new().route("/", get(get_maintenance).put(set_maintenance))
}
