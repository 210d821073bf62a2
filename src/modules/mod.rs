pub mod auth;
pub mod maintenance;
pub mod tokens;
pub mod users;
