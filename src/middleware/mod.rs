pub mod auth;
pub mod maintenance;
pub mod role;
