//! Configuration modules for the Signet API.
//!
//! Each submodule owns one concern and loads itself from environment
//! variables via a `from_env()` constructor. The token signing key is the
//! only hard requirement: starting without it is a configuration error and
//! panics immediately rather than failing per-request.

pub mod auth;
pub mod cors;
pub mod database;
pub mod email;
