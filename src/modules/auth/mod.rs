//! Authentication: sign-in/sign-up/refresh/sign-out endpoints and the
//! issuance protocol they share.

pub mod controller;
pub mod model;
pub mod protocol;
pub mod router;
pub mod service;
