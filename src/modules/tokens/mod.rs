//! The refresh-token core: record model, persistence contract and the
//! lifecycle manager that owns creation, validation and clearing.

pub mod manager;
pub mod model;
pub mod store;
