//! HTTP surface of the gateway

pub mod rest;

pub use rest::router::create_router;
pub use rest::state::AppState;
