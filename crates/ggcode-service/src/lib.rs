//! ggcoded: HTTP gateway in front of the GGCODE compiler library.
//!
//! Serves an interactive compile page, a JSON compile endpoint and a
//! read-only catalog of example programs.

#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use api::{create_router, AppState};
pub use config::GatewayConfig;
pub use error::{ApiError, GatewayError, GatewayResult};
pub use server::Server;
