//! REST and HTML endpoints

pub mod handlers;
pub mod router;
pub mod state;
