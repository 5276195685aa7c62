//! Request handlers

use serde::Serialize;

mod compile;
mod examples;
mod health;
mod page;

pub use compile::*;
pub use examples::*;
pub use health::*;
pub use page::*;

/// `{success: false, error}` body shared by the JSON endpoints.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub success: bool,
    pub error: String,
}

impl Failure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
