//! Example catalog handlers

use super::Failure;
use crate::api::rest::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use ggcode_core::{CatalogError, ExampleEntry};
use serde::Serialize;

/// Listing response
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ListExamplesResponse {
    Listed {
        success: bool,
        files: Vec<ExampleEntry>,
    },
    Failed(Failure),
}

/// Retrieval response
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GetExampleResponse {
    Found { success: bool, content: String },
    Failed(Failure),
}

/// List the example programs
pub async fn list_examples(State(state): State<AppState>) -> Json<ListExamplesResponse> {
    let response = match state.catalog.list().await {
        Ok(files) => ListExamplesResponse::Listed {
            success: true,
            files,
        },
        Err(err) => ListExamplesResponse::Failed(catalog_failure(err)),
    };
    Json(response)
}

/// Fetch one example program by file name
pub async fn get_example(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Json<GetExampleResponse> {
    let response = match state.catalog.get(&filename).await {
        Ok(file) => GetExampleResponse::Found {
            success: true,
            content: file.content,
        },
        Err(err) => GetExampleResponse::Failed(catalog_failure(err)),
    };
    Json(response)
}

fn catalog_failure(err: CatalogError) -> Failure {
    match &err {
        CatalogError::InvalidName { .. } => tracing::warn!(error = %err, "rejected example name"),
        CatalogError::Io { .. } => tracing::error!(error = %err, "catalog read failed"),
        _ => tracing::debug!(error = %err, "catalog lookup failed"),
    }
    Failure::new(err.public_message())
}
