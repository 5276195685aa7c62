//! JSON compile endpoint

use super::Failure;
use crate::api::rest::state::AppState;
use crate::error::ApiError;
use async_trait::async_trait;
use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, FromRequest, Request, State},
    http::{header, StatusCode},
    Form, Json,
};
use serde::{Deserialize, Serialize};

/// Compile request body. A missing or null `ggcode` compiles empty text.
#[derive(Debug, Default, Deserialize)]
pub struct CompileRequest {
    #[serde(default)]
    pub ggcode: Option<String>,
}

impl CompileRequest {
    pub fn into_source(self) -> String {
        self.ggcode.unwrap_or_default()
    }
}

/// A [`CompileRequest`] read from a JSON or a form-encoded body,
/// chosen by `Content-Type`.
///
/// Anything that is not JSON goes through the form extractor, so a body with
/// no or an unknown content type is refused with 415.
#[derive(Debug)]
pub struct CompilePayload(pub CompileRequest);

#[async_trait]
impl<S> FromRequest<S> for CompilePayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(is_json_content_type)
            .unwrap_or(false);

        if is_json {
            let Json(body) = Json::<CompileRequest>::from_request(req, state)
                .await
                .map_err(json_rejection)?;
            Ok(Self(body))
        } else {
            let Form(body) = Form::<CompileRequest>::from_request(req, state)
                .await
                .map_err(form_rejection)?;
            Ok(Self(body))
        }
    }
}

fn is_json_content_type(value: &str) -> bool {
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

fn form_rejection(rejection: FormRejection) -> ApiError {
    if rejection.status() == StatusCode::UNSUPPORTED_MEDIA_TYPE {
        ApiError::UnsupportedMediaType(rejection.body_text())
    } else {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Compile endpoint response
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CompileResponse {
    Compiled { success: bool, output: String },
    Failed(Failure),
}

/// Compile endpoint. Bridge failures are reported in the body, not as
/// HTTP errors.
pub async fn api_compile(
    State(state): State<AppState>,
    CompilePayload(request): CompilePayload,
) -> Json<CompileResponse> {
    let response = match state.bridge.compile_source(&request.into_source()).await {
        Ok(output) => CompileResponse::Compiled {
            success: true,
            output,
        },
        Err(err) => CompileResponse::Failed(Failure::new(err.to_string())),
    };
    Json(response)
}
