//! Interactive compile page

use super::CompileRequest;
use crate::api::rest::state::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};

fn render_template<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template rendering error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Template error: {}", e),
            )
                .into_response()
        }
    }
}

/// Compile page template
#[derive(Template, Default)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub input: String,
    pub output: String,
    pub error: Option<String>,
}

impl IntoResponse for IndexTemplate {
    fn into_response(self) -> Response {
        render_template(self)
    }
}

/// Empty compile page
pub async fn index() -> IndexTemplate {
    IndexTemplate::default()
}

/// Compile the submitted form and render it with the result. The input box
/// keeps the text exactly as submitted.
pub async fn compile_page(
    State(state): State<AppState>,
    Form(request): Form<CompileRequest>,
) -> IndexTemplate {
    let input = request.into_source();
    match state.bridge.compile_source(&input).await {
        Ok(output) => IndexTemplate {
            input,
            output,
            error: None,
        },
        Err(err) => IndexTemplate {
            input,
            output: String::new(),
            error: Some(err.to_string()),
        },
    }
}
