use crate::errors::ServerError;
use crate::templates::components::error_page;
use astra::{Body, Response, ResponseBuilder};
use serde_json::{json, Value};

pub type ResultResp = Result<Response, ServerError>;

/// `{"error": "...", "details": [...]}`; details only carry field errors.
pub fn api_error_body(err: &ServerError) -> Value {
    let details = match err {
        ServerError::Validation(errors) => json!(errors),
        _ => json!([]),
    };
    let message = match err {
        ServerError::Validation(_) => "Validation failed".to_string(),
        // Internal details stay in the logs.
        ServerError::DbError(_) | ServerError::InternalError => "Internal Server Error".to_string(),
        other => other.to_string(),
    };
    json!({ "error": message, "details": details })
}

pub fn api_error_response(err: &ServerError) -> Response {
    let body = api_error_body(err).to_string();
    build(err.status(), "application/json", body)
}

pub fn html_error_response(err: &ServerError) -> Response {
    let message = match err {
        ServerError::DbError(_) | ServerError::InternalError => "Internal Server Error".to_string(),
        other => other.to_string(),
    };
    let markup = error_page(err.status(), &message);
    build(err.status(), "text/html; charset=utf-8", markup.into_string())
}

fn build(status: u16, content_type: &str, body: String) -> Response {
    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", content_type)
        .body(Body::from(body.clone()))
        .unwrap_or_else(|_| Response::new(Body::from(body)))
}
