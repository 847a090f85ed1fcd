//! Protocol-level error payloads.
//!
//! Game errors travel as regular events; these helpers cover what happens
//! before a message reaches a room (bad JSON, missing parameters).

use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;

/// `{"event":"error","data":{"code","message","context"}}` as a websocket text frame.
pub fn ws_error_message(code: &str, message: &str, context: Option<&str>) -> String {
    json!({
        "event": "error",
        "data": { "code": code, "message": message, "context": context.unwrap_or("") },
    })
    .to_string()
}

/// JSON error body with the given status, for rejected upgrades.
pub fn http_error_response(code: &str, message: &str, context: Option<&str>, status: StatusCode) -> HttpResponse {
    let body = json!({
        "error": { "code": code, "message": message, "context": context.unwrap_or("") },
    });
    HttpResponse::build(status).content_type("application/json").body(body.to_string())
}
