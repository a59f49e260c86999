/// Centralized helpers for WebSocket close reasons and HTTP error responses.
///
/// Use these helpers so every close frame and error body the server emits is built in one place.
use actix_http::ws::{CloseCode, CloseReason};
use actix_web::{HttpResponse, http::StatusCode};

use crate::config::session::{OPPONENT_TIMED_OUT_CLOSE_CODE, TIMED_OUT_CLOSE_CODE};

/// Builds a close reason with an application-defined code (4000-4999).
pub fn ws_close_reason(code: u16, description: &str) -> CloseReason {
    CloseReason {
        code: CloseCode::Other(code),
        description: Some(description.to_string()),
    }
}

/// Close reason for the player whose turn deadline expired.
pub fn ws_timed_out_reason() -> CloseReason {
    ws_close_reason(TIMED_OUT_CLOSE_CODE, "You timed out")
}

/// Close reason for the opponent of the player who timed out.
pub fn ws_opponent_timed_out_reason() -> CloseReason {
    ws_close_reason(OPPONENT_TIMED_OUT_CLOSE_CODE, "Opponent timed out")
}

/// Close reason for a connection whose first message named no known queue.
pub fn ws_unknown_queue_reason() -> CloseReason {
    CloseReason {
        code: CloseCode::Policy,
        description: Some("Unknown queue class".to_string()),
    }
}

/// Close reason for a client that sends frames faster than its session reads them.
pub fn ws_flooded_reason() -> CloseReason {
    CloseReason {
        code: CloseCode::Policy,
        description: Some("Too many pending frames".to_string()),
    }
}

/// Returns an HTTP error response with a JSON body.
///
/// # Arguments
/// - `code`: Unique error code.
/// - `message`: Human-readable error message.
/// - `context`: Optional context string.
/// - `status`: HTTP status code.
pub fn http_error_response(
    code: &str,
    message: &str,
    context: Option<&str>,
    status: StatusCode,
) -> HttpResponse {
    let body = serde_json::json!({
        "error": {
            "code": code,
            "message": message,
            "context": context.unwrap_or(""),
        }
    });
    HttpResponse::build(status).json(body)
}
