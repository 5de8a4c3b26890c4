//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{ErrorResponse, MessageResponse};

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::from(serde_json::to_string(data)?))?)
}

/// `{"error": message}` with the given status code.
pub fn error_response(status: u16, message: impl Into<String>) -> Result<Response<Body>, lambda_http::Error> {
    json_response(
        status,
        &ErrorResponse {
            error: message.into(),
        },
    )
}

/// `{"message": message}` with status 200.
pub fn message_response(message: impl Into<String>) -> Result<Response<Body>, lambda_http::Error> {
    json_response(
        200,
        &MessageResponse {
            message: message.into(),
        },
    )
}

/// Decode an event payload from the request body.
///
/// A body that is not valid JSON for `T` comes back as a ready 400
/// `Invalid request body: ...` response in the inner `Err`. The outer error
/// only occurs if that response itself cannot be built.
pub fn parse_json_body<T: DeserializeOwned>(body: &Body) -> Result<Result<T, Response<Body>>, lambda_http::Error> {
    match serde_json::from_slice(body.as_ref()) {
        Ok(parsed) => Ok(Ok(parsed)),
        Err(e) => {
            let response = error_response(400, format!("Invalid request body: {}", e))?;
            Ok(Err(response))
        }
    }
}

/// Decode the body inside a route arm, returning the 400 response early.
///
/// ```ignore
/// let payload: EventPayload = parse_body!(event.body());
/// ```
#[macro_export]
macro_rules! parse_body {
    ($body:expr) => {
        match $crate::http::parse_json_body($body)? {
            Ok(parsed) => parsed,
            Err(response) => return Ok(response),
        }
    };
}
