//! JSON error responses.

use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// What to render. Status defaults to 500; details are rendered only when
/// they are truthy (not `null`, `false`, `0`, or `""`).
#[derive(Clone, Copy, Debug)]
pub struct ErrorResponse<'a> {
    pub message: &'a str,
    pub status_code: Option<u16>,
    pub details: Option<&'a Value>,
}

impl<'a> ErrorResponse<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message, status_code: None, details: None }
    }

    pub fn status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn details(mut self, details: Option<&'a Value>) -> Self {
        self.details = details;
        self
    }
}

/// Wire shape: `{ "error": …, "details"?: …, "requestId"?: … }`.
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    request_id: Option<&'a str>,
}

/// Sets the status, sends the JSON error body and finally pins
/// `content-type: application/json`.
///
/// `requestId` is left out when the request has no identifier. A failure
/// to serialize `details` is returned to the caller.
///
/// ```rust
/// use stratus::{ErrorResponse, Request, Response, send_error_response};
///
/// let mut res = Response::new();
/// send_error_response(&Request::default(), &mut res, ErrorResponse::new("nope").status(403)).unwrap();
/// assert_eq!(res.status_code(), 403);
/// assert_eq!(res.body(), r#"{"error":"nope"}"#);
/// ```
pub fn send_error_response(
    req: &Request,
    res: &mut Response,
    error: ErrorResponse<'_>,
) -> Result<(), Error> {
    let body = ErrorBody {
        error: error.message,
        details: error.details.filter(|d| is_truthy(d)),
        request_id: req.id(),
    };
    res.set_status(error.status_code.unwrap_or(500));
    res.send_json(&body)?;
    res.header("content-type", "application/json");
    Ok(())
}

/// JavaScript-style truthiness, which is what API clients of these error
/// bodies have always been promised.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
