//! The error classifier.
//!
//! Framework-native errors (`RouteError`, `MethodError`, `ResponseError`,
//! `FileError`) pass through untouched so the framework renders them itself.
//! Everything else becomes a JSON error body:
//!
//! | Error | Status | Details |
//! |---|---|---|
//! | `ApiError` | its own | yes |
//! | `ErrorWithDetails` | 500 | yes |
//! | anything else | 500 | no |

use std::sync::Arc;

use serde_json::json;

use crate::error::{Classification, Error};
use crate::handler::{Continue, Next};
use crate::logger::Logger;
use crate::request::Request;
use crate::response::Response;
use crate::send_error::{ErrorResponse, send_error_response};

/// Builds the error-handling middleware. Register it with
/// [`Api::use_error_middleware`](crate::Api::use_error_middleware).
pub fn create_api_error_handler(
    logger: Arc<dyn Logger>,
) -> impl Fn(&Error, &Request, &mut Response, Next) -> Result<Continue, Error> + Send + Sync + 'static {
    move |err: &Error, req: &Request, res: &mut Response, next: Next| {
        logger.error("Error in route handler", Some(&json!({ "error": err.to_log_value() })));

        let response = match err.classify() {
            Classification::FrameworkNative => return Ok(next.call()),
            Classification::Api => ErrorResponse::new(err.message())
                .status(err.status_code())
                .details(err.details()),
            Classification::WithDetails => ErrorResponse::new(err.message()).details(err.details()),
            Classification::Generic => ErrorResponse::new(err.message()),
        };

        send_error_response(req, res, response)?;
        Ok(next.call())
    }
}
