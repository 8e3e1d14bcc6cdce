//! Unified error type and the classification the error pipeline runs on.
//!
//! Every failure that can reach the error middleware chain is an [`Error`].
//! The variants form a closed set tagged by [`Error::name`]:
//!
//! | Variant | Name | Handled by |
//! |---|---|---|
//! | [`Error::Route`] | `RouteError` | framework default rendering |
//! | [`Error::Method`] | `MethodError` | framework default rendering |
//! | [`Error::Response`] | `ResponseError` | framework default rendering |
//! | [`Error::File`] | `FileError` | framework default rendering |
//! | [`Error::Api`] | `ApiError` | error classifier, own status |
//! | [`Error::WithDetails`] | `ErrorWithDetails` | error classifier, 500 |
//! | anything else | `Error` / `ConfigurationError` | error classifier, 500, no details |

use http::StatusCode;
use serde_json::Value;

/// Discriminant names the routing framework renders itself.
pub const FRAMEWORK_ERRORS: [&str; 4] = ["RouteError", "MethodError", "ResponseError", "FileError"];

/// The error type returned by every fallible operation in this crate and by
/// route handlers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No route matches the request path.
    #[error("{message}")]
    Route { message: String, path: String },

    /// The path exists, but not for this method.
    #[error("{message}")]
    Method { message: String, method: String, path: String },

    /// Invalid framework setup, such as an unparseable route pattern.
    #[error("{message}")]
    Configuration { message: String },

    /// The framework could not produce a response.
    #[error("{message}")]
    Response { message: String, code: Option<u16> },

    /// A file could not be read or served.
    #[error("{message}")]
    File {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Application error carrying structured details, rendered with status 500.
    #[error("{message}")]
    WithDetails { message: String, details: Option<Value> },

    /// Application error with an explicit status code and optional details.
    #[error("{message}")]
    Api {
        status_code: u16,
        message: String,
        details: Option<Value>,
    },

    /// Any other failure. Only the message is ever shown to clients.
    #[error("{message}")]
    Other {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// How the error classifier treats an [`Error`]. Exactly one applies per error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Classification {
    FrameworkNative,
    Api,
    WithDetails,
    Generic,
}

impl Error {
    pub fn route(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Route { message: message.into(), path: path.into() }
    }

    pub fn method(
        message: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::Method { message: message.into(), method: method.into(), path: path.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn response(message: impl Into<String>, code: Option<u16>) -> Self {
        Self::Response { message: message.into(), code }
    }

    pub fn file(message: impl Into<String>, source: Option<std::io::Error>) -> Self {
        Self::File { message: message.into(), source }
    }

    /// `ErrorWithDetails`. Pass `None` (or `Value::Null`) for no details.
    pub fn with_details(message: impl Into<String>, details: impl Into<Option<Value>>) -> Self {
        Self::WithDetails { message: message.into(), details: details.into() }
    }

    /// `ApiError`. A status that is not a valid HTTP status code becomes 500.
    ///
    /// ```rust
    /// use stratus::{Error, Status};
    ///
    /// assert_eq!(Error::api(Status::NotFound, "no such user", None).status_code(), 404);
    /// assert_eq!(Error::api(-1, "broken", None).status_code(), 500);
    /// assert_eq!(Error::api(70_000, "broken", None).status_code(), 500);
    /// ```
    pub fn api<S: TryInto<u16>>(
        status: S,
        message: impl Into<String>,
        details: impl Into<Option<Value>>,
    ) -> Self {
        let status_code = status
            .try_into()
            .ok()
            .filter(|code| StatusCode::from_u16(*code).is_ok())
            .unwrap_or(500);
        Self::Api { status_code, message: message.into(), details: details.into() }
    }

    /// Generic error with a message only.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other { message: message.into(), source: None }
    }

    /// The discriminant name, e.g. `"ApiError"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Route { .. }         => "RouteError",
            Self::Method { .. }        => "MethodError",
            Self::Configuration { .. } => "ConfigurationError",
            Self::Response { .. }      => "ResponseError",
            Self::File { .. }          => "FileError",
            Self::WithDetails { .. }   => "ErrorWithDetails",
            Self::Api { .. }           => "ApiError",
            Self::Other { .. }         => "Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Route { message, .. }
            | Self::Method { message, .. }
            | Self::Configuration { message }
            | Self::Response { message, .. }
            | Self::File { message, .. }
            | Self::WithDetails { message, .. }
            | Self::Api { message, .. }
            | Self::Other { message, .. } => message,
        }
    }

    /// Details carried by `ApiError` and `ErrorWithDetails`.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::WithDetails { details, .. } | Self::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// The status the framework would answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Route { .. }             => 404,
            Self::Method { .. }            => 405,
            Self::Api { status_code, .. }  => *status_code,
            _                              => 500,
        }
    }

    /// Framework-native errors are recognised by name only.
    pub fn is_framework_native(&self) -> bool {
        FRAMEWORK_ERRORS.contains(&self.name())
    }

    pub fn classify(&self) -> Classification {
        if self.is_framework_native() {
            return Classification::FrameworkNative;
        }
        match self {
            Self::Api { .. }         => Classification::Api,
            Self::WithDetails { .. } => Classification::WithDetails,
            _                        => Classification::Generic,
        }
    }

    /// Structured form used when logging the error.
    pub fn to_log_value(&self) -> Value {
        let mut value = serde_json::json!({
            "name": self.name(),
            "message": self.message(),
        });
        match self {
            Self::Route { path, .. } => value["path"] = Value::from(path.as_str()),
            Self::Method { method, path, .. } => {
                value["method"] = Value::from(method.as_str());
                value["path"] = Value::from(path.as_str());
            }
            Self::Response { code: Some(code), .. } => value["code"] = Value::from(*code),
            Self::Api { status_code, .. } => value["statusCode"] = Value::from(*status_code),
            _ => {}
        }
        if let Some(details) = self.details() {
            value["details"] = details.clone();
        }
        if let Some(source) = std::error::Error::source(self) {
            value["cause"] = Value::from(source.to_string());
        }
        value
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Other { message: e.to_string(), source: Some(Box::new(e)) }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Other { message: e.to_string(), source: Some(Box::new(e)) }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Status;

    #[test]
    fn api_error_keeps_valid_status() {
        let err = Error::api(Status::UnprocessableContent, "bad input", json!({ "field": "name" }));
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.message(), "bad input");
        assert_eq!(err.details(), Some(&json!({ "field": "name" })));
        assert_eq!(err.name(), "ApiError");
    }

    #[test]
    fn api_error_coerces_invalid_status_to_500() {
        assert_eq!(Error::api(-404_i32, "x", None).status_code(), 500);
        assert_eq!(Error::api(0_u16, "x", None).status_code(), 500);
        assert_eq!(Error::api(u64::MAX, "x", None).status_code(), 500);
        assert_eq!(Error::api(1000_u32, "x", None).status_code(), 500);
    }

    #[test]
    fn names_differ_from_the_generic_name() {
        let all = [
            Error::route("r", "/"),
            Error::method("m", "GET", "/"),
            Error::configuration("c"),
            Error::response("r", None),
            Error::file("f", None),
            Error::with_details("d", None),
            Error::api(400, "a", None),
        ];
        for err in &all {
            assert_ne!(err.name(), Error::other("x").name());
        }
    }

    #[test]
    fn classification_is_by_discriminant_only() {
        assert_eq!(Error::route("ApiError", "/").classify(), Classification::FrameworkNative);
        assert_eq!(Error::method("m", "GET", "/").classify(), Classification::FrameworkNative);
        assert_eq!(Error::response("r", Some(500)).classify(), Classification::FrameworkNative);
        assert_eq!(Error::file("f", None).classify(), Classification::FrameworkNative);
        assert_eq!(Error::api(400, "RouteError", None).classify(), Classification::Api);
        assert_eq!(Error::with_details("d", json!(1)).classify(), Classification::WithDetails);
        assert_eq!(Error::configuration("c").classify(), Classification::Generic);
        assert_eq!(Error::other("FileError").classify(), Classification::Generic);
    }

    #[test]
    fn io_errors_become_generic() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.classify(), Classification::Generic);
        assert_eq!(err.message(), "gone");
        assert!(err.details().is_none());
    }

    #[test]
    fn log_value_carries_variant_fields() {
        let value = Error::method("Method not allowed", "PATCH", "/users").to_log_value();
        assert_eq!(value["name"], "MethodError");
        assert_eq!(value["method"], "PATCH");
        assert_eq!(value["path"], "/users");
    }
}
