//! API Gateway proxy integration envelopes.
//!
//! Two inbound shapes are understood:
//!
//! - **v1** (REST API, payload format 1.0): `httpMethod`, `path`, `resource`,
//!   `multiValueHeaders`, …
//! - **v2** (HTTP API, payload format 2.0): `version`, `routeKey`, `rawPath`,
//!   `requestContext.http.method`, …
//!
//! Anything else deserializes into [`Event::Other`] so warm-up probes and
//! stray invocations still reach the handler instead of failing in serde.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inbound invocation payload.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Event {
    V2(HttpEventV2),
    V1(ProxyEvent),
    Other(Value),
}

/// Payload format 1.0.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    /// Route template, e.g. `/api/{proxy+}`. Absent on ALB events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    pub path: String,
    pub http_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_value_headers: Option<HashMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_value_query_string_parameters: Option<HashMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_context: Option<Value>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// Payload format 2.0.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEventV2 {
    pub version: String,
    pub route_key: String,
    pub raw_path: String,
    #[serde(default)]
    pub raw_query_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_parameters: Option<HashMap<String, String>>,
    pub request_context: RequestContextV2,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContextV2 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub http: HttpDescription,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpDescription {
    pub method: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Event {
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::V1(e) => Some(&e.http_method),
            Self::V2(e) => Some(&e.request_context.http.method),
            Self::Other(_) => None,
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Self::V1(e) => Some(&e.path),
            Self::V2(e) => Some(&e.raw_path),
            Self::Other(_) => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Self::V1(e) => e.body.as_deref(),
            Self::V2(e) => e.body.as_deref(),
            Self::Other(_) => None,
        }
    }

    /// Whether the matching response uses the v2 shape (`headers` + `cookies`).
    pub(crate) fn is_v2(&self) -> bool {
        matches!(self, Self::V2(_))
    }
}

/// Invocation context handed to the function alongside the event.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoked_function_arn: Option<String>,
    #[serde(default, rename = "memoryLimitInMB", skip_serializing_if = "Option::is_none")]
    pub memory_limit_in_mb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_stream_name: Option<String>,
}

impl Context {
    pub fn with_request_id(id: impl Into<String>) -> Self {
        Self { aws_request_id: Some(id.into()), ..Self::default() }
    }
}

/// Proxy integration response handed back to the gateway.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_value_headers: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl ProxyResponse {
    /// First value of a header, whichever shape the response uses.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        if let Some(value) = self.headers.as_ref().and_then(|h| h.get(&name)) {
            return Some(value);
        }
        self.multi_value_headers
            .as_ref()
            .and_then(|h| h.get(&name))
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}
