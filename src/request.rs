//! Incoming request, built from a gateway event.

use std::collections::HashMap;

use crate::event::{Context, Event};

/// An incoming request as route handlers and middleware see it.
///
/// Header names are lower-cased. Multi-value headers and query parameters
/// keep their last value, which matches what the gateway puts in the
/// single-value maps.
#[derive(Clone, Debug, Default)]
pub struct Request {
    pub(crate) id: Option<String>,
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) query: HashMap<String, String>,
    pub(crate) cookies: HashMap<String, String>,
    pub(crate) params: HashMap<String, String>,
    pub(crate) body: Option<String>,
    pub(crate) is_base64_encoded: bool,
}

impl Request {
    /// Builds a request from a v1 or v2 event. `None` for any other payload.
    pub(crate) fn from_event(event: &Event, context: &Context) -> Option<Self> {
        let mut req = match event {
            Event::V1(e) => {
                let mut headers = lowercase_keys(e.headers.clone().unwrap_or_default());
                for (name, values) in e.multi_value_headers.iter().flatten() {
                    if let Some(last) = values.last() {
                        headers.insert(name.to_ascii_lowercase(), last.clone());
                    }
                }
                let mut query = e.query_string_parameters.clone().unwrap_or_default();
                for (name, values) in e.multi_value_query_string_parameters.iter().flatten() {
                    if let Some(last) = values.last() {
                        query.insert(name.clone(), last.clone());
                    }
                }
                Self {
                    method: e.http_method.to_ascii_uppercase(),
                    path: e.path.clone(),
                    headers,
                    query,
                    body: e.body.clone(),
                    is_base64_encoded: e.is_base64_encoded,
                    ..Self::default()
                }
            }
            Event::V2(e) => {
                let mut headers = lowercase_keys(e.headers.clone().unwrap_or_default());
                if let Some(cookies) = &e.cookies {
                    headers.insert("cookie".to_owned(), cookies.join("; "));
                }
                Self {
                    method: e.request_context.http.method.to_ascii_uppercase(),
                    path: e.raw_path.clone(),
                    headers,
                    query: e.query_string_parameters.clone().unwrap_or_default(),
                    body: e.body.clone(),
                    is_base64_encoded: e.is_base64_encoded,
                    ..Self::default()
                }
            }
            Event::Other(_) => return None,
        };
        req.id = context.aws_request_id.clone();
        req.cookies = req.header("cookie").map(parse_cookies).unwrap_or_default();
        Some(req)
    }

    /// Request-scoped identifier, the invocation's `awsRequestId`.
    pub fn id(&self) -> Option<&str> { self.id.as_deref() }
    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HashMap<String, String> { &self.headers }
    pub fn body(&self) -> Option<&str> { self.body.as_deref() }
    pub fn is_base64_encoded(&self) -> bool { self.is_base64_encoded }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Parses the body as JSON. `Ok(None)` when there is no body.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<Option<T>, crate::Error> {
        match self.body.as_deref() {
            None | Some("") => Ok(None),
            Some(body) => Ok(Some(serde_json::from_str(body)?)),
        }
    }
}

fn lowercase_keys(map: HashMap<String, String>) -> HashMap<String, String> {
    map.into_iter().map(|(k, v)| (k.to_ascii_lowercase(), v)).collect()
}

fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builds_from_v1_event() {
        let event: Event = serde_json::from_value(json!({
            "path": "/users",
            "httpMethod": "post",
            "headers": { "Content-Type": "application/json" },
            "multiValueHeaders": { "Cookie": ["session=abc; theme=dark"] },
            "queryStringParameters": { "page": "2" },
            "body": "{\"name\":\"alice\"}"
        }))
        .unwrap();
        let req = Request::from_event(&event, &Context::with_request_id("req-1")).unwrap();
        assert_eq!(req.id(), Some("req-1"));
        assert_eq!(req.method(), "POST");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.query("page"), Some("2"));
        assert_eq!(req.cookie("theme"), Some("dark"));
        let body: serde_json::Value = req.json().unwrap().unwrap();
        assert_eq!(body["name"], "alice");
    }

    #[test]
    fn missing_request_id_stays_absent() {
        let event: Event = serde_json::from_value(json!({ "path": "/", "httpMethod": "GET" })).unwrap();
        let req = Request::from_event(&event, &Context::default()).unwrap();
        assert_eq!(req.id(), None);
    }

    #[test]
    fn other_events_have_no_request() {
        let event = Event::Other(json!({ "source": "aws.events" }));
        assert!(Request::from_event(&event, &Context::default()).is_none());
    }
}
