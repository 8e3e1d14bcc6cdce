//! Outgoing response handle and the [`IntoResponse`] conversion trait.
//!
//! A [`Response`] is both what handlers return and what middleware mutate
//! while a request is in flight. Middleware annotate it (`header`, `cors`,
//! `cookie`) and may finish it (`send`, `send_json`, `send_status`); once a
//! response is sent, the framework stops running further middleware.

use std::collections::BTreeMap;

use http::StatusCode;
use serde::Serialize;

use crate::error::Error;
use crate::event::ProxyResponse;
use crate::status::Status;

const SET_COOKIE: &str = "set-cookie";
const CONTENT_TYPE: &str = "content-type";
const APPLICATION_JSON: &str = "application/json";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

// ── CORS / cookie options ─────────────────────────────────────────────────────

/// Header values written by [`Response::cors`]. The default is fully open.
#[derive(Clone, Debug)]
pub struct CorsOptions {
    pub origin: String,
    pub methods: String,
    pub headers: String,
    pub expose_headers: Option<String>,
    /// Seconds preflight results may be cached.
    pub max_age: Option<u64>,
    pub credentials: bool,
}

impl Default for CorsOptions {
    fn default() -> Self {
        Self {
            origin: "*".to_owned(),
            methods: "GET, PUT, POST, DELETE, OPTIONS".to_owned(),
            headers: "Content-Type, Authorization, Content-Length, X-Requested-With".to_owned(),
            expose_headers: None,
            max_age: None,
            credentials: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// Attributes for [`Response::cookie`].
#[derive(Clone, Debug)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: String,
    /// Lifetime in seconds.
    pub max_age: Option<i64>,
    /// Pre-formatted HTTP date.
    pub expires: Option<String>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<SameSite>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            domain: None,
            path: "/".to_owned(),
            max_age: None,
            expires: None,
            http_only: false,
            secure: false,
            same_site: None,
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing response.
///
/// # Returned from a handler
///
/// ```rust
/// use stratus::{Response, Status};
///
/// Response::text("hello");
/// Response::status(Status::NoContent);
/// Response::builder()
///     .status(Status::Created)
///     .header("location", "/users/42")
///     .json(&serde_json::json!({ "id": 42 }))
///     .unwrap();
/// ```
///
/// # Mutated by middleware
///
/// ```rust
/// use stratus::{CorsOptions, Response};
///
/// let mut res = Response::new();
/// res.cors(&CorsOptions::default()).header("x-powered-by", "stratus");
/// res.set_status(418_u16).send("short and stout");
/// assert!(res.is_sent());
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    pub(crate) status: u16,
    pub(crate) headers: BTreeMap<String, Vec<String>>,
    pub(crate) body: String,
    pub(crate) sent: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Empty `200 OK` that has not been sent yet.
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: BTreeMap::new(),
            body: String::new(),
            sent: false,
        }
    }

    /// `200 OK` with a serialized JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        Self::builder().json(value)
    }

    /// `200 OK` with `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: impl Into<u16>) -> Self {
        Self::builder().status(code).no_body()
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { inner: Self::new() }
    }

    pub fn status_code(&self) -> u16 { self.status }
    pub fn body(&self) -> &str { &self.body }
    pub fn is_sent(&self) -> bool { self.sent }

    pub fn set_status(&mut self, code: impl Into<u16>) -> &mut Self {
        self.status = code.into();
        self
    }

    /// Sets a header, replacing any previous value. Names are case-insensitive.
    pub fn header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name.to_ascii_lowercase(), vec![value.into()]);
        self
    }

    /// Adds a value without touching existing ones.
    pub fn append_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.entry(name.to_ascii_lowercase()).or_default().push(value.into());
        self
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_ascii_lowercase())
    }

    pub fn remove_header(&mut self, name: &str) -> &mut Self {
        self.headers.remove(&name.to_ascii_lowercase());
        self
    }

    /// Adds a `Set-Cookie` header. The value is percent-encoded.
    pub fn cookie(&mut self, name: &str, value: &str, options: &CookieOptions) -> &mut Self {
        let mut cookie = format!("{name}={}", encode_cookie_value(value));
        if let Some(domain) = &options.domain {
            cookie.push_str(&format!("; Domain={domain}"));
        }
        if let Some(expires) = &options.expires {
            cookie.push_str(&format!("; Expires={expires}"));
        }
        if let Some(max_age) = options.max_age {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }
        cookie.push_str(&format!("; Path={}", options.path));
        if let Some(same_site) = options.same_site {
            let same_site = match same_site {
                SameSite::Strict => "Strict",
                SameSite::Lax    => "Lax",
                SameSite::None   => "None",
            };
            cookie.push_str(&format!("; SameSite={same_site}"));
        }
        if options.secure {
            cookie.push_str("; Secure");
        }
        if options.http_only {
            cookie.push_str("; HttpOnly");
        }
        self.append_header(SET_COOKIE, cookie)
    }

    /// Expires a cookie on the client.
    pub fn clear_cookie(&mut self, name: &str, options: &CookieOptions) -> &mut Self {
        let options = CookieOptions {
            max_age: Some(0),
            expires: Some("Thu, 01 Jan 1970 00:00:00 GMT".to_owned()),
            ..options.clone()
        };
        self.cookie(name, "", &options)
    }

    /// Writes CORS headers. Calling it again overwrites, never duplicates.
    pub fn cors(&mut self, options: &CorsOptions) -> &mut Self {
        self.header("access-control-allow-origin", options.origin.as_str());
        self.header("access-control-allow-methods", options.methods.as_str());
        self.header("access-control-allow-headers", options.headers.as_str());
        if let Some(expose) = &options.expose_headers {
            self.header("access-control-expose-headers", expose.as_str());
        }
        if let Some(max_age) = options.max_age {
            self.header("access-control-max-age", max_age.to_string());
        }
        if options.credentials {
            self.header("access-control-allow-credentials", "true");
        }
        self
    }

    /// Sends a body as-is and finishes the response.
    pub fn send(&mut self, body: impl Into<String>) {
        self.body = body.into();
        self.sent = true;
    }

    /// Serializes `value`, sets `content-type: application/json` and finishes
    /// the response.
    pub fn send_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let body = serde_json::to_string(value)?;
        self.header(CONTENT_TYPE, APPLICATION_JSON);
        self.send(body);
        Ok(())
    }

    /// Sends `text/html`.
    pub fn html(&mut self, body: impl Into<String>) {
        self.header(CONTENT_TYPE, TEXT_HTML);
        self.send(body);
    }

    /// Sets the status and sends its reason phrase as the body.
    pub fn send_status(&mut self, code: impl Into<u16>) {
        let code = code.into();
        let reason = StatusCode::from_u16(code)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default();
        self.set_status(code);
        self.send(reason);
    }

    /// Redirects with `status` (a 3xx) to `location`.
    pub fn redirect(&mut self, status: impl Into<u16>, location: &str) {
        self.set_status(status).header("location", location);
        self.send("");
    }

    /// Lays `returned` over what middleware already set: its status and body
    /// win, and its headers replace same-named ones.
    pub(crate) fn merge(&mut self, returned: Response) {
        self.status = returned.status;
        self.body = returned.body;
        self.sent = true;
        for (name, values) in returned.headers {
            if name == SET_COOKIE {
                self.headers.entry(name).or_default().extend(values);
            } else {
                self.headers.insert(name, values);
            }
        }
    }

    /// Renders the gateway response. v2 (HTTP API) payloads carry cookies in a
    /// separate list and single-value headers; v1 uses `multiValueHeaders`.
    pub(crate) fn into_proxy_response(self, v2: bool) -> ProxyResponse {
        let mut response = ProxyResponse {
            status_code: self.status,
            body: Some(self.body),
            ..ProxyResponse::default()
        };
        if v2 {
            let mut headers = self.headers;
            response.cookies = headers.remove(SET_COOKIE);
            response.headers = Some(
                headers.into_iter().map(|(name, values)| (name, values.join(", "))).collect(),
            );
        } else {
            response.multi_value_headers = Some(self.headers);
        }
        response
    }
}

fn encode_cookie_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9'
            | b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200`.
/// Terminated by a body method, which marks the response as sent.
pub struct ResponseBuilder {
    inner: Response,
}

impl ResponseBuilder {
    pub fn status(mut self, code: impl Into<u16>) -> Self {
        self.inner.set_status(code);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.inner.append_header(name, value);
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Response, Error> {
        self.inner.send_json(value)?;
        Ok(self.inner)
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(mut self, body: impl Into<String>) -> Response {
        self.inner.header(CONTENT_TYPE, TEXT_PLAIN);
        self.inner.send(body);
        self.inner
    }

    /// Terminate with no body (e.g. `Status::NoContent`).
    pub fn no_body(mut self) -> Response {
        self.inner.send("");
        self.inner
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into a [`Response`] for handler return values.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a [`Status`] directly from a handler: `return Ok(Status::NoContent)`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

impl IntoResponse for serde_json::Value {
    fn into_response(self) -> Response {
        let mut res = Response::new();
        res.header(CONTENT_TYPE, APPLICATION_JSON);
        res.send(self.to_string());
        res
    }
}
