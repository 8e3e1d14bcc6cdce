//! Log-friendly projection of a request/response pair.

use serde_json::{Map, Value};

use crate::event::{Event, ProxyResponse};
use crate::send_error::is_truthy;

#[derive(Clone, Copy, Debug)]
pub struct PrettyPrintOptions {
    /// Bodies longer than this many characters are cut. Counts Unicode
    /// scalar values, so an emoji is one character, not two UTF-16 units.
    pub max_body_length: usize,
    /// Include response headers.
    pub show_headers: bool,
}

impl Default for PrettyPrintOptions {
    fn default() -> Self {
        Self { max_body_length: 2500, show_headers: false }
    }
}

/// Builds the value logged after each invocation: status, method, path,
/// both bodies (cut to `max_body_length`, parsed as JSON when possible)
/// and optionally the response headers.
///
/// A response without a body is returned as-is. Nothing here feeds back into
/// what the client receives.
pub fn pretty_print_response(
    response: &ProxyResponse,
    event: &Event,
    options: &PrettyPrintOptions,
) -> Value {
    let Some(response_body) = response.body.as_deref() else {
        return serde_json::to_value(response).unwrap_or_default();
    };

    let mut out = Map::new();
    out.insert("statusCode".into(), response.status_code.into());
    out.insert("httpMethod".into(), event.method().into());
    out.insert("path".into(), event.path().into());
    out.insert("responseBody".into(), format_body(Some(response_body), options.max_body_length));
    out.insert("isBase64Encoded".into(), response.is_base64_encoded.into());
    if options.show_headers {
        if let Some(headers) = &response.multi_value_headers {
            out.insert("multiValueHeaders".into(), serde_json::to_value(headers).unwrap_or_default());
        }
        if let Some(headers) = &response.headers {
            out.insert("headers".into(), serde_json::to_value(headers).unwrap_or_default());
        }
    }
    out.insert("requestBody".into(), format_body(event.body(), options.max_body_length));
    Value::Object(out)
}

fn format_body(body: Option<&str>, max_length: usize) -> Value {
    let Some(body) = body else {
        return Value::Null;
    };
    let length = body.chars().count();
    let body = if length > max_length {
        let kept: String = body.chars().take(max_length).collect();
        format!("{kept} ... {} more characters", length - max_length)
    } else {
        body.to_owned()
    };
    match serde_json::from_str::<Value>(&body) {
        Ok(parsed) if is_truthy(&parsed) => parsed,
        _ => Value::String(body),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;

    fn get_event(body: Option<&str>) -> Event {
        serde_json::from_value(json!({ "httpMethod": "GET", "path": "/x", "body": body })).unwrap()
    }

    #[test]
    fn parses_json_bodies() {
        let response = ProxyResponse { status_code: 200, body: Some(r#"{"a":1}"#.into()), ..ProxyResponse::default() };
        let out = pretty_print_response(&response, &get_event(None), &PrettyPrintOptions::default());
        assert_eq!(
            out,
            json!({
                "statusCode": 200,
                "httpMethod": "GET",
                "path": "/x",
                "responseBody": { "a": 1 },
                "isBase64Encoded": false,
                "requestBody": null
            })
        );
    }

    #[test]
    fn truncates_long_bodies() {
        let long = format!("[{}10]", "1,".repeat(1498));
        assert_eq!(long.len(), 3000);
        let response = ProxyResponse { status_code: 200, body: Some(long.clone()), ..ProxyResponse::default() };
        let options = PrettyPrintOptions { max_body_length: 2500, show_headers: false };
        let out = pretty_print_response(&response, &get_event(Some("plain text")), &options);

        let expected = format!("{} ... 500 more characters", &long[..2500]);
        assert_eq!(out["responseBody"], Value::String(expected));
        assert_eq!(out["requestBody"], "plain text");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let body = "😀".repeat(5);
        assert_eq!(format_body(Some(&body), 3), json!("😀😀😀 ... 2 more characters"));
        assert_eq!(format_body(Some(&body), 5), json!(body));
    }

    #[test]
    fn falsy_json_stays_a_string() {
        assert_eq!(format_body(Some("0"), 10), json!("0"));
        assert_eq!(format_body(Some("null"), 10), json!("null"));
        assert_eq!(format_body(Some("[1]"), 10), json!([1]));
    }

    #[test]
    fn headers_only_on_request() {
        let response = ProxyResponse {
            status_code: 204,
            body: Some(String::new()),
            multi_value_headers: Some(BTreeMap::from([("x-id".to_owned(), vec!["1".to_owned()])])),
            ..ProxyResponse::default()
        };
        let hidden = pretty_print_response(&response, &get_event(None), &PrettyPrintOptions::default());
        assert!(hidden.get("multiValueHeaders").is_none());

        let options = PrettyPrintOptions { show_headers: true, ..PrettyPrintOptions::default() };
        let shown = pretty_print_response(&response, &get_event(None), &options);
        assert_eq!(shown["multiValueHeaders"], json!({ "x-id": ["1"] }));
    }

    #[test]
    fn responses_without_body_pass_through() {
        let response = ProxyResponse { status_code: 202, ..ProxyResponse::default() };
        let out = pretty_print_response(&response, &get_event(None), &PrettyPrintOptions::default());
        assert_eq!(out, json!({ "statusCode": 202, "isBase64Encoded": false }));
    }
}
