//! Greedy proxy path extraction.
//!
//! When an API is mounted under a custom domain mapping, `path` carries the
//! mapping prefix while the `{proxy+}` parameter does not. Routing on the
//! parameter keeps route definitions independent of where the API is mounted:
//!
//! | `resource` | `path` | `pathParameters` | result |
//! |---|---|---|---|
//! | `/api/{proxy+}` | `/prod/api/users` | `proxy: users` | `/users` |
//! | `/{any+}` | `/v1/x/y` | `any: x/y` | `/x/y` |
//! | `/api/{proxy+}` | `/api` | none | `/` |

use crate::error::Error;
use crate::event::ProxyEvent;

/// Returns the path captured by a trailing `{name+}` placeholder in
/// `resource`, always with a leading `/`.
///
/// Fails when `resource` is absent (ALB events) or does not end in a greedy
/// placeholder; callers fall back to the original `path`.
///
/// ```rust
/// use std::collections::HashMap;
/// use stratus::{ProxyEvent, extract_proxy_path};
///
/// let event = ProxyEvent {
///     resource: Some("/api/{proxy+}".into()),
///     path: "/api/users".into(),
///     path_parameters: Some(HashMap::from([("proxy".into(), "users".into())])),
///     ..ProxyEvent::default()
/// };
/// assert_eq!(extract_proxy_path(&event).unwrap(), "/users");
/// ```
pub fn extract_proxy_path(event: &ProxyEvent) -> Result<String, Error> {
    let name = event
        .resource
        .as_deref()
        .and_then(proxy_name)
        .ok_or_else(|| Error::other("Resource does not contain proxy path"))?;

    let proxy_path = event
        .path_parameters
        .as_ref()
        .and_then(|params| params.get(name))
        .map(String::as_str)
        .unwrap_or_default();

    if proxy_path.starts_with('/') {
        Ok(proxy_path.to_owned())
    } else {
        Ok(format!("/{proxy_path}"))
    }
}

/// `"/api/{proxy+}"` → `Some("proxy")`. The placeholder must end the string
/// and its name must be a non-empty run of word characters.
fn proxy_name(resource: &str) -> Option<&str> {
    let open = resource.strip_suffix("+}")?;
    let start = open.rfind('{')?;
    let name = &open[start + 1..];
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    (!name.is_empty() && name.chars().all(is_word)).then_some(name)
}
