//! Radix-tree route table.
//!
//! One tree per HTTP method plus one for routes registered with `any`.
//! O(path-length) lookup. The table only answers "which handler, with which
//! parameters"; turning a miss into a `RouteError` or `MethodError` is the
//! pipeline's job.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::{InsertError, Router as MatchitRouter};

use crate::handler::BoxedHandler;
use crate::method::Method;

pub(crate) enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    MethodNotAllowed,
    NotFound,
}

#[derive(Default)]
pub(crate) struct RouteTable {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    any: MatchitRouter<BoxedHandler>,
}

impl RouteTable {
    /// Inserts a route. `method: None` matches every method.
    ///
    /// Accepts `{name}` / `{*rest}` patterns as well as the `:name` and
    /// trailing `*` shorthands. A trailing wildcard also matches its bare
    /// prefix, so `/*` covers `/` itself.
    pub(crate) fn insert(
        &mut self,
        method: Option<Method>,
        path: &str,
        handler: BoxedHandler,
    ) -> Result<(), InsertError> {
        let tree = match method {
            Some(method) => self.routes.entry(method).or_default(),
            None => &mut self.any,
        };
        let (pattern, bare_prefix) = normalize_pattern(path);
        tree.insert(pattern, Arc::clone(&handler))?;
        if let Some(prefix) = bare_prefix {
            // An explicit route for the prefix keeps precedence.
            match tree.insert(prefix, handler) {
                Ok(()) | Err(InsertError::Conflict { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub(crate) fn lookup(&self, method: Option<Method>, path: &str) -> Lookup {
        let tree = method.and_then(|m| self.routes.get(&m));
        for tree in tree.into_iter().chain(std::iter::once(&self.any)) {
            if let Ok(matched) = tree.at(path) {
                let params = matched.params.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                return Lookup::Found(Arc::clone(matched.value), params);
            }
        }
        if self.routes.values().any(|tree| tree.at(path).is_ok()) {
            Lookup::MethodNotAllowed
        } else {
            Lookup::NotFound
        }
    }
}

/// Rewrites shorthand segments into matchit syntax. Returns the pattern and,
/// for wildcard routes, the prefix the wildcard hangs off.
fn normalize_pattern(path: &str) -> (String, Option<String>) {
    let mut segments: Vec<String> = path
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_owned(),
        })
        .collect();

    let mut bare_prefix = None;
    let wildcard = match segments.last().map(String::as_str) {
        Some("*") => Some("{*wildcard}".to_owned()),
        Some(last) if last.starts_with("{*") => Some(last.to_owned()),
        _ => None,
    };
    if let Some(wildcard) = wildcard {
        segments.pop();
        let prefix = segments.join("/");
        bare_prefix = Some(if prefix.is_empty() { "/".to_owned() } else { prefix });
        segments.push(wildcard);
    }
    (segments.join("/"), bare_prefix)
}
