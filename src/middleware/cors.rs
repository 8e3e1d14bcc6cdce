//! CORS on both the success and the error path.

use serde_json::json;

use crate::api::Api;
use crate::error::Error;
use crate::handler::Next;
use crate::request::Request;
use crate::response::{CorsOptions, Response};

#[derive(Clone, Copy, Debug, Default)]
pub struct AddCorsOptions {
    /// Answer `OPTIONS` on every path with `200 {}`. Only needed when the
    /// gateway itself is not configured to handle preflight requests.
    pub add_options_method: bool,
}

/// Registers open CORS headers for successful and failed responses alike.
///
/// Safe to call more than once: headers are overwritten, not duplicated, and
/// a second preflight route is ignored.
pub fn add_cors_headers(api: &mut Api, options: AddCorsOptions) {
    api.use_middleware(|_req: &mut Request, res: &mut Response, next: Next| {
        res.cors(&CorsOptions::default());
        Ok(next.call())
    });

    api.use_error_middleware(|_err: &Error, _req: &Request, res: &mut Response, next: Next| {
        res.cors(&CorsOptions::default());
        Ok(next.call())
    });

    if options.add_options_method {
        api.options("/*", preflight);
    }
}

async fn preflight(_req: Request) -> Result<Response, Error> {
    Response::json(&json!({}))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::event::{Context, Event};

    fn event(method: &str, path: &str) -> Event {
        serde_json::from_value(json!({ "httpMethod": method, "path": path })).unwrap()
    }

    async fn ok(_req: Request) -> Result<&'static str, Error> {
        Ok("ok")
    }

    async fn boom(_req: Request) -> Result<&'static str, Error> {
        Err(Error::other("boom"))
    }

    #[tokio::test]
    async fn headers_on_success_and_error() {
        let mut api = Api::default();
        add_cors_headers(&mut api, AddCorsOptions::default());
        api.get("/ok", ok).get("/boom", boom);

        let res = api.run(&event("GET", "/ok"), &Context::default()).await.unwrap();
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));

        let res = api.run(&event("GET", "/boom"), &Context::default()).await.unwrap();
        assert_eq!(res.status_code, 500);
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));

        let res = api.run(&event("GET", "/missing"), &Context::default()).await.unwrap();
        assert_eq!(res.status_code, 404);
        assert_eq!(res.header("access-control-allow-headers"), Some("Content-Type, Authorization, Content-Length, X-Requested-With"));
    }

    #[tokio::test]
    async fn preflight_route_is_opt_in() {
        let mut api = Api::default();
        add_cors_headers(&mut api, AddCorsOptions::default());
        api.get("/ok", ok);
        let res = api.run(&event("OPTIONS", "/ok"), &Context::default()).await.unwrap();
        assert_eq!(res.status_code, 405);

        let mut api = Api::default();
        add_cors_headers(&mut api, AddCorsOptions { add_options_method: true });
        api.get("/ok", ok);
        for path in ["/", "/ok", "/deep/er/path"] {
            let res = api.run(&event("OPTIONS", path), &Context::default()).await.unwrap();
            assert_eq!(res.status_code, 200);
            assert_eq!(res.body.as_deref(), Some("{}"));
            assert_eq!(res.header("access-control-allow-methods"), Some("GET, PUT, POST, DELETE, OPTIONS"));
        }
    }

    #[tokio::test]
    async fn registering_twice_is_harmless() {
        let mut api = Api::default();
        let options = AddCorsOptions { add_options_method: true };
        add_cors_headers(&mut api, options);
        add_cors_headers(&mut api, options);
        api.get("/ok", ok);

        let res = api.run(&event("GET", "/ok"), &Context::default()).await.unwrap();
        let origins = &res.multi_value_headers.as_ref().unwrap()["access-control-allow-origin"];
        assert_eq!(origins, &vec!["*".to_owned()]);
        let res = api.run(&event("OPTIONS", "/ok"), &Context::default()).await.unwrap();
        assert_eq!(res.status_code, 200);
    }
}
