//! The default middleware stack.

use std::sync::Arc;

use crate::api::Api;
use crate::logger::Logger;
use crate::middleware::cors::{AddCorsOptions, add_cors_headers};
use crate::middleware::error_handler::create_api_error_handler;

/// CORS first, then the error classifier, so error responses the classifier
/// sends already carry CORS headers.
pub fn create_default_api_stack(logger: Arc<dyn Logger>) -> impl Fn(&mut Api) + Send + Sync + 'static {
    move |api: &mut Api| {
        add_cors_headers(api, AddCorsOptions::default());
        api.use_error_middleware(create_api_error_handler(Arc::clone(&logger)));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::event::{Context, Event};
    use crate::logger::NoLogger;
    use crate::{Error, Request};

    async fn invalid(_req: Request) -> Result<&'static str, Error> {
        Err(Error::api(422, "Invalid payload", json!({ "missing": ["name"] })))
    }

    #[tokio::test]
    async fn classified_errors_carry_cors_headers() {
        let mut api = Api::default();
        api.register(create_default_api_stack(Arc::new(NoLogger)));
        api.post("/users", invalid);

        let event: Event = serde_json::from_value(json!({ "httpMethod": "POST", "path": "/users" })).unwrap();
        let res = api.run(&event, &Context::with_request_id("abc")).await.unwrap();

        assert_eq!(res.status_code, 422);
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
        assert_eq!(res.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(res.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({ "error": "Invalid payload", "details": { "missing": ["name"] }, "requestId": "abc" })
        );
    }

    #[tokio::test]
    async fn framework_errors_keep_the_framework_body() {
        let mut api = Api::default();
        api.register(create_default_api_stack(Arc::new(NoLogger)));

        let event: Event = serde_json::from_value(json!({ "httpMethod": "GET", "path": "/nowhere" })).unwrap();
        let res = api.run(&event, &Context::with_request_id("abc")).await.unwrap();

        assert_eq!(res.status_code, 404);
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
        let body: Value = serde_json::from_str(res.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({ "error": "Route not found" }));
    }
}
