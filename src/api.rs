//! The API instance: route registration and the per-event pipeline.
//!
//! # Pipeline
//!
//! ```text
//! Event ──► Request ──► route lookup ──► middleware … ──► handler ──► Response
//!                           │                 │              │
//!                           └── Route/Method ─┴──── Err ─────┘
//!                                     ▼
//!                        error middleware …  (until one sends)
//!                                     ▼
//!                        default `{ "error": … }` if none did
//! ```
//!
//! An `Api` is built once, shared read-only across invocations, and never
//! mutated by a request.

use std::sync::Arc;

use matchit::InsertError;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::Error;
use crate::event::{Context, Event, ProxyResponse};
use crate::handler::{BoxedErrorMiddleware, BoxedMiddleware, Continue, Handler, Next};
use crate::logger::{Logger, TracingLogger};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Lookup, RouteTable};

/// Path prefixes applied to every route registered on an [`Api`].
#[derive(Clone, Debug, Default)]
pub struct ApiOptions {
    /// e.g. `"api"` turns `/users` into `/api/users`.
    pub base: Option<String>,
    /// e.g. `"v1"`, placed after `base`.
    pub version: Option<String>,
}

/// The framework's own logging. Off by default: the application logger
/// covers errors through the error middleware.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggerOptions {
    /// One `info` line per request with method, path and status.
    pub access: bool,
    /// Log every error entering the error middleware chain.
    pub error_logging: bool,
}

pub struct Api {
    options: ApiOptions,
    logger_options: LoggerOptions,
    logger: Arc<dyn Logger>,
    routes: RouteTable,
    middleware: Vec<BoxedMiddleware>,
    error_middleware: Vec<BoxedErrorMiddleware>,
    config_errors: Vec<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self::new(ApiOptions::default())
    }
}

impl Api {
    pub fn new(options: ApiOptions) -> Self {
        Self {
            options,
            logger_options: LoggerOptions::default(),
            logger: Arc::new(TracingLogger),
            routes: RouteTable::default(),
            middleware: Vec::new(),
            error_middleware: Vec::new(),
            config_errors: Vec::new(),
        }
    }

    /// Routes the framework's own logging to `logger`.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>, options: LoggerOptions) -> Self {
        self.logger = logger;
        self.logger_options = options;
        self
    }

    /// Adds success-path middleware. Runs in registration order before the
    /// route handler; sending the response ends the chain.
    pub fn use_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response, Next) -> Result<Continue, Error> + Send + Sync + 'static,
    {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Adds error-path middleware. Runs in registration order until one of
    /// them sends the response.
    pub fn use_error_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&Error, &Request, &mut Response, Next) -> Result<Continue, Error> + Send + Sync + 'static,
    {
        self.error_middleware.push(Arc::new(middleware));
        self
    }

    /// Applies a registration unit: a function that adds routes and middleware.
    pub fn register<F: FnOnce(&mut Api)>(&mut self, routes: F) -> &mut Self {
        routes(self);
        self
    }

    /// Registers `handler` for `method` + `path`.
    ///
    /// Registering the same route twice keeps the first one. An invalid
    /// pattern is reported as a `ConfigurationError` by [`Api::run`].
    pub fn on(&mut self, method: Method, path: &str, handler: impl Handler) -> &mut Self {
        self.add(Some(method), path, handler)
    }

    /// Registers `handler` for every method.
    pub fn any(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.add(None, path, handler)
    }

    pub fn get(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Put, path, handler)
    }

    pub fn patch(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Patch, path, handler)
    }

    pub fn delete(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Delete, path, handler)
    }

    pub fn head(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Head, path, handler)
    }

    pub fn options(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Options, path, handler)
    }

    fn add(&mut self, method: Option<Method>, path: &str, handler: impl Handler) -> &mut Self {
        let path = self.prefixed(path);
        match self.routes.insert(method, &path, handler.into_boxed_handler()) {
            Ok(()) => {}
            Err(InsertError::Conflict { with }) => {
                warn!(route = %path, existing = %with, "duplicate route ignored");
            }
            Err(e) => self.config_errors.push(format!("Invalid route `{path}`: {e}")),
        }
        self
    }

    fn prefixed(&self, path: &str) -> String {
        let mut full = String::new();
        for part in [&self.options.base, &self.options.version].into_iter().flatten() {
            let part = part.trim_matches('/');
            if !part.is_empty() {
                full.push('/');
                full.push_str(part);
            }
        }
        let path = path.trim_start_matches('/');
        if path.is_empty() && !full.is_empty() {
            return full;
        }
        full.push('/');
        full.push_str(path);
        full
    }

    /// Processes one event to completion.
    ///
    /// Fails only when there is nothing to answer: the instance is
    /// misconfigured, the event is not a proxy integration event, or the
    /// default error rendering itself failed.
    pub async fn run(&self, event: &Event, context: &Context) -> Result<ProxyResponse, Error> {
        if let Some(message) = self.config_errors.first() {
            return Err(Error::configuration(message.clone()));
        }
        let Some(mut req) = Request::from_event(event, context) else {
            return Err(Error::other("Unsupported event: expected an API Gateway proxy event"));
        };

        let mut res = Response::new();
        if let Err(err) = self.dispatch(&mut req, &mut res).await {
            self.handle_error(err, &req, &mut res)?;
        }

        if self.logger_options.access {
            self.logger.info("access", Some(&json!({
                "method": req.method(),
                "path": req.path(),
                "statusCode": res.status_code(),
                "requestId": req.id(),
            })));
        }
        Ok(res.into_proxy_response(event.is_v2()))
    }

    async fn dispatch(&self, req: &mut Request, res: &mut Response) -> Result<(), Error> {
        let method = req.method.parse::<Method>().ok();
        let handler = match self.routes.lookup(method, &req.path) {
            Lookup::Found(handler, params) => {
                req.params = params;
                handler
            }
            Lookup::MethodNotAllowed => {
                return Err(Error::method("Method not allowed", req.method.clone(), req.path.clone()));
            }
            Lookup::NotFound => return Err(Error::route("Route not found", req.path.clone())),
        };
        if method.is_none() {
            return Err(Error::method("Method not allowed", req.method.clone(), req.path.clone()));
        }

        for middleware in &self.middleware {
            let _continued = middleware(&mut *req, &mut *res, Next::new())?;
            if res.is_sent() {
                debug!(path = %req.path, "response sent by middleware");
                return Ok(());
            }
        }

        let returned = handler.call(req.clone()).await?;
        res.merge(returned);
        Ok(())
    }

    fn handle_error(&self, mut err: Error, req: &Request, res: &mut Response) -> Result<(), Error> {
        if self.logger_options.error_logging {
            self.logger.error(err.message(), Some(&err.to_log_value()));
        }

        for middleware in &self.error_middleware {
            if res.is_sent() {
                break;
            }
            match middleware(&err, req, &mut *res, Next::new()) {
                Ok(_continued) => {}
                Err(failure) => {
                    warn!(error = %failure, original = %err, "error middleware failed");
                    err = failure;
                    break;
                }
            }
        }

        if !res.is_sent() {
            res.set_status(err.status_code());
            res.send_json(&json!({ "error": err.message() }))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use super::*;
    use crate::Status;

    fn v1(method: &str, path: &str) -> Event {
        serde_json::from_value(json!({ "httpMethod": method, "path": path, "body": null })).unwrap()
    }

    fn body(res: &ProxyResponse) -> Value {
        serde_json::from_str(res.body.as_deref().unwrap_or_default()).unwrap()
    }

    async fn hello(req: Request) -> Result<Response, Error> {
        let name = req.param("name").unwrap_or("world").to_owned();
        Response::json(&json!({ "hello": name }))
    }

    async fn fail(_req: Request) -> Result<Response, Error> {
        Err(Error::api(Status::Conflict, "taken", None))
    }

    #[tokio::test]
    async fn routes_and_extracts_params() {
        let mut api = Api::default();
        api.get("/hello/{name}", hello);
        let res = api.run(&v1("GET", "/hello/ann"), &Context::default()).await.unwrap();
        assert_eq!(res.status_code, 200);
        assert_eq!(body(&res), json!({ "hello": "ann" }));
        assert_eq!(res.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn unknown_route_and_method_render_framework_defaults() {
        let mut api = Api::default();
        api.get("/hello/{name}", hello);

        let res = api.run(&v1("GET", "/nope"), &Context::default()).await.unwrap();
        assert_eq!(res.status_code, 404);
        assert_eq!(body(&res), json!({ "error": "Route not found" }));

        let res = api.run(&v1("DELETE", "/hello/ann"), &Context::default()).await.unwrap();
        assert_eq!(res.status_code, 405);
        assert_eq!(body(&res), json!({ "error": "Method not allowed" }));
    }

    #[tokio::test]
    async fn unparseable_methods_are_method_errors() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut api = Api::default();
        api.get("/hello/{name}", hello).any("/anything", hello);
        let recorded = Arc::clone(&seen);
        api.use_error_middleware(move |err: &Error, _req: &Request, _res: &mut Response, next: Next| {
            recorded.lock().unwrap().push(err.name());
            Ok(next.call())
        });

        for path in ["/hello/ann", "/anything"] {
            let res = api.run(&v1("PURGE", path), &Context::default()).await.unwrap();
            assert_eq!(res.status_code, 405);
            assert_eq!(body(&res), json!({ "error": "Method not allowed" }));
        }
        assert_eq!(*seen.lock().unwrap(), ["MethodError", "MethodError"]);
    }

    #[tokio::test]
    async fn middleware_runs_in_order_and_headers_survive_the_handler() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut api = Api::default();
        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            api.use_middleware(move |_req: &mut Request, res: &mut Response, next: Next| {
                order.lock().unwrap().push(tag);
                res.header(&format!("x-{tag}"), "1");
                Ok(next.call())
            });
        }
        api.get("/hello/{name}", hello);

        let res = api.run(&v1("GET", "/hello/bo"), &Context::default()).await.unwrap();
        assert_eq!(*order.lock().unwrap(), ["first", "second"]);
        assert_eq!(res.header("x-first"), Some("1"));
        assert_eq!(res.header("x-second"), Some("1"));
    }

    #[tokio::test]
    async fn middleware_can_answer_early() {
        let mut api = Api::default();
        api.use_middleware(|_req: &mut Request, res: &mut Response, next: Next| {
            res.set_status(Status::Unauthorized).send("");
            Ok(next.call())
        });
        api.get("/hello/{name}", hello);
        let res = api.run(&v1("GET", "/hello/x"), &Context::default()).await.unwrap();
        assert_eq!(res.status_code, 401);
    }

    #[tokio::test]
    async fn error_middleware_stops_once_a_response_is_sent() {
        let calls = Arc::new(Mutex::new(0));
        let mut api = Api::default();
        api.use_error_middleware(|err: &Error, _req: &Request, res: &mut Response, next: Next| {
            res.set_status(err.status_code()).send(err.message().to_owned());
            Ok(next.call())
        });
        let counted = Arc::clone(&calls);
        api.use_error_middleware(move |_: &Error, _: &Request, _: &mut Response, next: Next| {
            *counted.lock().unwrap() += 1;
            Ok(next.call())
        });
        api.get("/fail", fail);

        let res = api.run(&v1("GET", "/fail"), &Context::default()).await.unwrap();
        assert_eq!(res.status_code, 409);
        assert_eq!(res.body.as_deref(), Some("taken"));
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn failing_error_middleware_falls_back_to_default_rendering() {
        let mut api = Api::default();
        api.use_error_middleware(|_: &Error, _: &Request, _: &mut Response, _: Next| {
            Err(Error::other("renderer broke"))
        });
        api.get("/fail", fail);
        let res = api.run(&v1("GET", "/fail"), &Context::default()).await.unwrap();
        assert_eq!(res.status_code, 500);
        assert_eq!(body(&res), json!({ "error": "renderer broke" }));
    }

    #[tokio::test]
    async fn base_and_version_prefix_routes() {
        let mut api = Api::new(ApiOptions { base: Some("/api/".into()), version: Some("v1".into()) });
        api.get("/hello/{name}", hello);
        let res = api.run(&v1("GET", "/api/v1/hello/z"), &Context::default()).await.unwrap();
        assert_eq!(res.status_code, 200);
    }

    #[tokio::test]
    async fn invalid_routes_surface_as_configuration_errors() {
        let mut api = Api::default();
        api.get("/broken/{", hello);
        let err = api.run(&v1("GET", "/"), &Context::default()).await.unwrap_err();
        assert_eq!(err.name(), "ConfigurationError");
    }

    #[tokio::test]
    async fn unsupported_events_are_rejected() {
        let api = Api::default();
        let err = api.run(&Event::Other(json!({ "records": [] })), &Context::default()).await.unwrap_err();
        assert_eq!(err.name(), "Error");
    }

    #[tokio::test]
    async fn v2_events_get_v2_responses() {
        let mut api = Api::default();
        api.get("/hello/{name}", hello);
        let event: Event = serde_json::from_value(json!({
            "version": "2.0",
            "routeKey": "$default",
            "rawPath": "/hello/v2",
            "requestContext": { "http": { "method": "GET", "path": "/hello/v2" } }
        }))
        .unwrap();
        let res = api.run(&event, &Context::default()).await.unwrap();
        assert_eq!(body(&res), json!({ "hello": "v2" }));
        assert!(res.headers.is_some());
        assert!(res.multi_value_headers.is_none());
    }

    #[tokio::test]
    async fn access_logging_goes_through_the_logger() {
        let logger = Arc::new(crate::logger::testing::RecordingLogger::default());
        let mut api = Api::default().with_logger(
            logger.clone(),
            LoggerOptions { access: true, error_logging: false },
        );
        api.get("/hello/{name}", hello);
        api.run(&v1("GET", "/hello/a"), &Context::default()).await.unwrap();
        assert_eq!(logger.levels(), [("info", "access".to_owned())]);
    }
}
