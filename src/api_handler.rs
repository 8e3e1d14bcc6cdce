//! The function entry point.
//!
//! [`create_api_handler`] builds one [`Api`] with a middleware stack and the
//! application's routes, and returns an [`ApiHandler`] that processes one
//! event per call:
//!
//! 1. log the event at debug
//! 2. answer warm-up probes, if a [`Warmer`] is configured
//! 3. replace a v1 event's `path` with its greedy proxy path, when it has one
//! 4. run the event through the API
//! 5. log the pretty-printed response at debug
//!
//! ```rust,no_run
//! use stratus::{Api, Context, Error, HandlerOptions, Request, create_api_handler};
//!
//! fn users(api: &mut Api) {
//!     api.get("/users/{id}", get_user);
//! }
//!
//! async fn get_user(req: Request) -> Result<String, Error> {
//!     Ok(format!("user {}", req.param("id").unwrap_or_default()))
//! }
//!
//! # async fn invoke(event: serde_json::Value) -> Result<(), Error> {
//! let handler = create_api_handler([users], HandlerOptions::default());
//! let _output = handler.handle_value(event, Context::default()).await?;
//! # Ok(()) }
//! ```

use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use tracing::debug;

use crate::api::{Api, ApiOptions, LoggerOptions};
use crate::error::Error;
use crate::event::{Context, Event, ProxyResponse};
use crate::logger::{Logger, TracingLogger};
use crate::middleware::create_default_api_stack;
use crate::pretty::{PrettyPrintOptions, pretty_print_response};
use crate::proxy_path::extract_proxy_path;
use crate::warmer::Warmer;

/// Middleware registered before the application's routes.
pub enum ApiStack {
    /// CORS plus the error classifier, logging to the handler's logger.
    Default,
    /// Nothing: the framework's own error rendering applies everywhere.
    None,
    Custom(Box<dyn Fn(&mut Api) + Send + Sync>),
}

pub struct HandlerOptions {
    pub logger: Arc<dyn Logger>,
    pub api_stack: ApiStack,
    pub logger_options: LoggerOptions,
    pub api_options: ApiOptions,
    pub warmer: Option<Arc<dyn Warmer>>,
    pub pretty_print: PrettyPrintOptions,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            logger: Arc::new(TracingLogger),
            api_stack: ApiStack::Default,
            logger_options: LoggerOptions::default(),
            api_options: ApiOptions::default(),
            warmer: None,
            pretty_print: PrettyPrintOptions::default(),
        }
    }
}

impl HandlerOptions {
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn api_stack(mut self, api_stack: ApiStack) -> Self {
        self.api_stack = api_stack;
        self
    }

    pub fn logger_options(mut self, logger_options: LoggerOptions) -> Self {
        self.logger_options = logger_options;
        self
    }

    pub fn api_options(mut self, api_options: ApiOptions) -> Self {
        self.api_options = api_options;
        self
    }

    pub fn warmer(mut self, warmer: Arc<dyn Warmer>) -> Self {
        self.warmer = Some(warmer);
        self
    }

    pub fn pretty_print(mut self, pretty_print: PrettyPrintOptions) -> Self {
        self.pretty_print = pretty_print;
        self
    }
}

/// What one invocation returns to the runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    Response(ProxyResponse),
    /// A warm-up probe was answered. Serializes as `"warmed"`.
    Warmed,
}

impl Output {
    pub fn into_response(self) -> Option<ProxyResponse> {
        match self {
            Self::Response(response) => Some(response),
            Self::Warmed => None,
        }
    }
}

impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Response(response) => response.serialize(serializer),
            Self::Warmed => serializer.serialize_str("warmed"),
        }
    }
}

/// Builds the entry point. Route functions are registered in order, after
/// the API stack; the order decides precedence between overlapping routes.
pub fn create_api_handler<I>(routes: I, options: HandlerOptions) -> ApiHandler
where
    I: IntoIterator,
    I::Item: FnOnce(&mut Api),
{
    let HandlerOptions { logger, api_stack, logger_options, api_options, warmer, pretty_print } = options;

    let mut api = Api::new(api_options).with_logger(Arc::clone(&logger), logger_options);
    match api_stack {
        ApiStack::Default => {
            api.register(create_default_api_stack(Arc::clone(&logger)));
        }
        ApiStack::None => {}
        ApiStack::Custom(stack) => {
            api.register(stack);
        }
    }
    for route in routes {
        api.register(route);
    }

    ApiHandler { api: Arc::new(api), logger, warmer, pretty_print }
}

/// Cheap to clone; every clone shares the same [`Api`].
#[derive(Clone)]
pub struct ApiHandler {
    api: Arc<Api>,
    logger: Arc<dyn Logger>,
    warmer: Option<Arc<dyn Warmer>>,
    pretty_print: PrettyPrintOptions,
}

impl ApiHandler {
    /// Handles one invocation. Errors from [`Api::run`] are returned as-is.
    pub async fn handle(&self, mut event: Event, context: Context) -> Result<Output, Error> {
        self.logger.debug("Incoming event", Some(&json!({
            "event": serde_json::to_value(&event).unwrap_or_default(),
            "context": serde_json::to_value(&context).unwrap_or_default(),
        })));

        if let Some(warmer) = &self.warmer {
            match warmer.is_warmup(&event).await {
                Ok(true) => return Ok(Output::Warmed),
                Ok(false) => {}
                Err(e) => debug!(error = %e, "warm-up check failed"),
            }
        }

        if let Event::V1(proxy) = &mut event {
            if let Ok(path) = extract_proxy_path(proxy) {
                proxy.path = path;
            }
        }

        let response = self.api.run(&event, &context).await?;

        self.logger.debug(
            "API response",
            Some(&pretty_print_response(&response, &event, &self.pretty_print)),
        );
        Ok(Output::Response(response))
    }

    /// Handles a raw JSON payload, as delivered by the runtime.
    pub async fn handle_value(&self, event: Value, context: Context) -> Result<Output, Error> {
        if !event.is_object() {
            return Err(Error::other("Event must be a JSON object"));
        }
        let event: Event = serde_json::from_value(event)?;
        self.handle(event, context).await
    }
}
