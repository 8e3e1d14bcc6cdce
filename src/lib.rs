//! # stratus
//!
//! Error, CORS and response policy for functions behind an API Gateway
//! proxy integration.
//!
//! ## The contract
//!
//! Handlers fail with a typed [`Error`]. One middleware decides what the
//! client sees:
//!
//! - **Framework errors** (`RouteError`, `MethodError`, `ResponseError`,
//!   `FileError`) are answered by the framework's own rendering.
//! - **`ApiError`** renders with its status code and details.
//! - **`ErrorWithDetails`** renders with 500 and its details.
//! - **Anything else** renders with 500 and its message only.
//!
//! Error bodies are always JSON: `{ "error", "details"?, "requestId"? }`.
//! CORS headers are present on success and error responses alike.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use stratus::{Api, Context, Error, Event, HandlerOptions, Request, Response, Status, create_api_handler};
//!
//! fn routes(api: &mut Api) {
//!     api.get("/users/{id}", get_user);
//! }
//!
//! async fn get_user(req: Request) -> Result<Response, Error> {
//!     match req.param("id") {
//!         Some("42") => Response::json(&serde_json::json!({ "id": 42, "name": "alice" })),
//!         _ => Err(Error::api(Status::NotFound, "User not found", None)),
//!     }
//! }
//!
//! # async fn run(event: Event) -> Result<(), Error> {
//! let handler = create_api_handler([routes], HandlerOptions::default());
//! let output = handler.handle(event, Context::default()).await?;
//! println!("{}", serde_json::to_string(&output)?);
//! # Ok(()) }
//! ```

mod api;
mod api_handler;
mod error;
mod event;
mod handler;
mod method;
mod pretty;
mod proxy_path;
mod request;
mod response;
mod router;
mod send_error;
mod status;
mod warmer;

pub mod logger;
pub mod middleware;

#[cfg(feature = "lambda")]
pub mod lambda;

pub use api::{Api, ApiOptions, LoggerOptions};
pub use api_handler::{ApiHandler, ApiStack, HandlerOptions, Output, create_api_handler};
pub use error::{Classification, Error, FRAMEWORK_ERRORS};
pub use event::{Context, Event, HttpDescription, HttpEventV2, ProxyEvent, ProxyResponse, RequestContextV2};
pub use handler::{Continue, ErrorMiddleware, Handler, Middleware, Next};
pub use logger::{Logger, NoLogger, TracingLogger};
pub use method::Method;
pub use middleware::{AddCorsOptions, add_cors_headers, create_api_error_handler, create_default_api_stack};
pub use pretty::{PrettyPrintOptions, pretty_print_response};
pub use proxy_path::extract_proxy_path;
pub use request::Request;
pub use response::{CookieOptions, CorsOptions, IntoResponse, Response, ResponseBuilder, SameSite};
pub use send_error::{ErrorResponse, send_error_response};
pub use status::Status;
pub use warmer::{LambdaWarmer, Warmer};
