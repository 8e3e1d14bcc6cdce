//! Cross-cutting middleware: CORS, error classification, and the default
//! stack combining them.
//!
//! ```rust
//! use std::sync::Arc;
//! use stratus::{Api, NoLogger, middleware};
//!
//! let mut api = Api::default();
//! api.register(middleware::create_default_api_stack(Arc::new(NoLogger)));
//! ```

pub mod cors;
pub mod error_handler;
pub mod stack;

pub use cors::{AddCorsOptions, add_cors_headers};
pub use error_handler::create_api_error_handler;
pub use stack::create_default_api_stack;
