//! Route handlers, middleware signatures and the continuation token.
//!
//! # How async handlers are stored
//!
//! The route table holds handlers of *different* types in one radix tree per
//! method, so each handler is erased behind [`ErasedHandler`]:
//!
//! ```text
//! async fn get_user(req: Request) -> Result<Response, Error> { … }
//!        ↓ api.get("/users/{id}", get_user)
//! get_user.into_boxed_handler()                  ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(get_user))                  ← stored as BoxedHandler
//!        ↓
//! handler.call(req)  at request time             ← one vtable dispatch
//! ```
//!
//! # Continuation
//!
//! Middleware receive a [`Next`] token and must hand back the [`Continue`]
//! that only [`Next::call`] produces. The token is moved into `call`, so every
//! middleware continues the chain exactly once, and the compiler rejects one
//! that forgets to.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Continuation ──────────────────────────────────────────────────────────────

/// Move-only continuation handed to every middleware invocation.
pub struct Next {
    _private: (),
}

impl Next {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }

    /// Continue the chain.
    pub fn call(self) -> Continue {
        Continue { _private: () }
    }
}

/// Proof that a middleware called its [`Next`].
#[must_use]
pub struct Continue {
    _private: (),
}

// ── Middleware ────────────────────────────────────────────────────────────────

/// Success-path middleware: runs before the route handler.
pub type Middleware =
    dyn Fn(&mut Request, &mut Response, Next) -> Result<Continue, Error> + Send + Sync;

/// Error-path middleware: runs, in registration order, when anything in the
/// request's chain fails.
pub type ErrorMiddleware =
    dyn Fn(&Error, &Request, &mut Response, Next) -> Result<Continue, Error> + Send + Sync;

pub(crate) type BoxedMiddleware = Arc<Middleware>;
pub(crate) type BoxedErrorMiddleware = Arc<ErrorMiddleware>;

// ── Route handlers ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased handler future.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Result<Response, Error>> + Send + 'static>>;

/// Internal dispatch interface.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler:
///
/// ```text
/// async fn name(req: Request) -> Result<impl IntoResponse, Error>
/// ```
///
/// Returning `Err` hands the error to the error middleware chain.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.map(IntoResponse::into_response) })
    }
}
