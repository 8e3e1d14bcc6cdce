//! Warm-up probes.
//!
//! Keep-warm schedulers invoke the function with a marker event instead of a
//! real request. A [`Warmer`] recognises those so the handler can answer
//! without touching routing.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;
use crate::event::Event;

#[async_trait]
pub trait Warmer: Send + Sync {
    /// `Ok(true)` when `event` is a warm-up probe. Errors are treated as
    /// "not a probe".
    async fn is_warmup(&self, event: &Event) -> Result<bool, Error>;
}

/// Recognises `{ "warmer": true }` (lambda-warmer) and
/// `{ "source": "serverless-plugin-warmup" }` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct LambdaWarmer;

#[async_trait]
impl Warmer for LambdaWarmer {
    async fn is_warmup(&self, event: &Event) -> Result<bool, Error> {
        let Event::Other(payload) = event else {
            return Ok(false);
        };
        let flagged = payload.get("warmer").and_then(Value::as_bool).unwrap_or(false);
        let plugin = payload.get("source").and_then(Value::as_str) == Some("serverless-plugin-warmup");
        Ok(flagged || plugin)
    }
}
