//! `lambda_runtime` adapter, behind the `lambda` feature.
//!
//! ```rust,no_run
//! use stratus::{Api, HandlerOptions, create_api_handler};
//!
//! fn routes(api: &mut Api) {}
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lambda_runtime::Error> {
//!     stratus::lambda::run(create_api_handler([routes], HandlerOptions::default())).await
//! }
//! ```

use lambda_runtime::{LambdaEvent, service_fn};
use serde_json::Value;

use crate::api_handler::ApiHandler;
use crate::event::Context;

impl From<lambda_runtime::Context> for Context {
    fn from(context: lambda_runtime::Context) -> Self {
        let config = &context.env_config;
        Self {
            aws_request_id: Some(context.request_id.clone()).filter(|id| !id.is_empty()),
            function_name: Some(config.function_name.clone()).filter(|v| !v.is_empty()),
            function_version: Some(config.version.clone()).filter(|v| !v.is_empty()),
            invoked_function_arn: Some(context.invoked_function_arn.clone()).filter(|v| !v.is_empty()),
            memory_limit_in_mb: Some(config.memory.to_string()).filter(|_| config.memory > 0),
            log_group_name: Some(config.log_group.clone()).filter(|v| !v.is_empty()),
            log_stream_name: Some(config.log_stream.clone()).filter(|v| !v.is_empty()),
        }
    }
}

/// Serves `handler` on the Lambda runtime until the process is stopped.
/// Each invocation goes through [`ApiHandler::handle_value`].
pub async fn run(handler: ApiHandler) -> Result<(), lambda_runtime::Error> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = handler.clone();
        async move {
            let (payload, context) = event.into_parts();
            let output = handler.handle_value(payload, context.into()).await?;
            Ok::<_, lambda_runtime::Error>(output)
        }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_context_maps_to_invocation_context() {
        let mut runtime = lambda_runtime::Context::default();
        runtime.request_id = "req-7".to_owned();
        runtime.invoked_function_arn = "arn:aws:lambda:eu-west-1:1:function:users".to_owned();

        let context = Context::from(runtime);
        assert_eq!(context.aws_request_id.as_deref(), Some("req-7"));
        assert_eq!(context.invoked_function_arn.as_deref(), Some("arn:aws:lambda:eu-west-1:1:function:users"));
        assert_eq!(context.function_name, None);
    }
}
