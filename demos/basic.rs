//! Minimal stratus example: a users API fed with sample gateway events.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! In a deployed function, enable the `lambda` feature and call
//! `stratus::lambda::run(handler)` instead of feeding the sample events below.

use std::sync::Arc;

use serde_json::json;
use stratus::{
    Api, Context, Error, HandlerOptions, LambdaWarmer, Request, Response, Status, create_api_handler,
    logger,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let handler = create_api_handler(
        [users],
        HandlerOptions::default()
            .logger(logger::from_env())
            .warmer(Arc::new(LambdaWarmer)),
    );

    let events = [
        // GET /users/42 through a custom-domain mapping
        json!({
            "resource": "/{proxy+}",
            "path": "/prod/users/42",
            "httpMethod": "GET",
            "pathParameters": { "proxy": "users/42" },
        }),
        // POST /users without a name → ErrorWithDetails, 500
        json!({
            "resource": "/{proxy+}",
            "path": "/users",
            "httpMethod": "POST",
            "pathParameters": { "proxy": "users" },
            "body": "{}",
        }),
        // DELETE /users/7 → ApiError, 404
        json!({
            "resource": "/{proxy+}",
            "path": "/users/7",
            "httpMethod": "DELETE",
            "pathParameters": { "proxy": "users/7" },
        }),
        // keep-warm ping
        json!({ "warmer": true, "concurrency": 1 }),
    ];

    for event in events {
        let output = handler.handle_value(event, Context::with_request_id("demo-request")).await?;
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}

fn users(api: &mut Api) {
    api.get("/users/{id}", get_user)
        .post("/users", create_user)
        .delete("/users/{id}", delete_user);
}

// GET /users/{id}
async fn get_user(req: Request) -> Result<Response, Error> {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(&json!({ "id": id, "name": "alice" }))
}

// POST /users
async fn create_user(req: Request) -> Result<Response, Error> {
    let body: serde_json::Value = req.json()?.unwrap_or_default();
    match body.get("name").and_then(|n| n.as_str()) {
        Some(name) => Response::builder()
            .status(Status::Created)
            .header("location", "/users/99")
            .json(&json!({ "id": "99", "name": name })),
        None => Err(Error::with_details("Validation failed", json!({ "name": "required" }))),
    }
}

// DELETE /users/{id}
async fn delete_user(req: Request) -> Result<Status, Error> {
    match req.param("id") {
        Some("42") => Ok(Status::NoContent),
        Some(id) => Err(Error::api(Status::NotFound, format!("User {id} not found"), None)),
        None => Err(Error::other("missing id")),
    }
}
