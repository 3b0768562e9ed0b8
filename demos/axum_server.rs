//! An axum server that logs every request.
//!
//! Run with: cargo run --example axum_server
//! Then: curl -H 'X-Forwarded-For: 203.0.113.7' 'http://127.0.0.1:3000/items?id=5'

use axum::{extract::Query, http::StatusCode, middleware, response::IntoResponse, routing::get, Router};
use pzlog::middleware::{request_logging, RequestErrors};
use pzlog::{build_logger, Config};
use std::collections::HashMap;
use std::net::SocketAddr;

async fn item(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    match params.get("id").map(String::as_str) {
        Some("1") => (StatusCode::OK, RequestErrors::new(), "widget".to_string()),
        Some(id) => (
            StatusCode::NOT_FOUND,
            RequestErrors::private(format!("item {} missing", id)),
            "not found".to_string(),
        ),
        None => (
            StatusCode::BAD_REQUEST,
            RequestErrors::private("missing id parameter"),
            "bad request".to_string(),
        ),
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let logger = build_logger(Some(Config {
        filename: "./logs/axum_server.log".to_string(),
        print_console: true,
        encoder: "console".to_string(),
        ..Config::default()
    }));

    let app = Router::new()
        .route("/items", get(item))
        .layer(middleware::from_fn_with_state(logger.clone(), request_logging));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    logger.info("listening on 127.0.0.1:3000");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
