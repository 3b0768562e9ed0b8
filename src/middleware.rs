//! HTTP request logging middleware for axum
//!
//! Emits exactly one `info` record per request, after the rest of the
//! handler chain has produced a response. The record's message is the
//! request path and its fields describe the exchange:
//! `status`, `method`, `path`, `query`, `ip`, `user-agent`, `errors`, `cost`.
//!
//! ```no_run
//! use axum::{middleware, routing::get, Router};
//! use pzlog::{build_logger, middleware::request_logging};
//!
//! let logger = build_logger(None);
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "ok" }))
//!     .layer(middleware::from_fn_with_state(logger, request_logging));
//! ```

use crate::core::{Fields, Logger};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponseParts, Response, ResponseParts},
};
use std::convert::Infallible;
use std::fmt::Write as _;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Who an attached error is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Logged with the request, never shown to the client
    Private,
    /// Safe to expose to the client
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Errors a handler attaches to its response
///
/// Return it as a response part; the middleware picks it up from the
/// response extensions and logs the private ones.
///
/// ```
/// use axum::http::StatusCode;
/// use axum::response::IntoResponse;
/// use pzlog::middleware::RequestErrors;
///
/// async fn handler() -> impl IntoResponse {
///     (StatusCode::NOT_FOUND, RequestErrors::private("item 5 missing"), "not found")
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestErrors(Vec<RequestError>);

impl RequestErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn private(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push_private(message);
        errors
    }

    pub fn push_private(&mut self, message: impl Into<String>) {
        self.0.push(RequestError {
            kind: ErrorKind::Private,
            message: message.into(),
        });
    }

    pub fn push_public(&mut self, message: impl Into<String>) {
        self.0.push(RequestError {
            kind: ErrorKind::Public,
            message: message.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestError> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors of one kind as numbered lines: `Error #01: ...`
    pub fn joined(&self, kind: ErrorKind) -> String {
        let mut out = String::new();
        for (idx, error) in self.0.iter().filter(|e| e.kind == kind).enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            let _ = write!(out, "Error #{:02}: {}", idx + 1, error.message);
        }
        out
    }
}

impl IntoResponseParts for RequestErrors {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        match res.extensions_mut().get_mut::<RequestErrors>() {
            Some(existing) => existing.0.extend(self.0),
            None => {
                res.extensions_mut().insert(self);
            }
        }
        Ok(res)
    }
}

/// What gets logged about one request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    pub path: String,
    pub query: String,
    pub method: String,
    pub ip: String,
    pub user_agent: String,
    pub status: u16,
    pub errors: String,
    pub cost: Duration,
}

impl RequestRecord {
    pub fn fields(&self) -> Fields {
        Fields::new()
            .with_field("status", self.status)
            .with_field("method", &self.method)
            .with_field("path", &self.path)
            .with_field("query", &self.query)
            .with_field("ip", &self.ip)
            .with_field("user-agent", &self.user_agent)
            .with_field("errors", &self.errors)
            .with_field("cost", self.cost)
    }

    #[track_caller]
    pub fn emit(&self, logger: &Logger) {
        logger.info_with_fields(self.path.clone(), self.fields());
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Client address: forwarding headers first, then the socket peer.
pub fn client_ip(request: &Request) -> String {
    let headers = request.headers();
    let forwarded = header_str(headers, "x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    if let Some(ip) = header_str(headers, "x-real-ip")
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}

/// Log one record per request once the response is ready.
///
/// Install with `axum::middleware::from_fn_with_state(logger, request_logging)`.
pub async fn request_logging(
    State(logger): State<Logger>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    // Read before `next` so later routing changes don't leak in
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or_default().to_string();
    let method = request.method().to_string();
    let ip = client_ip(&request);
    let user_agent = header_str(request.headers(), header::USER_AGENT)
        .unwrap_or_default()
        .to_string();

    let response = next.run(request).await;
    let cost = start.elapsed();

    let errors = response
        .extensions()
        .get::<RequestErrors>()
        .map(|errors| errors.joined(ErrorKind::Private))
        .unwrap_or_default();

    RequestRecord {
        path,
        query,
        method,
        ip,
        user_agent,
        status: response.status().as_u16(),
        errors,
        cost,
    }
    .emit(&logger);

    response
}
