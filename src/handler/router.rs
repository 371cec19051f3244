//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, dispatch to
//! the listing or file handlers, and access logging.

use crate::config::AppState;
use crate::handler::{files, listing};
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{CONTENT_LENGTH, RANGE, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub peer: SocketAddr,
    pub method: Method,
    pub is_head: bool,
    pub range_header: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    peer: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    // GET and HEAD carry no body worth reading
    let (parts, _) = req.into_parts();

    let ctx = RequestContext {
        path: parts.uri.path(),
        peer,
        is_head: parts.method == Method::HEAD,
        method: parts.method.clone(),
        range_header: header_string(&parts, RANGE),
    };

    let response = route_request(&ctx, &state).await;

    if state.access_log {
        log_access(&ctx, &parts, &response, &state, started);
    }

    Ok(response)
}

/// Route request based on method and path
async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    match ctx.method {
        Method::GET | Method::HEAD => {}
        _ => {
            logger::log_warning(&format!("Method not allowed: {} {}", ctx.method, ctx.path));
            return http::build_405_response();
        }
    }

    if ctx.path == "/" {
        listing::serve_listing(ctx, state).await
    } else {
        files::serve_file(ctx, state).await
    }
}

fn header_string(parts: &Parts, name: hyper::header::HeaderName) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn log_access(
    ctx: &RequestContext<'_>,
    parts: &Parts,
    response: &Response<ResponseBody>,
    state: &AppState,
    started: Instant,
) {
    let mut entry = AccessLogEntry::new(
        ctx.peer.ip().to_string(),
        ctx.method.to_string(),
        ctx.path.to_string(),
    );
    entry.http_version = match parts.version {
        hyper::Version::HTTP_10 => "1.0".to_string(),
        _ => "1.1".to_string(),
    };
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.range.clone_from(&ctx.range_header);
    entry.referer = header_string(parts, REFERER);
    entry.user_agent = header_string(parts, USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.access_log_format);
}
