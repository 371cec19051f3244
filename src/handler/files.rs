//! Shared file serving module
//!
//! Resolves request paths inside the shared root and answers with either a
//! whole-file body or, for media files, a range-aware streamed body.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::mime::{get_content_type, media_content_type};
use crate::http::response::{
    build_file_response, build_media_response, empty_body, stream_body,
};
use crate::http::{self, ByteRange, ChunkedReader, RangeParseResult, ResponseBody};
use crate::logger;
use futures::TryStreamExt;
use hyper::Response;
use std::path::{Component, Path, PathBuf};

/// A request path that resolved to a regular file inside the shared root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Canonical location on disk
    pub path: PathBuf,
    /// Decoded path relative to the root, as requested
    pub relative: PathBuf,
    pub size: u64,
}

/// Serve a file from the shared root, recording the client first
pub async fn serve_file(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    state.clients.insert(ctx.peer.ip());
    logger::log_client_request(&state.events, &ctx.peer, ctx.path);

    let Some(file) = resolve_path(&state.root, ctx.path).await else {
        return http::build_404_response();
    };

    match state.media.media_extension(&file.relative) {
        Some(ext) => serve_media(ctx, &file, &media_content_type(ext)).await,
        None => serve_whole_file(ctx, &file).await,
    }
}

/// Resolve a request path against the (canonical) shared root
///
/// Returns `None` when the path is empty, not valid percent-encoding,
/// climbs out of the root, or does not name a regular file.
pub async fn resolve_path(root: &Path, request_path: &str) -> Option<ResolvedFile> {
    let decoded = urlencoding::decode(request_path.trim_start_matches('/')).ok()?;
    let relative = PathBuf::from(decoded.as_ref());

    if relative.as_os_str().is_empty() {
        return None;
    }
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
        return None;
    }

    // File not found is common (404), no need to log at warning level
    let canonical = tokio::fs::canonicalize(root.join(&relative)).await.ok()?;
    if !canonical.starts_with(root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            request_path,
            canonical.display()
        ));
        return None;
    }

    let metadata = tokio::fs::metadata(&canonical).await.ok()?;
    if !metadata.is_file() {
        return None;
    }

    Some(ResolvedFile {
        path: canonical,
        relative,
        size: metadata.len(),
    })
}

/// Media path: always ranged, 206 only when the client sent a Range header
async fn serve_media(
    ctx: &RequestContext<'_>,
    file: &ResolvedFile,
    content_type: &str,
) -> Response<ResponseBody> {
    let range_header = ctx.range_header.as_deref();
    let (range, partial) = match http::parse_range_header(range_header, file.size) {
        RangeParseResult::Full(range) => (Some(range), false),
        RangeParseResult::Partial(range) => (Some(range), true),
        // Empty media file without a Range header: nothing to stream
        RangeParseResult::NotSatisfiable if range_header.is_none() => (None, false),
        RangeParseResult::NotSatisfiable => {
            logger::log_warning(&format!(
                "Unsatisfiable range {:?} for {} ({} bytes)",
                range_header.unwrap_or_default(),
                ctx.path,
                file.size
            ));
            return http::build_416_response(file.size);
        }
    };

    let body = match range {
        Some(range) if !ctx.is_head => match open_body(&file.path, range).await {
            Some(body) => body,
            None => return http::build_404_response(),
        },
        _ => empty_body(),
    };

    build_media_response(body, content_type, range, file.size, partial)
}

/// Non-media path: the whole file with a type guessed from its extension
async fn serve_whole_file(ctx: &RequestContext<'_>, file: &ResolvedFile) -> Response<ResponseBody> {
    let content_type = get_content_type(file.relative.extension().and_then(|e| e.to_str()));

    let body = match ByteRange::whole(file.size) {
        Some(range) if !ctx.is_head => match open_body(&file.path, range).await {
            Some(body) => body,
            None => return http::build_404_response(),
        },
        _ => empty_body(),
    };

    build_file_response(body, content_type, file.size)
}

/// Open a chunked body over `range`, logging failures
async fn open_body(path: &Path, range: ByteRange) -> Option<ResponseBody> {
    match ChunkedReader::open(path, range).await {
        Ok(reader) => {
            let path = path.to_path_buf();
            let chunks = reader
                .into_stream()
                .inspect_err(move |e| logger::log_stream_error(&path, e));
            Some(stream_body(chunks))
        }
        Err(e) => {
            logger::log_error(&format!("Failed to open file '{}': {e}", path.display()));
            None
        }
    }
}
