//! HTTP response building module
//!
//! Provides builders for the status codes the file server answers with.
//! All responses share one boxed body type so that buffered pages and
//! streamed files can flow through the same service.

use futures::{Stream, TryStreamExt};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::header::{ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE};
use hyper::{Response, StatusCode};

use super::range::ByteRange;

/// Body type of every response produced by the server
pub type ResponseBody = UnsyncBoxBody<Bytes, std::io::Error>;

/// Body with no content
pub fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body holding one buffered chunk
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body produced lazily from a stream of chunks
pub fn stream_body<S>(chunks: S) -> ResponseBody
where
    S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
{
    StreamBody::new(chunks.map_ok(Frame::data)).boxed_unsync()
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_TYPE, "text/plain")
        .body(full_body("404 Not Found"))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(full_body("404 Not Found"))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, "text/plain")
        .header(ALLOW, "GET, HEAD")
        .body(full_body("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full_body("405 Method Not Allowed"))
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_RANGE, format!("bytes */{file_size}"))
        .body(full_body("Range Not Satisfiable"))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(full_body("Range Not Satisfiable"))
        })
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head {
        empty_body()
    } else {
        full_body(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(empty_body())
        })
}

/// Build 200 response carrying a whole non-media file
pub fn build_file_response(
    body: ResponseBody,
    content_type: &str,
    content_length: u64,
) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(empty_body())
        })
}

/// Build media response: 206 with `Content-Range` when `partial`, else 200
///
/// `range` is `None` only for an empty file.
pub fn build_media_response(
    body: ResponseBody,
    content_type: &str,
    range: Option<ByteRange>,
    total_size: u64,
    partial: bool,
) -> Response<ResponseBody> {
    let content_length = range.map_or(0, |r| r.len());
    let mut builder = Response::builder()
        .header(CONTENT_TYPE, content_type)
        .header(ACCEPT_RANGES, "bytes")
        .header(CONTENT_LENGTH, content_length);

    builder = match range {
        Some(r) if partial => builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(CONTENT_RANGE, r.content_range(total_size)),
        _ => builder.status(StatusCode::OK),
    };

    builder.body(body).unwrap_or_else(|e| {
        log_build_error(if partial { "206" } else { "200" }, &e);
        Response::new(empty_body())
    })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_bytes(resp: Response<ResponseBody>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_404() {
        let resp = build_404_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_bytes(resp).await, "404 Not Found");
    }

    #[test]
    fn test_416_carries_size() {
        let resp = build_416_response(5000);
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes */5000");
    }

    #[tokio::test]
    async fn test_html_head_has_length_but_no_body() {
        let resp = build_html_response("<p>hi</p>".to_string(), true);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "9");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[test]
    fn test_media_partial_headers() {
        let range = ByteRange { start: 1000, end: 1999 };
        let resp = build_media_response(empty_body(), "video/mp4", Some(range), 5000, true);
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes 1000-1999/5000");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "1000");
        assert_eq!(resp.headers()[ACCEPT_RANGES], "bytes");
    }

    #[test]
    fn test_media_full_has_no_content_range() {
        let range = ByteRange { start: 0, end: 4999 };
        let resp = build_media_response(empty_body(), "video/mp4", Some(range), 5000, false);
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(CONTENT_RANGE).is_none());
        assert_eq!(resp.headers()[CONTENT_LENGTH], "5000");
    }

    #[tokio::test]
    async fn test_stream_body_concatenates_chunks() {
        let chunks = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"he")),
            Ok(Bytes::from_static(b"llo")),
        ]);
        let resp = build_file_response(stream_body(chunks), "text/plain", 5);
        assert_eq!(body_bytes(resp).await, "hello");
    }
}
