//! HTTP protocol layer module
//!
//! Range parsing, chunked file bodies, MIME detection and response builders,
//! kept free of routing and server state.

pub mod chunked;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use chunked::{ChunkedReader, CHUNK_SIZE};
pub use mime::MediaTypes;
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_404_response, build_405_response, build_416_response, build_html_response,
    ResponseBody,
};
