//! Share a local directory over HTTP with range-aware media streaming.
//!
//! The [`server::Server`] owns the start/stop lifecycle; every request is
//! answered by [`handler::handle_request`], which serves the directory
//! listing at `/` and files (whole or by byte range) everywhere else.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use error::ServerError;
pub use server::{Server, ServerSettings, ServerStatus};
