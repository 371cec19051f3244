//! Request handler module
//!
//! Routes `/` to the directory listing and every other path to the shared
//! file handler.

pub mod files;
pub mod listing;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
