//! Request handler module
//!
//! Responsible for request routing dispatch and the bird endpoints.

pub mod birds;
pub mod openapi;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
