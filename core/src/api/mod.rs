//! Request pipeline: configuration-driven URLs and headers, bearer-token attachment, timeout and
//! retry, and translation of failures into user-facing errors.

pub mod auth;
pub mod client;
pub mod error;

pub use auth::*;
pub use client::*;
pub use error::*;
