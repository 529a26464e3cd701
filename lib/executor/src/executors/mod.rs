pub mod common;
pub mod error;
pub mod http;
pub mod local;
pub mod sse;
