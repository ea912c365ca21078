//! Bundled source implementations.
//!
//! Service-specific configuration lives here so the core streaming API can
//! remain transport-agnostic.
pub mod http;
