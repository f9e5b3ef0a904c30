//! Response handling shared by provider transports and search backends
//!
//! Status classification into [`lgw_domain::FailureKind`] lives here so the
//! HTTP transports and the search backends agree on what is retryable.

mod http_response;

pub use http_response::HttpResponseUtils;
