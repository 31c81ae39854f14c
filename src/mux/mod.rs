//! Correlation-id request/reply multiplexing.

pub(crate) mod pending;
pub(crate) mod request;
