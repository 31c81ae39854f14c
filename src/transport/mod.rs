//! Ownership of the embedded surface and the trust boundary for inbound traffic.

/// Surface lifecycle, outbound posting and inbound authentication.
pub mod channel;
/// Surface and container abstractions plus built-in implementations.
pub mod surface;
