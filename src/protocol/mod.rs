//! Wire contract between the host and the embedded surface.
//!
//! Every message is a flat JSON object `{ id?, message?, ...body }`. Requests and their replies
//! share an `id`; commands and events carry only a `message` name.

/// Captured still images.
pub mod capture;
/// Typed outbound commands and queries.
pub mod command;
/// Envelope parsing and message kinds.
pub mod message;
/// Host-side override set.
pub mod modifications;
