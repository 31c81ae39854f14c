//! Host-side bridge for an embedded, remotely rendered preview surface.
//!
//! The surface is a black box reachable only through asynchronous, unordered JSON messages. This
//! crate turns that channel into:
//!
//! - awaitable requests, matched to replies by correlation id ([`Player::request`])
//! - fire-and-forget commands ([`Player::load_template`], [`Player::set_modifications`], ...)
//! - named events for unsolicited notifications ([`Player::on`], [`Player::once`])
//! - a typed view of the composition tree the surface reports ([`RendererState`]), with
//!   derived queries such as [`collect_dynamic_elements`]
//!
//! # Trust boundary
//!
//! Inbound messages are accepted only from the configured endpoint's origin. Untrusted,
//! malformed and unmatched messages are dropped and reported as [`Delivery::Dropped`]; they are
//! never surfaced as errors. The only failures a caller observes are its own request timing out
//! or the channel being disposed underneath it.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod events;
mod foundation;
mod mux;
mod query;
mod session;

/// Wire contract: envelopes, message kinds, typed commands.
pub mod protocol;
/// Composition tree snapshots.
pub mod state;
/// Surface ownership and inbound authentication.
pub mod transport;

pub use events::dispatcher::{EventDispatcher, EventEmitter, Listener, ListenerId};
pub use foundation::config::{
    DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_MS, PlayerConfig, SurfaceKind, validate_token,
};
pub use foundation::error::{PreviewError, PreviewResult};
pub use mux::pending::{PendingTable, Reply};
pub use mux::request::Multiplexer;
pub use protocol::capture::{CapturedImage, ImageFormat};
pub use protocol::command::{Command, Query};
pub use protocol::message::{Body, Envelope, EnvelopeError, MessageKind};
pub use protocol::modifications::Modifications;
pub use query::dynamic::{
    ElementTree, collect_dynamic_elements, collect_dynamic_sources, filter_dynamic_top_level,
};
pub use session::bridge::Delivery;
pub use session::player::{PendingReply, Player};
pub use state::element::ElementState;
pub use state::renderer::RendererState;
pub use transport::channel::{DropReason, Transport};
pub use transport::surface::{
    Container, InMemoryContainer, InboundMessage, MpscContainer, Surface, SurfaceLog,
    SurfaceRecord,
};
