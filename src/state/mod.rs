//! Composition tree snapshots pushed by the remote surface.
//!
//! These types are a passive data contract: the bridge transports and indexes them but does not
//! interpret element semantics.

/// A single node of the composition tree.
pub mod element;
/// Whole-composition snapshot plus editor flags.
pub mod renderer;
