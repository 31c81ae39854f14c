//! Read-only derived views over composition trees.

pub(crate) mod dynamic;
