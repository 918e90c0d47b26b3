//! Live document tree for the rewrite engine.
//!
//! The model is a small subset of a browser DOM: elements, text, comments,
//! shadow roots, synchronous mutation observers, an animation-frame queue and
//! a ready state. Nodes live in a generational arena and are addressed by
//! [`NodeKey`].

mod arena;
mod document;
mod error;
mod frame;
pub mod mutation;
pub mod shadow;
pub mod snapshot;
pub mod traverse;
mod types;

pub use core_types::{NodeKey, ObserverId, ReadyState};
pub use document::Document;
pub use error::{DomError, SnapshotError};
pub use mutation::{MutationCallback, MutationObserverInit, MutationRecord};
pub use shadow::{AttachShadow, NativeAttachShadow};
pub use types::{Node, NodeKind, NodeType, ShadowRootInit, ShadowRootMode};

#[cfg(test)]
mod tests;
