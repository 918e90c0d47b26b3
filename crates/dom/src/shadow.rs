//! Extension point for shadow-root creation.
//!
//! [`Document::attach_shadow`] does not create the root itself; it calls the
//! document's current [`AttachShadow`] implementation. Embedders that need to
//! react to every new shadow root wrap the current implementation with
//! [`Document::wrap_attach_shadow`]:
//!
//! ```
//! use dom::{AttachShadow, Document, DomError, NodeKey, ShadowRootInit};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! struct Counting {
//!     inner: Rc<dyn AttachShadow>,
//!     seen: Rc<Cell<usize>>,
//! }
//!
//! impl AttachShadow for Counting {
//!     fn attach_shadow(
//!         &self,
//!         doc: &mut Document,
//!         host: NodeKey,
//!         init: ShadowRootInit,
//!     ) -> Result<NodeKey, DomError> {
//!         let root = self.inner.attach_shadow(doc, host, init)?;
//!         self.seen.set(self.seen.get() + 1);
//!         Ok(root)
//!     }
//! }
//!
//! let mut doc = Document::new();
//! let seen = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&seen);
//! doc.wrap_attach_shadow(move |inner| {
//!     Rc::new(Counting { inner, seen: counter }) as Rc<dyn AttachShadow>
//! });
//!
//! let host = doc.create_element("div");
//! doc.attach_shadow(host, ShadowRootInit::OPEN).unwrap();
//! assert_eq!(seen.get(), 1);
//! ```

use crate::types::ShadowRootInit;
use crate::{Document, DomError};
use core_types::NodeKey;

pub trait AttachShadow {
    fn attach_shadow(
        &self,
        doc: &mut Document,
        host: NodeKey,
        init: ShadowRootInit,
    ) -> Result<NodeKey, DomError>;
}

/// The document's built-in shadow-root creation.
pub struct NativeAttachShadow;

impl AttachShadow for NativeAttachShadow {
    fn attach_shadow(
        &self,
        doc: &mut Document,
        host: NodeKey,
        init: ShadowRootInit,
    ) -> Result<NodeKey, DomError> {
        doc.attach_shadow_native(host, init)
    }
}
