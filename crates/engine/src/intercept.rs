use crate::engine::EngineShared;
use dom::{AttachShadow, Document, DomError, NodeKey, ShadowRootInit, ShadowRootMode};
use std::rc::Rc;

/// Wraps the document's shadow-root creation so new open roots are observed
/// and scanned.
///
/// The result of the wrapped implementation is returned unchanged, errors
/// included.
pub struct ShadowRootInterceptor {
    inner: Rc<dyn AttachShadow>,
    shared: Rc<EngineShared>,
}

impl ShadowRootInterceptor {
    pub(crate) fn new(inner: Rc<dyn AttachShadow>, shared: Rc<EngineShared>) -> Self {
        Self { inner, shared }
    }
}

impl AttachShadow for ShadowRootInterceptor {
    fn attach_shadow(
        &self,
        doc: &mut Document,
        host: NodeKey,
        init: ShadowRootInit,
    ) -> Result<NodeKey, DomError> {
        let root = self.inner.attach_shadow(doc, host, init)?;
        if init.mode == ShadowRootMode::Open {
            self.shared.observe(doc, root);
            self.shared.enqueue(doc, root);
        } else {
            log::trace!(target: "engine", "ignoring closed shadow root on {host:?}");
        }
        Ok(root)
    }
}
