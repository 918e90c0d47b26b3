use crate::arena::DomArena;
use crate::frame::{FrameCallback, FrameQueue};
use crate::mutation::{MutationCallback, MutationObserverInit, MutationRecord, ObserverList};
use crate::shadow::{AttachShadow, NativeAttachShadow};
use crate::types::{Node, NodeKind, ShadowRootInit, ShadowRootMode, is_valid_shadow_host_name};
use crate::DomError;
use core_types::{NodeKey, ObserverId, ReadyState};
use std::rc::Rc;
use std::sync::Arc;

/// A live document tree.
///
/// Invariants:
/// - The document node is created with the document and never destroyed.
/// - A node has at most one parent; shadow roots have none.
/// - Element names and attribute names are stored ASCII-lowercase.
/// - Every structural or content mutation produces exactly one
///   [`MutationRecord`], delivered before the mutating call returns.
pub struct Document {
    arena: DomArena,
    root: NodeKey,
    ready_state: ReadyState,
    observers: ObserverList,
    attach_shadow: Rc<dyn AttachShadow>,
    frames: FrameQueue,
    content_loaded: Vec<FrameCallback>,
}

impl Document {
    pub fn new() -> Self {
        let mut arena = DomArena::new();
        let root = arena.insert(NodeKind::Document);
        Self {
            arena,
            root,
            ready_state: ReadyState::Loading,
            observers: ObserverList::default(),
            attach_shadow: Rc::new(NativeAttachShadow),
            frames: FrameQueue::default(),
            content_loaded: Vec::new(),
        }
    }

    // ---- queries -------------------------------------------------------

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.arena.get(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.arena.contains(key)
    }

    /// Number of live nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.arena.get(key).and_then(Node::parent)
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.arena.get(key).map(Node::children).unwrap_or(&[])
    }

    pub fn text(&self, key: NodeKey) -> Option<&str> {
        self.arena.get(key).and_then(Node::text)
    }

    pub fn tag_name(&self, key: NodeKey) -> Option<&str> {
        self.arena.get(key).and_then(Node::tag_name)
    }

    pub fn attribute(&self, key: NodeKey, name: &str) -> Option<&str> {
        self.arena.get(key).and_then(|n| n.attribute(name))
    }

    /// The open shadow root attached to `host`, if any.
    ///
    /// Closed roots are not reachable from their host.
    pub fn shadow_root(&self, host: NodeKey) -> Option<NodeKey> {
        let root = self.arena.get(host)?.attached_shadow_root()?;
        match self.arena.get(root)?.kind {
            NodeKind::ShadowRoot {
                mode: ShadowRootMode::Open,
                ..
            } => Some(root),
            _ => None,
        }
    }

    /// Host element of a shadow root.
    pub fn host(&self, shadow_root: NodeKey) -> Option<NodeKey> {
        match self.arena.get(shadow_root)?.kind {
            NodeKind::ShadowRoot { host, .. } => Some(host),
            _ => None,
        }
    }

    pub fn shadow_mode(&self, shadow_root: NodeKey) -> Option<ShadowRootMode> {
        match self.arena.get(shadow_root)?.kind {
            NodeKind::ShadowRoot { mode, .. } => Some(mode),
            _ => None,
        }
    }

    /// First element child of the document node.
    pub fn document_element(&self) -> Option<NodeKey> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|&k| self.arena.get(k).is_some_and(Node::is_element))
    }

    pub fn body(&self) -> Option<NodeKey> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&k| self.tag_name(k) == Some("body"))
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    // ---- construction --------------------------------------------------

    pub fn create_element(&mut self, name: &str) -> NodeKey {
        self.arena.insert(NodeKind::Element {
            name: Arc::from(name.to_ascii_lowercase()),
            attributes: Vec::new(),
            shadow_root: None,
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeKey {
        self.arena.insert(NodeKind::Text { text: text.into() })
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeKey {
        self.arena.insert(NodeKind::Comment { text: text.into() })
    }

    // ---- mutation ------------------------------------------------------

    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.insert_child(parent, child, None)
    }

    /// Inserts `child` before `before`, or appends when `before` is `None`.
    ///
    /// A child that already has a parent is removed from it first, which is
    /// observable as a separate removal record.
    pub fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: Option<NodeKey>,
    ) -> Result<(), DomError> {
        self.insert_child(parent, child, before)
    }

    fn insert_child(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: Option<NodeKey>,
    ) -> Result<(), DomError> {
        let parent_node = self.arena.get(parent).ok_or(DomError::MissingNode(parent))?;
        if !parent_node.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        let child_node = self.arena.get(child).ok_or(DomError::MissingNode(child))?;
        if !child_node.can_be_child() {
            return Err(DomError::InvalidChild(child));
        }
        if let Some(before) = before {
            if before == child {
                return Ok(());
            }
            if self.parent(before) != Some(parent) {
                return Err(DomError::InvalidSibling { parent, before });
            }
        }
        if self.composed_inclusive_ancestors(parent).any(|k| k == child) {
            return Err(DomError::CycleDetected { parent, child });
        }

        if self.parent(child).is_some() {
            self.remove(child)?;
        }

        let siblings = &mut self
            .arena
            .get_mut(parent)
            .ok_or(DomError::MissingNode(parent))?
            .children;
        let pos = match before {
            Some(before) => siblings
                .iter()
                .position(|&k| k == before)
                .ok_or(DomError::InvalidSibling { parent, before })?,
            None => siblings.len(),
        };
        siblings.insert(pos, child);
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }

        self.notify(MutationRecord::ChildList {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
        Ok(())
    }

    /// Detaches `node` from its parent. The node stays alive and may be
    /// re-inserted; use [`Document::destroy`] to free it.
    pub fn remove(&mut self, node: NodeKey) -> Result<(), DomError> {
        let Some(parent) = self
            .arena
            .get(node)
            .ok_or(DomError::MissingNode(node))?
            .parent
        else {
            return Ok(());
        };
        if let Some(parent_node) = self.arena.get_mut(parent) {
            parent_node.children.retain(|&k| k != node);
        }
        if let Some(n) = self.arena.get_mut(node) {
            n.parent = None;
        }
        self.notify(MutationRecord::ChildList {
            target: parent,
            added: Vec::new(),
            removed: vec![node],
        });
        Ok(())
    }

    /// Frees a detached subtree, including shadow trees hosted inside it.
    ///
    /// Keys into the subtree stop resolving and observers rooted inside it are
    /// dropped. Returns the number of freed nodes.
    pub fn destroy(&mut self, node: NodeKey) -> Result<usize, DomError> {
        let record = self.arena.get(node).ok_or(DomError::MissingNode(node))?;
        if node == self.root || matches!(record.kind, NodeKind::ShadowRoot { .. }) {
            return Err(DomError::WrongNodeKind(node));
        }
        if record.parent.is_some() {
            return Err(DomError::StillAttached(node));
        }
        let freed = self.arena.free_subtree(node);
        self.observers.forget_roots(&freed);
        log::trace!(target: "dom", "destroyed {} nodes under {node:?}", freed.len());
        Ok(freed.len())
    }

    /// Replaces the content of a text or comment node.
    ///
    /// A record is produced even when the content is unchanged.
    pub fn set_text(&mut self, key: NodeKey, text: impl Into<String>) -> Result<(), DomError> {
        let node = self.arena.get_mut(key).ok_or(DomError::MissingNode(key))?;
        let old_value = match &mut node.kind {
            NodeKind::Text { text: existing } | NodeKind::Comment { text: existing } => {
                std::mem::replace(existing, text.into())
            }
            _ => return Err(DomError::WrongNodeKind(key)),
        };
        self.notify(MutationRecord::CharacterData {
            target: key,
            old_value,
        });
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        key: NodeKey,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let node = self.arena.get_mut(key).ok_or(DomError::MissingNode(key))?;
        let NodeKind::Element { attributes, .. } = &mut node.kind else {
            return Err(DomError::WrongNodeKind(key));
        };
        let value = value.map(str::to_string);
        match attributes.iter_mut().find(|(k, _)| **k == *name) {
            Some((_, existing)) => *existing = value,
            None => attributes.push((Arc::from(name.as_str()), value)),
        }
        self.notify(MutationRecord::Attributes { target: key, name });
        Ok(())
    }

    pub fn remove_attribute(&mut self, key: NodeKey, name: &str) -> Result<bool, DomError> {
        let node = self.arena.get_mut(key).ok_or(DomError::MissingNode(key))?;
        let NodeKind::Element { attributes, .. } = &mut node.kind else {
            return Err(DomError::WrongNodeKind(key));
        };
        let before = attributes.len();
        attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        if attributes.len() == before {
            return Ok(false);
        }
        self.notify(MutationRecord::Attributes {
            target: key,
            name: name.to_ascii_lowercase(),
        });
        Ok(true)
    }

    // ---- shadow roots --------------------------------------------------

    /// Attaches a shadow root to `host` through the current
    /// [`AttachShadow`] implementation.
    pub fn attach_shadow(
        &mut self,
        host: NodeKey,
        init: ShadowRootInit,
    ) -> Result<NodeKey, DomError> {
        let attach = Rc::clone(&self.attach_shadow);
        attach.attach_shadow(self, host, init)
    }

    /// Replaces the shadow-root creation step with `wrap(current)`.
    pub fn wrap_attach_shadow(
        &mut self,
        wrap: impl FnOnce(Rc<dyn AttachShadow>) -> Rc<dyn AttachShadow>,
    ) {
        let current = Rc::clone(&self.attach_shadow);
        self.attach_shadow = wrap(current);
    }

    pub(crate) fn attach_shadow_native(
        &mut self,
        host: NodeKey,
        init: ShadowRootInit,
    ) -> Result<NodeKey, DomError> {
        let node = self.arena.get(host).ok_or(DomError::MissingNode(host))?;
        let NodeKind::Element {
            name, shadow_root, ..
        } = &node.kind
        else {
            return Err(DomError::WrongNodeKind(host));
        };
        if shadow_root.is_some() {
            return Err(DomError::ShadowRootExists(host));
        }
        if !is_valid_shadow_host_name(name) {
            return Err(DomError::UnsupportedShadowHost(host));
        }

        let root = self.arena.insert(NodeKind::ShadowRoot {
            host,
            mode: init.mode,
        });
        if let Some(NodeKind::Element { shadow_root, .. }) =
            self.arena.get_mut(host).map(|n| &mut n.kind)
        {
            *shadow_root = Some(root);
        }
        log::trace!(target: "dom", "attached {:?} shadow root {root:?} to {host:?}", init.mode);
        Ok(root)
    }

    // ---- observation ---------------------------------------------------

    pub fn observe(
        &mut self,
        root: NodeKey,
        init: MutationObserverInit,
        callback: Rc<dyn MutationCallback>,
    ) -> Result<ObserverId, DomError> {
        if !self.arena.contains(root) {
            return Err(DomError::MissingNode(root));
        }
        Ok(self.observers.register(root, init, callback))
    }

    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        self.observers.unregister(observer)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&mut self, record: MutationRecord) {
        if self.observers.len() == 0 {
            return;
        }
        let mut path = vec![record.target()];
        let mut current = record.target();
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        let callbacks = self.observers.interested(&record, &path);
        if callbacks.is_empty() {
            return;
        }
        let records = [record];
        for callback in callbacks {
            callback.on_mutations(self, &records);
        }
    }

    // ---- scheduling ----------------------------------------------------

    pub fn request_animation_frame(&mut self, callback: impl FnOnce(&mut Document) + 'static) {
        self.frames.push(Box::new(callback));
    }

    /// Runs one frame. Returns the number of callbacks it ran.
    pub fn run_animation_frame(&mut self) -> usize {
        let callbacks = self.frames.take();
        let count = callbacks.len();
        for callback in callbacks {
            callback(self);
        }
        count
    }

    /// Runs frames until none are pending or `max_frames` have run.
    /// Returns the number of frames that had work.
    pub fn run_until_idle(&mut self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.frames.len() > 0 {
            self.run_animation_frame();
            frames += 1;
        }
        frames
    }

    pub fn pending_frame_callbacks(&self) -> usize {
        self.frames.len()
    }

    pub fn frames_run(&self) -> u64 {
        self.frames.frames_run()
    }

    // ---- lifecycle -----------------------------------------------------

    /// Runs `callback` once parsing finishes; never runs it if the document
    /// is already past `Loading`.
    pub fn on_content_loaded(&mut self, callback: impl FnOnce(&mut Document) + 'static) {
        self.content_loaded.push(Box::new(callback));
    }

    /// Marks parsing as finished and runs the content-loaded callbacks.
    /// Calling it again is a no-op.
    pub fn finish_parsing(&mut self) {
        if self.ready_state != ReadyState::Loading {
            return;
        }
        self.ready_state = ReadyState::Interactive;
        for callback in std::mem::take(&mut self.content_loaded) {
            callback(self);
        }
    }

    // ---- helpers -------------------------------------------------------

    /// `key`, its parent, and so on, hopping from each shadow root to its
    /// host.
    pub fn composed_inclusive_ancestors(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> {
        std::iter::successors(Some(key), |&k| self.parent(k).or_else(|| self.host(k)))
            .take_while(|&k| self.arena.contains(k))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
