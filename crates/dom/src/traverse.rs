use crate::Document;
use crate::types::NodeKind;
use core_types::NodeKey;

/// Verdict of a [`TreeWalker`] filter for one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeFilter {
    /// Yield the node and descend into it.
    Accept,
    /// Do not yield the node, but descend into it.
    Skip,
    /// Do not yield the node and do not descend into it.
    Reject,
}

/// Pre-order walk over the descendants of a root (the root itself is not
/// visited), never entering shadow trees.
pub struct TreeWalker<'a, F> {
    doc: &'a Document,
    stack: Vec<NodeKey>,
    filter: F,
}

impl<'a, F> TreeWalker<'a, F>
where
    F: FnMut(&Document, NodeKey) -> NodeFilter,
{
    pub fn new(doc: &'a Document, root: NodeKey, filter: F) -> Self {
        let stack = doc.children(root).iter().rev().copied().collect();
        Self { doc, stack, filter }
    }
}

impl<F> Iterator for TreeWalker<'_, F>
where
    F: FnMut(&Document, NodeKey) -> NodeFilter,
{
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        while let Some(key) = self.stack.pop() {
            let verdict = (self.filter)(self.doc, key);
            if verdict == NodeFilter::Reject {
                continue;
            }
            self.stack
                .extend(self.doc.children(key).iter().rev().copied());
            if verdict == NodeFilter::Accept {
                return Some(key);
            }
        }
        None
    }
}

/// All descendants of `root` in tree order, not entering shadow trees.
pub fn descendants(doc: &Document, root: NodeKey) -> impl Iterator<Item = NodeKey> {
    TreeWalker::new(doc, root, |_: &Document, _: NodeKey| NodeFilter::Accept)
}

/// Parent chain of `key` within its own tree, nearest first. Stops at the
/// document node or at a shadow root.
pub fn tree_ancestors(doc: &Document, key: NodeKey) -> impl Iterator<Item = NodeKey> {
    std::iter::successors(doc.parent(key), |&k| doc.parent(k))
}

/// Root of the tree containing `key`: the document node, a shadow root, or
/// the top of a detached subtree.
pub fn tree_root(doc: &Document, key: NodeKey) -> NodeKey {
    tree_ancestors(doc, key).last().unwrap_or(key)
}

/// Whether `key` is reachable from the document node, following shadow
/// roots to their hosts.
pub fn is_connected(doc: &Document, key: NodeKey) -> bool {
    doc.composed_inclusive_ancestors(key)
        .any(|k| k == doc.root())
}

/// Open shadow roots hosted by `root` or any of its descendants, including
/// roots nested inside those shadow trees. Closed roots and everything
/// below them are not reported.
pub fn open_shadow_roots(doc: &Document, root: NodeKey) -> Vec<NodeKey> {
    let mut found = Vec::new();
    let mut stack = vec![root];
    while let Some(key) = stack.pop() {
        if let Some(shadow) = doc.shadow_root(key) {
            found.push(shadow);
            stack.push(shadow);
        }
        stack.extend(doc.children(key).iter().rev().copied());
    }
    found
}

/// Concatenated text of all text descendants, not entering shadow trees.
pub fn text_content(doc: &Document, root: NodeKey) -> String {
    if let Some(node) = doc.node(root)
        && let NodeKind::Text { text } = node.kind()
    {
        return text.clone();
    }
    let mut out = String::new();
    for key in descendants(doc, root) {
        if let Some(NodeKind::Text { text }) = doc.node(key).map(|n| n.kind()) {
            out.push_str(text);
        }
    }
    out
}

/// Text leaves under `root` in tree order, not entering shadow trees.
pub fn text_leaves(doc: &Document, root: NodeKey) -> Vec<NodeKey> {
    descendants(doc, root)
        .filter(|&k| doc.node(k).is_some_and(|n| n.is_text()))
        .collect()
}
