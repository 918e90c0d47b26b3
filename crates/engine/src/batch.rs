use crate::guard::ReentrancyGuard;
use crate::scan::Scanner;
use dom::traverse::is_connected;
use dom::{Document, NodeKey, NodeType};
use std::collections::HashSet;

/// Nodes waiting for the next flush, deduplicated, in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct PendingSet {
    order: Vec<NodeKey>,
    members: HashSet<NodeKey>,
}

impl PendingSet {
    /// Returns `false` if `node` was already pending.
    pub fn insert(&mut self, node: NodeKey) -> bool {
        if !self.members.insert(node) {
            return false;
        }
        self.order.push(node);
        true
    }

    pub fn contains(&self, node: NodeKey) -> bool {
        self.members.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn drain(&mut self) -> Vec<NodeKey> {
        self.members.clear();
        std::mem::take(&mut self.order)
    }
}

/// Coalesces a burst of changes into one flush.
#[derive(Debug, Default)]
pub struct ChangeBatcher {
    pending: PendingSet,
    scheduled: bool,
}

impl ChangeBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node` to the pending set. Returns `true` when the caller must
    /// schedule a flush, which happens once per burst.
    pub fn enqueue(&mut self, node: NodeKey) -> bool {
        self.pending.insert(node);
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    /// Empties the pending set and allows the next enqueue to schedule.
    pub fn take(&mut self) -> Vec<NodeKey> {
        self.scheduled = false;
        self.pending.drain()
    }

    pub fn pending(&self) -> &PendingSet {
        &self.pending
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    pub nodes: usize,
    pub stale: usize,
    pub changed: usize,
}

/// Scans each node of a drained batch according to its kind.
///
/// Nodes that were freed or detached since they were queued are skipped.
pub fn flush_batch(
    doc: &mut Document,
    batch: &[NodeKey],
    scanner: &Scanner,
    guard: &ReentrancyGuard,
) -> FlushOutcome {
    let mut outcome = FlushOutcome {
        nodes: batch.len(),
        ..FlushOutcome::default()
    };
    for &node in batch {
        if !is_connected(doc, node) {
            outcome.stale += 1;
            continue;
        }
        let Some(node_type) = doc.node(node).map(|n| n.node_type()) else {
            outcome.stale += 1;
            continue;
        };
        outcome.changed += match node_type {
            NodeType::Text => usize::from(scanner.scan_leaf(doc, node, guard)),
            NodeType::Element => {
                let mut changed = scanner.scan(doc, node, guard);
                if let Some(shadow) = doc.shadow_root(node) {
                    changed += scanner.scan(doc, shadow, guard);
                }
                changed
            }
            NodeType::ShadowRoot | NodeType::Document => scanner.scan(doc, node, guard),
            NodeType::Comment => 0,
        };
    }
    outcome
}
