use crate::engine::EngineShared;
use dom::traverse::open_shadow_roots;
use dom::{Document, MutationCallback, MutationObserverInit, MutationRecord, NodeKey, ObserverId};
use std::collections::HashMap;
use std::rc::Rc;

/// Subscription used for every observed root.
pub const ROOT_OBSERVER_INIT: MutationObserverInit = MutationObserverInit {
    child_list: true,
    attributes: false,
    character_data: true,
    subtree: true,
};

/// Roots that already carry an engine subscription.
///
/// Keys are generational, so a freed root never matches a node that later
/// reuses its slot. Entries for freed roots are dropped by [`prune`].
///
/// [`prune`]: ObservedRootRegistry::prune
#[derive(Debug, Default)]
pub struct ObservedRootRegistry {
    roots: HashMap<NodeKey, ObserverId>,
}

impl ObservedRootRegistry {
    pub fn contains(&self, root: NodeKey) -> bool {
        self.roots.contains_key(&root)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn insert(&mut self, root: NodeKey, observer: ObserverId) {
        self.roots.insert(root, observer);
    }

    /// Drops entries whose root no longer resolves.
    pub fn prune(&mut self, doc: &Document) -> usize {
        let before = self.roots.len();
        self.roots.retain(|&root, _| doc.contains(root));
        before - self.roots.len()
    }
}

/// Mutation callback shared by all observed roots.
pub(crate) struct RootMutationHandler {
    pub(crate) shared: Rc<EngineShared>,
}

impl MutationCallback for RootMutationHandler {
    fn on_mutations(&self, doc: &mut Document, records: &[MutationRecord]) {
        let shared = &self.shared;
        if shared.guard.is_writing() {
            shared.bump(|s| s.suppressed_records += records.len() as u64);
            return;
        }
        for record in records {
            match record {
                MutationRecord::ChildList { added, .. } => {
                    for &node in added {
                        shared.enqueue(doc, node);
                        for shadow in open_shadow_roots(doc, node) {
                            shared.observe(doc, shadow);
                            shared.enqueue(doc, shadow);
                        }
                    }
                }
                MutationRecord::CharacterData { target, .. } => shared.enqueue(doc, *target),
                MutationRecord::Attributes { .. } => {}
            }
        }
    }
}
