//! Mutation observation.
//!
//! Records are delivered synchronously: every mutating call on
//! [`Document`] hands its record to each interested callback before it
//! returns. Callbacks receive the document mutably and may mutate it again;
//! those nested mutations are delivered the same way.
//!
//! Scoping follows the tree, not the composed tree: an observer on the
//! document does not see mutations inside shadow trees, because a shadow
//! root has no parent.

use crate::Document;
use core_types::{NodeKey, ObserverId};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRecord {
    ChildList {
        target: NodeKey,
        added: Vec<NodeKey>,
        removed: Vec<NodeKey>,
    },
    Attributes {
        target: NodeKey,
        name: String,
    },
    CharacterData {
        target: NodeKey,
        old_value: String,
    },
}

impl MutationRecord {
    pub fn target(&self) -> NodeKey {
        match self {
            MutationRecord::ChildList { target, .. }
            | MutationRecord::Attributes { target, .. }
            | MutationRecord::CharacterData { target, .. } => *target,
        }
    }
}

impl MutationObserverInit {
    fn accepts(&self, record: &MutationRecord) -> bool {
        match record {
            MutationRecord::ChildList { .. } => self.child_list,
            MutationRecord::Attributes { .. } => self.attributes,
            MutationRecord::CharacterData { .. } => self.character_data,
        }
    }
}

pub trait MutationCallback {
    fn on_mutations(&self, doc: &mut Document, records: &[MutationRecord]);
}

impl<F> MutationCallback for F
where
    F: Fn(&mut Document, &[MutationRecord]),
{
    fn on_mutations(&self, doc: &mut Document, records: &[MutationRecord]) {
        self(doc, records)
    }
}

pub(crate) struct Registration {
    pub(crate) id: ObserverId,
    pub(crate) root: NodeKey,
    pub(crate) init: MutationObserverInit,
    pub(crate) callback: Rc<dyn MutationCallback>,
}

#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl ObserverList {
    pub(crate) fn register(
        &mut self,
        root: NodeKey,
        init: MutationObserverInit,
        callback: Rc<dyn MutationCallback>,
    ) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.registrations.push(Registration {
            id,
            root,
            init,
            callback,
        });
        id
    }

    pub(crate) fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        self.registrations.len() != before
    }

    /// Drops registrations rooted at any of `freed`.
    pub(crate) fn forget_roots(&mut self, freed: &[NodeKey]) {
        self.registrations.retain(|r| !freed.contains(&r.root));
    }

    pub(crate) fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Callbacks interested in `record`, in registration order.
    ///
    /// `tree_path` is the target followed by its ancestors up to the root of
    /// its tree.
    pub(crate) fn interested(
        &self,
        record: &MutationRecord,
        tree_path: &[NodeKey],
    ) -> Vec<Rc<dyn MutationCallback>> {
        let Some((&target, ancestors)) = tree_path.split_first() else {
            return Vec::new();
        };
        self.registrations
            .iter()
            .filter(|r| r.init.accepts(record))
            .filter(|r| r.root == target || (r.init.subtree && ancestors.contains(&r.root)))
            .map(|r| Rc::clone(&r.callback))
            .collect()
    }
}
