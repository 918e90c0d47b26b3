use crate::types::{Node, NodeKind};
use core_types::NodeKey;

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Slot arena with generation counters.
///
/// Freeing a slot bumps its generation, so keys handed out for the previous
/// occupant stop resolving. Freed slots are reused LIFO.
pub(crate) struct DomArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl DomArena {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn insert(&mut self, kind: NodeKind) -> NodeKey {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(Node::new(kind));
            return NodeKey::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(Node::new(kind)),
        });
        NodeKey::new(index, 0)
    }

    pub(crate) fn get(&self, key: NodeKey) -> Option<&Node> {
        let slot = self.slots.get(key.index() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    pub(crate) fn get_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        let slot = self.slots.get_mut(key.index() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    pub(crate) fn contains(&self, key: NodeKey) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Frees `key`, its descendants, and any shadow trees attached below it.
    ///
    /// Returns the freed keys. Callers are responsible for detaching `key`
    /// from its parent first.
    pub(crate) fn free_subtree(&mut self, key: NodeKey) -> Vec<NodeKey> {
        let mut freed = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let Some(slot) = self.slots.get_mut(current.index() as usize) else {
                continue;
            };
            if slot.generation != current.generation() {
                continue;
            }
            let Some(node) = slot.node.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index());
            self.live -= 1;
            freed.push(current);

            stack.extend(node.children.iter().copied());
            if let Some(shadow) = node.attached_shadow_root() {
                stack.push(shadow);
            }
        }
        freed
    }
}
