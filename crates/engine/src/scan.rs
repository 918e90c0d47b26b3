use crate::classify::Classifier;
use crate::config::EngineConfig;
use crate::guard::ReentrancyGuard;
use dom::traverse::TreeWalker;
use dom::{Document, NodeKey};
use rules::RuleSet;
use std::borrow::Cow;

/// Rewrites the eligible text leaves of one tree.
#[derive(Clone, Debug)]
pub struct Scanner {
    classifier: Classifier,
    rules: RuleSet,
    min_text_len: usize,
}

impl Scanner {
    pub fn new(config: &EngineConfig, rules: RuleSet) -> Self {
        Self {
            classifier: Classifier::new(config),
            rules,
            min_text_len: config.min_text_len,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Rewrites every eligible text leaf below `root`, or `root` itself when it
    /// is a text leaf. Shadow trees are not entered.
    ///
    /// Returns the number of leaves whose content changed.
    pub fn scan(&self, doc: &mut Document, root: NodeKey, guard: &ReentrancyGuard) -> usize {
        if guard.is_writing() || !self.classifier.is_eligible(doc, root) {
            return 0;
        }
        let leaves: Vec<NodeKey> = if doc.node(root).is_some_and(|n| n.is_text()) {
            vec![root]
        } else {
            TreeWalker::new(doc, root, |d: &Document, k| self.classifier.filter(d, k)).collect()
        };
        let changed = leaves
            .into_iter()
            .filter(|&leaf| self.rewrite(doc, leaf, guard))
            .count();
        if changed > 0 {
            log::debug!(target: "engine", "scan of {root:?} rewrote {changed} leaves");
        }
        changed
    }

    /// Re-checks one text leaf and rewrites it if needed. Detached leaves and
    /// non-text nodes are ignored.
    pub fn scan_leaf(&self, doc: &mut Document, leaf: NodeKey, guard: &ReentrancyGuard) -> bool {
        let Some(node) = doc.node(leaf) else {
            return false;
        };
        if guard.is_writing() || !node.is_text() || node.parent().is_none() {
            return false;
        }
        self.classifier.is_eligible(doc, leaf) && self.rewrite(doc, leaf, guard)
    }

    /// The rule set output for `text`, or `text` itself when it is shorter
    /// than the minimum length.
    pub fn rewrite_text<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if text.chars().count() < self.min_text_len {
            return Cow::Borrowed(text);
        }
        self.rules.apply(text)
    }

    fn rewrite(&self, doc: &mut Document, leaf: NodeKey, guard: &ReentrancyGuard) -> bool {
        let Some(text) = doc.text(leaf) else {
            return false;
        };
        let rewritten = match self.rewrite_text(text) {
            Cow::Owned(s) => s,
            Cow::Borrowed(_) => return false,
        };
        let Some(_scope) = guard.enter() else {
            return false;
        };
        match doc.set_text(leaf, rewritten) {
            Ok(()) => {
                log::trace!(target: "engine", "rewrote {leaf:?}");
                true
            }
            Err(err) => {
                log::debug!(target: "engine", "skipping {leaf:?}: {err}");
                false
            }
        }
    }
}
