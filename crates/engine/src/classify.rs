use crate::config::EngineConfig;
use dom::traverse::{NodeFilter, tree_ancestors};
use dom::{Document, Node, NodeKey};

/// Containers whose text is code, style or otherwise not prose.
const SKIP_TAGS: [&str; 5] = ["script", "style", "noscript", "code", "pre"];

/// Form controls that always hold user input.
const EDITABLE_TAGS: [&str; 4] = ["input", "textarea", "select", "option"];

const EDITABLE_ROLES: [&str; 4] = ["textbox", "searchbox", "combobox", "spinbutton"];

/// Decides which parts of a tree may be rewritten.
///
/// [`Classifier::blocks`] is the per-container verdict; both the single node
/// check and the traversal filter are built on it so they always agree.
#[derive(Clone, Debug)]
pub struct Classifier {
    skip_classes: Vec<String>,
    button_is_editable: bool,
    label_is_editable: bool,
}

impl Classifier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            skip_classes: config.skip_classes.clone(),
            button_is_editable: config.button_is_editable,
            label_is_editable: config.label_is_editable,
        }
    }

    /// Whether `node` is a container whose subtree must not be touched.
    pub fn blocks(&self, node: &Node) -> bool {
        let Some(tag) = node.tag_name() else {
            return false;
        };
        SKIP_TAGS.contains(&tag)
            || node
                .classes()
                .any(|class| self.skip_classes.iter().any(|skip| skip == class))
            || self.is_editable_surface(node)
    }

    /// Form controls, editing hosts and ARIA text widgets.
    pub fn is_editable_surface(&self, node: &Node) -> bool {
        let Some(tag) = node.tag_name() else {
            return false;
        };
        if EDITABLE_TAGS.contains(&tag)
            || (self.button_is_editable && tag == "button")
            || (self.label_is_editable && tag == "label")
        {
            return true;
        }
        if let Some(value) = node.attribute("contenteditable") {
            let value = value.trim();
            if value.is_empty()
                || value.eq_ignore_ascii_case("true")
                || value.eq_ignore_ascii_case("plaintext-only")
            {
                return true;
            }
        }
        node.attribute("role").is_some_and(|role| {
            EDITABLE_ROLES
                .iter()
                .any(|r| role.trim().eq_ignore_ascii_case(r))
        })
    }

    /// True when neither `key` nor any ancestor up to its tree root blocks.
    ///
    /// The walk stops at a shadow root; the host's ancestors are a different
    /// tree. Missing nodes are never eligible.
    pub fn is_eligible(&self, doc: &Document, key: NodeKey) -> bool {
        let Some(node) = doc.node(key) else {
            return false;
        };
        !self.blocks(node)
            && tree_ancestors(doc, key).all(|k| doc.node(k).is_some_and(|n| !self.blocks(n)))
    }

    /// [`TreeWalker`](dom::traverse::TreeWalker) filter yielding text leaves
    /// and pruning blocking containers with their subtree.
    pub fn filter(&self, doc: &Document, key: NodeKey) -> NodeFilter {
        match doc.node(key) {
            Some(node) if node.is_text() => NodeFilter::Accept,
            Some(node) if node.is_element() => {
                if self.blocks(node) {
                    NodeFilter::Reject
                } else {
                    NodeFilter::Skip
                }
            }
            _ => NodeFilter::Reject,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
