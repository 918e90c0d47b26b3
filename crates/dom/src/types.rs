use core_types::NodeKey;
use serde::Deserialize;
use std::sync::Arc;

/// Encapsulation mode of a shadow root.
///
/// Only `Open` roots are reachable from their host through
/// [`Document::shadow_root`](crate::Document::shadow_root).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowRootMode {
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadowRootInit {
    pub mode: ShadowRootMode,
}

impl ShadowRootInit {
    pub const OPEN: ShadowRootInit = ShadowRootInit {
        mode: ShadowRootMode::Open,
    };
    pub const CLOSED: ShadowRootInit = ShadowRootInit {
        mode: ShadowRootMode::Closed,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
    ShadowRoot,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Document,
    Element {
        name: Arc<str>,
        attributes: Vec<(Arc<str>, Option<String>)>,
        shadow_root: Option<NodeKey>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
    ShadowRoot {
        host: NodeKey,
        mode: ShadowRootMode,
    },
}

/// A node as stored in the document arena.
///
/// A shadow root has no parent: its host is reachable through
/// [`NodeKind::ShadowRoot`], and the host lists it in its `shadow_root`
/// field rather than among its children.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Document => NodeType::Document,
            NodeKind::Element { .. } => NodeType::Element,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Comment { .. } => NodeType::Comment,
            NodeKind::ShadowRoot { .. } => NodeType::ShadowRoot,
        }
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { text } | NodeKind::Comment { text } => Some(text),
            _ => None,
        }
    }

    /// Value of the first attribute named `name` (ASCII case-insensitive).
    ///
    /// A present attribute without a value reads as `Some("")`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_deref().unwrap_or("")),
            _ => None,
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    pub(crate) fn allows_children(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Document | NodeKind::Element { .. } | NodeKind::ShadowRoot { .. }
        )
    }

    pub(crate) fn can_be_child(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Element { .. } | NodeKind::Text { .. } | NodeKind::Comment { .. }
        )
    }

    pub(crate) fn attached_shadow_root(&self) -> Option<NodeKey> {
        match self.kind {
            NodeKind::Element { shadow_root, .. } => shadow_root,
            _ => None,
        }
    }
}

/// Elements that may host a shadow root: autonomous custom elements (names
/// containing `-`) plus a fixed list of flow-content elements.
pub(crate) fn is_valid_shadow_host_name(name: &str) -> bool {
    if name.contains('-') {
        return true;
    }
    matches!(
        name,
        "article"
            | "aside"
            | "blockquote"
            | "body"
            | "div"
            | "footer"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "main"
            | "nav"
            | "p"
            | "section"
            | "span"
    )
}
