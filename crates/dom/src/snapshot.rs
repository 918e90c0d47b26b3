//! JSON snapshots of a document and a compact textual outline.
//!
//! Snapshot format:
//!
//! ```json
//! { "children": [
//!     { "tag": "body", "attrs": { "class": "page" }, "children": [
//!         "plain text",
//!         { "comment": "a comment" },
//!         { "tag": "x-card", "shadow": { "mode": "open", "children": ["inside"] } }
//!     ] }
//! ] }
//! ```

use crate::types::{NodeKind, ShadowRootInit, ShadowRootMode};
use crate::{Document, DomError, SnapshotError};
use core_types::NodeKey;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DocumentSpec {
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Comment { comment: String },
    Element(ElementSpec),
}

#[derive(Clone, Debug, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
    #[serde(default)]
    pub shadow: Option<ShadowSpec>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShadowSpec {
    pub mode: ShadowRootMode,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl Document {
    /// Builds a document from a JSON snapshot. The document is left in
    /// `Loading`; call [`Document::finish_parsing`] when ready.
    pub fn from_json(json: &str) -> Result<Document, SnapshotError> {
        let spec: DocumentSpec = serde_json::from_str(json)?;
        let mut doc = Document::new();
        let root = doc.root();
        append_specs(&mut doc, root, &spec.children)?;
        Ok(doc)
    }
}

/// Appends nodes described by `specs` under `parent`, returning their keys.
pub fn append_specs(
    doc: &mut Document,
    parent: NodeKey,
    specs: &[NodeSpec],
) -> Result<Vec<NodeKey>, DomError> {
    let mut keys = Vec::with_capacity(specs.len());
    for spec in specs {
        let key = build_node(doc, spec)?;
        doc.append_child(parent, key)?;
        keys.push(key);
    }
    Ok(keys)
}

/// Builds a detached node (with its subtree) from `spec`.
pub fn build_node(doc: &mut Document, spec: &NodeSpec) -> Result<NodeKey, DomError> {
    match spec {
        NodeSpec::Text(text) => Ok(doc.create_text(text.as_str())),
        NodeSpec::Comment { comment } => Ok(doc.create_comment(comment.as_str())),
        NodeSpec::Element(element) => {
            let key = doc.create_element(&element.tag);
            for (name, value) in &element.attrs {
                doc.set_attribute(key, name, Some(value))?;
            }
            append_specs(doc, key, &element.children)?;
            if let Some(shadow) = &element.shadow {
                let root = doc.attach_shadow(key, ShadowRootInit { mode: shadow.mode })?;
                append_specs(doc, root, &shadow.children)?;
            }
            Ok(key)
        }
    }
}

const OUTLINE_TEXT_CAP: usize = 40;

fn clip(text: &str) -> String {
    let t = text.replace('\n', " ");
    let t = t.trim();
    if t.chars().count() > OUTLINE_TEXT_CAP {
        let head: String = t.chars().take(OUTLINE_TEXT_CAP).collect();
        format!("{head}…")
    } else {
        t.to_string()
    }
}

/// One line per node, indented by depth, at most `cap` lines. Open and
/// closed shadow roots are shown under their host.
pub fn outline(doc: &Document, root: NodeKey, cap: usize) -> Vec<String> {
    fn walk(doc: &Document, key: NodeKey, depth: usize, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        let Some(node) = doc.node(key) else {
            return;
        };
        *left -= 1;
        let indent = "  ".repeat(depth);
        match node.kind() {
            NodeKind::Document => out.push(format!("{indent}#document")),
            NodeKind::Element {
                name,
                attributes,
                shadow_root,
            } => {
                let mut line = format!("{indent}<{name}");
                for (k, v) in attributes {
                    match v {
                        Some(v) => line.push_str(&format!(r#" {k}="{v}""#)),
                        None => line.push_str(&format!(" {k}")),
                    }
                }
                line.push('>');
                out.push(line);
                if let Some(shadow) = shadow_root {
                    walk(doc, *shadow, depth + 1, out, left);
                }
            }
            NodeKind::Text { text } => {
                let t = clip(text);
                if t.is_empty() {
                    *left += 1;
                } else {
                    out.push(format!("{indent}\"{t}\""));
                }
            }
            NodeKind::Comment { text } => out.push(format!("{indent}<!-- {} -->", clip(text))),
            NodeKind::ShadowRoot { mode, .. } => {
                let mode = match mode {
                    ShadowRootMode::Open => "open",
                    ShadowRootMode::Closed => "closed",
                };
                out.push(format!("{indent}#shadow-root ({mode})"));
            }
        }
        for &child in node.children() {
            walk(doc, child, depth + 1, out, left);
        }
    }

    let mut out = Vec::new();
    let mut left = cap;
    walk(doc, root, 0, &mut out, &mut left);
    out
}
