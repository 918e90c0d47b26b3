#![allow(dead_code)]

use dom::traverse::{descendants, open_shadow_roots};
use dom::{Document, NodeKey};
use engine::{AUTO_MODE_KEY, Engine, EngineConfig, MemoryStore};

pub const MAX_FRAMES: usize = 16;

/// Parses a snapshot whose `<body>` holds `body_children` (a JSON array).
pub fn page(body_children: &str) -> Document {
    let json = format!(
        r#"{{"children": [{{"tag": "html", "children": [
            {{"tag": "head"}},
            {{"tag": "body", "children": {body_children}}}
        ]}}]}}"#
    );
    Document::from_json(&json).expect("test snapshot is valid")
}

pub fn install(doc: &mut Document, auto_mode: bool) -> Engine {
    let store = MemoryStore::new().with(AUTO_MODE_KEY, auto_mode);
    Engine::install(doc, &EngineConfig::default(), &store)
}

/// A parsed page with the engine installed and the initial pass done.
pub fn running(body_children: &str, auto_mode: bool) -> (Document, Engine) {
    let mut doc = page(body_children);
    let engine = install(&mut doc, auto_mode);
    doc.finish_parsing();
    (doc, engine)
}

pub fn body(doc: &Document) -> NodeKey {
    doc.body().expect("page has a body")
}

/// Runs frames until the queue drains. Panics if it never does.
pub fn settle(doc: &mut Document) -> usize {
    let frames = doc.run_until_idle(MAX_FRAMES);
    assert_eq!(
        doc.pending_frame_callbacks(),
        0,
        "frame queue did not drain after {MAX_FRAMES} frames"
    );
    frames
}

/// Every text leaf in the document, shadow trees included, in tree order.
pub fn all_texts(doc: &Document) -> Vec<String> {
    let root = doc.root();
    let mut roots = vec![root];
    roots.extend(open_shadow_roots(doc, root));
    roots
        .into_iter()
        .flat_map(|r| descendants(doc, r).collect::<Vec<_>>())
        .filter_map(|k| doc.node(k).filter(|n| n.is_text()).and_then(|n| n.text()))
        .map(str::to_string)
        .collect()
}

pub fn append_text(doc: &mut Document, parent: NodeKey, text: &str) -> NodeKey {
    let leaf = doc.create_text(text);
    doc.append_child(parent, leaf).expect("parent accepts text");
    leaf
}

pub fn append_element(doc: &mut Document, parent: NodeKey, tag: &str, text: &str) -> NodeKey {
    let el = doc.create_element(tag);
    append_text(doc, el, text);
    doc.append_child(parent, el).expect("parent accepts elements");
    el
}
