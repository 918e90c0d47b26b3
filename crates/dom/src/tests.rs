use super::*;
use crate::snapshot::outline;
use crate::traverse::{
    NodeFilter, TreeWalker, is_connected, open_shadow_roots, text_content, text_leaves, tree_root,
};
use std::cell::RefCell;
use std::rc::Rc;

fn elem(doc: &mut Document, parent: NodeKey, name: &str) -> NodeKey {
    let key = doc.create_element(name);
    doc.append_child(parent, key).unwrap();
    key
}

fn text(doc: &mut Document, parent: NodeKey, value: &str) -> NodeKey {
    let key = doc.create_text(value);
    doc.append_child(parent, key).unwrap();
    key
}

fn recorder(doc: &mut Document, root: NodeKey, init: MutationObserverInit) -> Rc<RefCell<Vec<MutationRecord>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    doc.observe(
        root,
        init,
        Rc::new(move |_: &mut Document, records: &[MutationRecord]| {
            sink.borrow_mut().extend_from_slice(records);
        }),
    )
    .unwrap();
    seen
}

const ALL: MutationObserverInit = MutationObserverInit {
    child_list: true,
    attributes: true,
    character_data: true,
    subtree: true,
};

#[test]
fn element_names_are_canonical_lowercase() {
    let mut doc = Document::new();
    let div = doc.create_element("DIV");
    doc.set_attribute(div, "ContentEditable", Some("true")).unwrap();
    assert_eq!(doc.tag_name(div), Some("div"));
    assert_eq!(doc.attribute(div, "contenteditable"), Some("true"));
}

#[test]
fn valueless_attribute_reads_as_empty_string() {
    let mut doc = Document::new();
    let div = doc.create_element("div");
    doc.set_attribute(div, "hidden", None).unwrap();
    assert_eq!(doc.attribute(div, "hidden"), Some(""));
    assert!(doc.remove_attribute(div, "HIDDEN").unwrap());
    assert_eq!(doc.attribute(div, "hidden"), None);
}

#[test]
fn insert_before_orders_children() {
    let mut doc = Document::new();
    let root = doc.root();
    let body = elem(&mut doc, root, "body");
    let a = text(&mut doc, body, "a");
    let c = text(&mut doc, body, "c");
    let b = doc.create_text("b");
    doc.insert_before(body, b, Some(c)).unwrap();
    assert_eq!(doc.children(body), &[a, b, c]);
    assert_eq!(text_content(&doc, body), "abc");
}

#[test]
fn reinserting_moves_a_node() {
    let mut doc = Document::new();
    let root = doc.root();
    let body = elem(&mut doc, root, "body");
    let left = elem(&mut doc, body, "div");
    let right = elem(&mut doc, body, "div");
    let leaf = text(&mut doc, left, "x");

    doc.append_child(right, leaf).unwrap();
    assert!(doc.children(left).is_empty());
    assert_eq!(doc.children(right), &[leaf]);
    assert_eq!(doc.parent(leaf), Some(right));
}

#[test]
fn cycles_are_rejected_through_shadow_hosts() {
    let mut doc = Document::new();
    let root = doc.root();
    let host = elem(&mut doc, root, "div");
    let shadow = doc.attach_shadow(host, ShadowRootInit::OPEN).unwrap();
    let inner = elem(&mut doc, shadow, "span");

    assert_eq!(
        doc.append_child(inner, host),
        Err(DomError::CycleDetected {
            parent: inner,
            child: host
        })
    );
    assert_eq!(doc.append_child(root, shadow), Err(DomError::InvalidChild(shadow)));
}

#[test]
fn text_nodes_cannot_have_children() {
    let mut doc = Document::new();
    let t = doc.create_text("x");
    let u = doc.create_text("y");
    assert_eq!(doc.append_child(t, u), Err(DomError::InvalidParent(t)));
}

#[test]
fn set_text_on_element_is_a_kind_error() {
    let mut doc = Document::new();
    let div = doc.create_element("div");
    assert_eq!(doc.set_text(div, "x"), Err(DomError::WrongNodeKind(div)));
}

#[test]
fn closed_shadow_roots_are_hidden_from_host() {
    let mut doc = Document::new();
    let open_host = doc.create_element("div");
    let closed_host = doc.create_element("div");
    let open = doc.attach_shadow(open_host, ShadowRootInit::OPEN).unwrap();
    let closed = doc.attach_shadow(closed_host, ShadowRootInit::CLOSED).unwrap();

    assert_eq!(doc.shadow_root(open_host), Some(open));
    assert_eq!(doc.shadow_root(closed_host), None);
    assert_eq!(doc.host(closed), Some(closed_host));
    assert_eq!(doc.shadow_mode(closed), Some(ShadowRootMode::Closed));
}

#[test]
fn attach_shadow_rejects_second_root_and_unsupported_hosts() {
    let mut doc = Document::new();
    let div = doc.create_element("div");
    let input = doc.create_element("input");
    let custom = doc.create_element("x-widget");

    doc.attach_shadow(div, ShadowRootInit::OPEN).unwrap();
    assert_eq!(
        doc.attach_shadow(div, ShadowRootInit::OPEN),
        Err(DomError::ShadowRootExists(div))
    );
    assert_eq!(
        doc.attach_shadow(input, ShadowRootInit::OPEN),
        Err(DomError::UnsupportedShadowHost(input))
    );
    assert!(doc.attach_shadow(custom, ShadowRootInit::OPEN).is_ok());
}

#[test]
fn connectedness_follows_shadow_hosts() {
    let mut doc = Document::new();
    let root = doc.root();
    let host = elem(&mut doc, root, "div");
    let shadow = doc.attach_shadow(host, ShadowRootInit::OPEN).unwrap();
    let leaf = text(&mut doc, shadow, "inside");

    assert!(is_connected(&doc, leaf));
    assert_eq!(tree_root(&doc, leaf), shadow);

    doc.remove(host).unwrap();
    assert!(!is_connected(&doc, leaf));
    assert!(doc.contains(leaf));
}

#[test]
fn destroy_frees_detached_subtree_and_its_shadow_tree() {
    let mut doc = Document::new();
    let root = doc.root();
    let host = elem(&mut doc, root, "div");
    let shadow = doc.attach_shadow(host, ShadowRootInit::OPEN).unwrap();
    let leaf = text(&mut doc, shadow, "inside");

    assert_eq!(doc.destroy(host), Err(DomError::StillAttached(host)));
    doc.remove(host).unwrap();
    assert_eq!(doc.destroy(host), Ok(3));
    assert!(!doc.contains(host));
    assert!(!doc.contains(shadow));
    assert!(!doc.contains(leaf));
    assert_eq!(doc.destroy(root), Err(DomError::WrongNodeKind(root)));
}

#[test]
fn destroy_drops_observers_rooted_inside() {
    let mut doc = Document::new();
    let host = doc.create_element("div");
    let shadow = doc.attach_shadow(host, ShadowRootInit::OPEN).unwrap();
    let _ = recorder(&mut doc, shadow, ALL);
    assert_eq!(doc.observer_count(), 1);
    doc.destroy(host).unwrap();
    assert_eq!(doc.observer_count(), 0);
}

#[test]
fn observer_sees_child_list_and_character_data_in_subtree() {
    let mut doc = Document::new();
    let root = doc.root();
    let seen = recorder(&mut doc, root, ALL);

    let body = elem(&mut doc, root, "body");
    let leaf = text(&mut doc, body, "hello");
    doc.set_text(leaf, "bye").unwrap();
    doc.remove(leaf).unwrap();

    let seen = seen.borrow();
    assert_eq!(
        *seen,
        vec![
            MutationRecord::ChildList {
                target: root,
                added: vec![body],
                removed: Vec::new(),
            },
            MutationRecord::ChildList {
                target: body,
                added: vec![leaf],
                removed: Vec::new(),
            },
            MutationRecord::CharacterData {
                target: leaf,
                old_value: "hello".to_string(),
            },
            MutationRecord::ChildList {
                target: body,
                added: Vec::new(),
                removed: vec![leaf],
            },
        ]
    );
}

#[test]
fn observer_without_subtree_only_sees_its_root() {
    let mut doc = Document::new();
    let root = doc.root();
    let body = elem(&mut doc, root, "body");
    let seen = recorder(
        &mut doc,
        body,
        MutationObserverInit {
            child_list: true,
            ..Default::default()
        },
    );
    let div = elem(&mut doc, body, "div");
    let _ = elem(&mut doc, div, "span");
    let leaf = text(&mut doc, div, "x");
    doc.set_text(leaf, "y").unwrap();

    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0].target(), body);
}

#[test]
fn document_observer_does_not_see_into_shadow_trees() {
    let mut doc = Document::new();
    let root = doc.root();
    let host = elem(&mut doc, root, "div");
    let shadow = doc.attach_shadow(host, ShadowRootInit::OPEN).unwrap();
    let doc_seen = recorder(&mut doc, root, ALL);
    let shadow_seen = recorder(&mut doc, shadow, ALL);

    let leaf = text(&mut doc, shadow, "inside");
    doc.set_text(leaf, "changed").unwrap();

    assert!(doc_seen.borrow().is_empty());
    assert_eq!(shadow_seen.borrow().len(), 2);
}

#[test]
fn callbacks_may_mutate_the_document() {
    let mut doc = Document::new();
    let root = doc.root();
    let body = elem(&mut doc, root, "body");
    let leaf = text(&mut doc, body, "start");
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    doc.observe(
        body,
        MutationObserverInit {
            character_data: true,
            subtree: true,
            ..Default::default()
        },
        Rc::new(move |doc: &mut Document, records: &[MutationRecord]| {
            *counter.borrow_mut() += 1;
            let target = records[0].target();
            if doc.text(target) == Some("start!") {
                doc.set_text(target, "done").unwrap();
            }
        }),
    )
    .unwrap();

    doc.set_text(leaf, "start!").unwrap();
    assert_eq!(doc.text(leaf), Some("done"));
    assert_eq!(*calls.borrow(), 2);
}

#[test]
fn disconnect_stops_delivery() {
    let mut doc = Document::new();
    let root = doc.root();
    let seen = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&seen);
    let id = doc
        .observe(
            root,
            ALL,
            Rc::new(move |_: &mut Document, _: &[MutationRecord]| *sink.borrow_mut() += 1),
        )
        .unwrap();
    let _ = elem(&mut doc, root, "div");
    assert!(doc.disconnect(id));
    let _ = elem(&mut doc, root, "div");
    assert_eq!(*seen.borrow(), 1);
    assert!(!doc.disconnect(id));
}

#[test]
fn frame_callbacks_queued_during_a_frame_run_next_frame() {
    let mut doc = Document::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    let first = Rc::clone(&order);
    doc.request_animation_frame(move |doc| {
        first.borrow_mut().push(1);
        let second = Rc::clone(&first);
        doc.request_animation_frame(move |_| second.borrow_mut().push(2));
    });

    assert_eq!(doc.run_animation_frame(), 1);
    assert_eq!(*order.borrow(), vec![1]);
    assert_eq!(doc.pending_frame_callbacks(), 1);
    assert_eq!(doc.run_until_idle(10), 1);
    assert_eq!(*order.borrow(), vec![1, 2]);
    assert_eq!(doc.run_until_idle(10), 0);
}

#[test]
fn content_loaded_runs_once() {
    let mut doc = Document::new();
    let runs = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&runs);
    doc.on_content_loaded(move |_| *counter.borrow_mut() += 1);
    assert_eq!(doc.ready_state(), ReadyState::Loading);
    doc.finish_parsing();
    doc.finish_parsing();
    assert_eq!(doc.ready_state(), ReadyState::Interactive);
    assert_eq!(*runs.borrow(), 1);
}

#[test]
fn tree_walker_reject_prunes_subtree_and_skip_descends() {
    let mut doc = Document::new();
    let root = doc.root();
    let body = elem(&mut doc, root, "body");
    let pre = elem(&mut doc, body, "pre");
    let hidden = text(&mut doc, pre, "hidden");
    let span = elem(&mut doc, body, "span");
    let shown = text(&mut doc, span, "shown");

    let visited: Vec<_> = TreeWalker::new(&doc, root, |doc: &Document, key: NodeKey| {
        match doc.tag_name(key) {
            Some("pre") => NodeFilter::Reject,
            Some(_) => NodeFilter::Skip,
            None => NodeFilter::Accept,
        }
    })
    .collect();
    assert_eq!(visited, vec![shown]);
    assert!(!visited.contains(&hidden));
    assert_eq!(text_leaves(&doc, root), vec![hidden, shown]);
}

#[test]
fn open_shadow_roots_are_found_at_any_nesting_depth() {
    let mut doc = Document::new();
    let root = doc.root();
    let outer_host = elem(&mut doc, root, "div");
    let outer = doc.attach_shadow(outer_host, ShadowRootInit::OPEN).unwrap();
    let inner_host = elem(&mut doc, outer, "x-inner");
    let inner = doc.attach_shadow(inner_host, ShadowRootInit::OPEN).unwrap();
    let closed_host = elem(&mut doc, root, "div");
    let closed = doc.attach_shadow(closed_host, ShadowRootInit::CLOSED).unwrap();
    let hidden_host = elem(&mut doc, closed, "div");
    doc.attach_shadow(hidden_host, ShadowRootInit::OPEN).unwrap();

    assert_eq!(open_shadow_roots(&doc, root), vec![outer, inner]);
}

#[test]
fn snapshot_builds_tree_with_shadow_roots() {
    let json = r#"{ "children": [
        { "tag": "html", "children": [
            { "tag": "body", "attrs": { "class": "page" }, "children": [
                "ChatGPT is an AI tool",
                { "comment": "note" },
                { "tag": "x-card", "shadow": { "mode": "open", "children": ["inside"] } }
            ] }
        ] }
    ] }"#;
    let doc = Document::from_json(json).unwrap();
    let body = doc.body().unwrap();
    assert_eq!(doc.attribute(body, "class"), Some("page"));
    assert_eq!(text_content(&doc, body), "ChatGPT is an AI tool");

    let lines = outline(&doc, doc.root(), 100);
    assert_eq!(
        lines,
        vec![
            "#document",
            "  <html>",
            r#"    <body class="page">"#,
            "      \"ChatGPT is an AI tool\"",
            "      <!-- note -->",
            "      <x-card>",
            "        #shadow-root (open)",
            "          \"inside\"",
        ]
    );
}

#[test]
fn snapshot_rejects_invalid_shadow_host() {
    let json = r#"{ "children": [ { "tag": "input", "shadow": { "mode": "open" } } ] }"#;
    assert!(matches!(
        Document::from_json(json),
        Err(SnapshotError::Dom(DomError::UnsupportedShadowHost(_)))
    ));
}
