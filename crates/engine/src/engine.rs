use crate::batch::{ChangeBatcher, flush_batch};
use crate::config::{ConfigStore, EngineConfig, read_auto_mode};
use crate::guard::ReentrancyGuard;
use crate::intercept::ShadowRootInterceptor;
use crate::observe::{ObservedRootRegistry, ROOT_OBSERVER_INIT, RootMutationHandler};
use crate::scan::Scanner;
use dom::traverse::open_shadow_roots;
use dom::{AttachShadow, Document, NodeKey, ReadyState};
use rules::RuleSet;
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Counters describing what the engine has done so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Leaves rewritten by the initial pass.
    pub initial_changed: usize,
    pub flushes: u64,
    pub flushed_nodes: u64,
    pub leaves_changed: u64,
    pub stale_skipped: u64,
    /// Flushes that ran during an engine write and dropped their batch.
    pub discarded_flushes: u64,
    /// Mutation records ignored because the engine caused them.
    pub suppressed_records: u64,
    pub observed_roots: usize,
}

/// State shared by the engine handle, its mutation callbacks, the shadow-root
/// interceptor and scheduled flushes.
///
/// Borrows of the `RefCell`s never outlive a single call, so nothing is
/// borrowed while a text write delivers its mutation records.
#[derive(Debug)]
pub(crate) struct EngineShared {
    pub(crate) guard: ReentrancyGuard,
    scanner: Scanner,
    batcher: RefCell<ChangeBatcher>,
    registry: RefCell<ObservedRootRegistry>,
    stats: Cell<EngineStats>,
}

impl EngineShared {
    fn new(scanner: Scanner) -> Self {
        Self {
            guard: ReentrancyGuard::new(),
            scanner,
            batcher: RefCell::new(ChangeBatcher::new()),
            registry: RefCell::new(ObservedRootRegistry::default()),
            stats: Cell::new(EngineStats::default()),
        }
    }

    pub(crate) fn bump(&self, update: impl FnOnce(&mut EngineStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }

    /// Queues `node` for the next flush, scheduling one if none is pending.
    pub(crate) fn enqueue(self: &Rc<Self>, doc: &mut Document, node: NodeKey) {
        if self.guard.is_writing() {
            return;
        }
        let schedule = self.batcher.borrow_mut().enqueue(node);
        if schedule {
            let shared = Rc::clone(self);
            doc.request_animation_frame(move |doc: &mut Document| shared.flush(doc));
        }
    }

    /// Drops registry entries for freed roots and updates the count.
    fn refresh_registry(&self, doc: &Document) {
        let mut registry = self.registry.borrow_mut();
        let pruned = registry.prune(doc);
        let observed = registry.len();
        drop(registry);
        if pruned > 0 {
            log::debug!(target: "engine", "forgot {pruned} freed roots");
        }
        self.bump(|s| s.observed_roots = observed);
    }

    fn flush(&self, doc: &mut Document) {
        self.refresh_registry(doc);
        let batch = self.batcher.borrow_mut().take();
        if self.guard.is_writing() {
            log::debug!(target: "engine", "discarding {} pending nodes during a write", batch.len());
            self.bump(|s| s.discarded_flushes += 1);
            return;
        }
        let outcome = flush_batch(doc, &batch, &self.scanner, &self.guard);
        log::debug!(
            target: "engine",
            "flush: {} nodes, {} stale, {} leaves changed",
            outcome.nodes,
            outcome.stale,
            outcome.changed
        );
        self.bump(|s| {
            s.flushes += 1;
            s.flushed_nodes += outcome.nodes as u64;
            s.stale_skipped += outcome.stale as u64;
            s.leaves_changed += outcome.changed as u64;
        });
    }

    /// Subscribes to `root` unless it is already observed. Returns whether a
    /// new subscription was made.
    pub(crate) fn observe(self: &Rc<Self>, doc: &mut Document, root: NodeKey) -> bool {
        if self.registry.borrow().contains(root) {
            return false;
        }
        let handler = Rc::new(RootMutationHandler {
            shared: Rc::clone(self),
        });
        match doc.observe(root, ROOT_OBSERVER_INIT, handler) {
            Ok(observer) => {
                self.registry.borrow_mut().insert(root, observer);
                self.refresh_registry(doc);
                log::debug!(target: "engine", "observing {root:?}");
                true
            }
            Err(err) => {
                log::debug!(target: "engine", "cannot observe {root:?}: {err}");
                false
            }
        }
    }

    /// Full pass over the document plus every open shadow root, then
    /// subscriptions when `auto_mode` is on.
    fn start(self: &Rc<Self>, doc: &mut Document, auto_mode: bool) {
        let scan_root = doc
            .body()
            .or_else(|| doc.document_element())
            .unwrap_or_else(|| doc.root());
        let shadow_roots = open_shadow_roots(doc, doc.root());
        let mut changed = self.scanner.scan(doc, scan_root, &self.guard);
        for &shadow in &shadow_roots {
            changed += self.scanner.scan(doc, shadow, &self.guard);
        }
        self.bump(|s| s.initial_changed = changed);
        log::info!(target: "engine", "initial pass rewrote {changed} text nodes");

        if auto_mode {
            let root = doc.root();
            self.observe(doc, root);
            for shadow in shadow_roots {
                self.observe(doc, shadow);
            }
        }
    }
}

/// Handle to an engine installed on one document.
///
/// ```
/// use dom::Document;
/// use engine::{Engine, EngineConfig, MemoryStore};
///
/// let mut doc = Document::from_json(
///     r#"{"children": [{"tag": "html", "children": [{"tag": "body", "children": ["ChatGPT is an AI tool"]}]}]}"#,
/// ).unwrap();
/// let engine = Engine::install(&mut doc, &EngineConfig::default(), &MemoryStore::new());
/// doc.finish_parsing();
///
/// let body = doc.body().unwrap();
/// assert_eq!(doc.text(doc.children(body)[0]), Some("ChatSlop is an SLOP tool"));
/// assert_eq!(engine.stats().initial_changed, 1);
/// ```
#[derive(Clone, Debug)]
pub struct Engine {
    shared: Rc<EngineShared>,
    auto_mode: bool,
}

impl Engine {
    /// Builds an engine that is not attached to any document yet.
    pub fn new(config: &EngineConfig, auto_mode: bool) -> Self {
        Self::with_rules(config, RuleSet::standard(), auto_mode)
    }

    pub fn with_rules(config: &EngineConfig, rules: RuleSet, auto_mode: bool) -> Self {
        Self {
            shared: Rc::new(EngineShared::new(Scanner::new(config, rules))),
            auto_mode,
        }
    }

    /// Reads the auto-mode flag from `store`, then attaches to `doc`.
    ///
    /// With auto mode on, the shadow-root interceptor is installed right away
    /// so roots created during parsing are not missed. The initial pass runs
    /// now if parsing is over, otherwise once the document finishes parsing.
    pub fn install(doc: &mut Document, config: &EngineConfig, store: &dyn ConfigStore) -> Self {
        let engine = Self::new(config, read_auto_mode(store));
        engine.attach(doc);
        engine
    }

    pub fn attach(&self, doc: &mut Document) {
        if self.auto_mode {
            self.install_interceptor(doc);
        }
        let shared = Rc::clone(&self.shared);
        let auto_mode = self.auto_mode;
        match doc.ready_state() {
            ReadyState::Loading => {
                doc.on_content_loaded(move |doc: &mut Document| shared.start(doc, auto_mode));
            }
            ReadyState::Interactive => shared.start(doc, auto_mode),
        }
    }

    pub fn install_interceptor(&self, doc: &mut Document) {
        let shared = Rc::clone(&self.shared);
        doc.wrap_attach_shadow(move |inner| {
            Rc::new(ShadowRootInterceptor::new(inner, shared)) as Rc<dyn AttachShadow>
        });
    }

    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    /// Rewrites eligible leaves below `root` immediately.
    pub fn scan(&self, doc: &mut Document, root: NodeKey) -> usize {
        self.shared.scanner.scan(doc, root, &self.shared.guard)
    }

    pub fn enqueue(&self, doc: &mut Document, node: NodeKey) {
        self.shared.enqueue(doc, node);
    }

    pub fn observe(&self, doc: &mut Document, root: NodeKey) -> bool {
        self.shared.observe(doc, root)
    }

    pub fn is_observing(&self, root: NodeKey) -> bool {
        self.shared.registry.borrow().contains(root)
    }

    pub fn pending(&self) -> usize {
        self.shared.batcher.borrow().pending().len()
    }

    /// Rewrites a plain string the way a text leaf would be rewritten.
    pub fn apply_text<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.shared.scanner.rewrite_text(text)
    }

    pub fn stats(&self) -> EngineStats {
        self.shared.stats.get()
    }
}
