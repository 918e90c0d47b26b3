//! Keeps the text of a live document rewritten by a [`rules::RuleSet`].
//!
//! An [`Engine`] runs one pass over the document once it is parsed. With auto
//! mode on it then subscribes to the document and to every open shadow root,
//! batching changes into one flush per animation frame. Its own writes are
//! fenced by a [`ReentrancyGuard`] so they never schedule further work.

mod batch;
mod classify;
mod config;
mod engine;
mod guard;
mod intercept;
mod observe;
mod scan;

pub use batch::{ChangeBatcher, FlushOutcome, PendingSet, flush_batch};
pub use classify::Classifier;
pub use config::{
    AUTO_MODE_KEY, ConfigError, ConfigStore, EngineConfig, MemoryStore, StoreError, TomlStore,
    UnavailableStore, read_auto_mode,
};
pub use engine::{Engine, EngineStats};
pub use guard::{GuardState, ReentrancyGuard, WriteScope};
pub use intercept::ShadowRootInterceptor;
pub use observe::{ObservedRootRegistry, ROOT_OBSERVER_INIT};
pub use scan::Scanner;
