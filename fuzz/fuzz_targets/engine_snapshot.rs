#![no_main]

use dom::Document;
use engine::{AUTO_MODE_KEY, Engine, EngineConfig, MemoryStore};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut doc) = Document::from_json(json) else {
        return;
    };
    let store = MemoryStore::new().with(AUTO_MODE_KEY, true);
    let engine = Engine::install(&mut doc, &EngineConfig::default(), &store);
    doc.finish_parsing();
    doc.run_until_idle(8);
    assert_eq!(doc.pending_frame_callbacks(), 0);

    let scan_root = doc
        .body()
        .or_else(|| doc.document_element())
        .unwrap_or_else(|| doc.root());
    assert_eq!(engine.scan(&mut doc, scan_root), 0, "initial pass left work behind");
});
