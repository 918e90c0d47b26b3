#![no_main]

use libfuzzer_sys::fuzz_target;
use rules::RuleSet;
use std::borrow::Cow;
use std::sync::LazyLock;

static RULES: LazyLock<RuleSet> = LazyLock::new(RuleSet::standard);

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let once = RULES.apply(text);
    if let Cow::Borrowed(unchanged) = &once {
        assert_eq!(*unchanged, text);
    }
    let twice = RULES.apply(&once);
    assert_eq!(once, twice, "rewrite is not idempotent for {text:?}");
});
