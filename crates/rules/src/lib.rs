//! Case-preserving substitution of AI-related terms.
//!
//! A [`RuleSet`] is an ordered list of [`Rule`]s. Each rule sees the output
//! of the rules before it, so the most specific phrases come first and the
//! bare two-letter acronym comes last:
//!
//! ```
//! let rules = rules::RuleSet::standard();
//! assert_eq!(rules.apply("ChatGPT is an AI tool"), "ChatSlop is an SLOP tool");
//! assert_eq!(rules.apply("Apple  Intelligence"), "Apple  Slop");
//! assert_eq!(rules.apply("maintain the email"), "maintain the email");
//! ```
//!
//! Applying a rule set twice gives the same result as applying it once.

mod case;
mod rule;

pub use case::CaseShape;
pub use rule::{Rule, Transform};

use memchr::memchr2;
use std::borrow::Cow;
use std::sync::LazyLock;
use thiserror::Error;

/// Canonical replacement token, in its capitalized form.
pub const MARKER: &str = "Slop";

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule `{name}` has an invalid pattern: {source}")]
    Pattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}

static STANDARD_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    [
        (
            "apple-intelligence",
            r"(?i)\b(apple\s+)(intelligence)\b",
            Transform::Group {
                group: 2,
                word: MARKER,
            },
        ),
        (
            "chatgpt",
            r"(?i)\bchatgpt\b",
            Transform::Whole { word: "ChatSlop" },
        ),
        (
            "artificial-intelligence",
            r"(?i)\bartificial\s+intelligence\b",
            Transform::Whole { word: MARKER },
        ),
        (
            "ai-prefix-compound",
            r"\b(AI)([A-Z][a-z]+)\b",
            Transform::Compound {
                group: 1,
                partner: 2,
                word: MARKER,
            },
        ),
        (
            "ai-suffix-compound",
            r"\b([A-Z][a-z]+)(AI)\b",
            Transform::Compound {
                group: 2,
                partner: 1,
                word: MARKER,
            },
        ),
        (
            "dotted-acronym",
            r"(?i)\ba\.i\.\B",
            Transform::Whole { word: MARKER },
        ),
        ("acronym", r"(?i)\bai\b", Transform::Whole { word: MARKER }),
    ]
    .into_iter()
    .map(|(name, pattern, transform)| {
        Rule::new(name, pattern, transform).expect("standard rule patterns are valid")
    })
    .collect()
});

#[derive(Clone, Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
    prefilter: bool,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            prefilter: false,
        }
    }

    /// The built-in rules, most specific first.
    pub fn standard() -> Self {
        Self {
            rules: STANDARD_RULES.clone(),
            prefilter: true,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Runs every rule in order over `text`.
    ///
    /// Returns `Cow::Borrowed` exactly when the output is byte-identical to
    /// the input, so callers can skip the write.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if !self.might_match(text) {
            return Cow::Borrowed(text);
        }
        let mut current: Cow<'t, str> = Cow::Borrowed(text);
        for rule in &self.rules {
            let rewritten = match rule.apply(&current) {
                Cow::Owned(s) => Some(s),
                Cow::Borrowed(_) => None,
            };
            if let Some(s) = rewritten {
                current = Cow::Owned(s);
            }
        }
        match current {
            Cow::Owned(s) if s == text => Cow::Borrowed(text),
            other => other,
        }
    }

    /// Every standard rule needs an `a` or `A` somewhere in the text.
    fn might_match(&self, text: &str) -> bool {
        !self.prefilter || memchr2(b'a', b'A', text.as_bytes()).is_some()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}
