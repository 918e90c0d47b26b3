use crate::case::CaseShape;
use crate::{MARKER, RuleError};
use regex::{Captures, Regex};
use std::borrow::Cow;

/// How a rule rewrites one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transform {
    /// The whole match becomes `word`, shaped like the match.
    Whole { word: &'static str },
    /// Only capture `group` becomes `word`, shaped like that capture; the rest
    /// of the match (including whitespace) is kept.
    Group { group: usize, word: &'static str },
    /// Only capture `group` becomes `word` verbatim. The match is left alone
    /// when capture `partner` already is the marker, so `SlopAI` does not
    /// turn into `SlopSlop`.
    Compound {
        group: usize,
        partner: usize,
        word: &'static str,
    },
}

#[derive(Clone, Debug)]
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    transform: Transform,
}

impl Rule {
    pub fn new(name: &'static str, pattern: &str, transform: Transform) -> Result<Self, RuleError> {
        let pattern = Regex::new(pattern).map_err(|source| RuleError::Pattern { name, source })?;
        Ok(Self {
            name,
            pattern,
            transform,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Rewrites every match in `text`. Borrowed when nothing matched.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern
            .replace_all(text, |caps: &Captures<'_>| self.rewrite(caps))
    }

    fn rewrite(&self, caps: &Captures<'_>) -> String {
        let whole = &caps[0];
        match self.transform {
            Transform::Whole { word } => CaseShape::of(whole).apply(word),
            Transform::Group { group, word } => {
                splice(caps, group, |matched| CaseShape::of(matched).apply(word))
            }
            Transform::Compound {
                group,
                partner,
                word,
            } => {
                let partner_is_marker = caps
                    .get(partner)
                    .is_some_and(|m| m.as_str().eq_ignore_ascii_case(MARKER));
                if partner_is_marker {
                    return whole.to_string();
                }
                splice(caps, group, |_| word.to_string())
            }
        }
    }
}

/// The whole match with capture `group` replaced by `replace(capture)`.
fn splice(caps: &Captures<'_>, group: usize, replace: impl FnOnce(&str) -> String) -> String {
    let Some(whole) = caps.get(0) else {
        return String::new();
    };
    let Some(target) = caps.get(group) else {
        return whole.as_str().to_string();
    };
    let text = whole.as_str();
    let start = target.start() - whole.start();
    let end = target.end() - whole.start();
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..start]);
    out.push_str(&replace(target.as_str()));
    out.push_str(&text[end..]);
    out
}
