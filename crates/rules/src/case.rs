/// Letter-casing pattern of a matched word, used to shape its replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseShape {
    /// Every letter is uppercase (`AI`, `A.I.`, `CHATGPT`).
    Upper,
    /// First letter uppercase, some later letter not (`Ai`, `ChatGPT`).
    Capitalized,
    /// First letter lowercase, or no letters at all.
    Lower,
}

impl CaseShape {
    pub fn of(s: &str) -> Self {
        let mut letters = s.chars().filter(|c| c.is_alphabetic());
        let Some(first) = letters.next() else {
            return CaseShape::Lower;
        };
        if !first.is_uppercase() {
            return CaseShape::Lower;
        }
        if letters.all(char::is_uppercase) {
            CaseShape::Upper
        } else {
            CaseShape::Capitalized
        }
    }

    /// Shapes `word`, which is given in its capitalized form (`Slop`,
    /// `ChatSlop`).
    pub fn apply(self, word: &str) -> String {
        match self {
            CaseShape::Upper => word.to_uppercase(),
            CaseShape::Capitalized => word.to_string(),
            CaseShape::Lower => word.to_lowercase(),
        }
    }
}
