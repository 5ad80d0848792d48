// ============================================================================
// Text normalization and tokenization for attribute matching
// ============================================================================

/// Lowercase, collapse whitespace, drop trailing `:` / `*` label decorations.
pub fn normalize_text(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(|c: char| c == ':' || c == '*' || c.is_whitespace())
        .to_lowercase()
}

/// Split an identifier or phrase into lowercase words.
///
/// Breaks on any non-alphanumeric character, on lower→upper camelCase
/// transitions and on letter↔digit transitions: `billingZip2` → `billing zip 2`.
pub fn split_words(raw: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in raw.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }
        if let Some(p) = prev {
            let camel = p.is_lowercase() && c.is_uppercase();
            let digit_edge = p.is_ascii_digit() != c.is_ascii_digit();
            if (camel || digit_edge) && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
        prev = Some(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Word list plus its concatenation, for keyword tests that tolerate
/// `first_name`, `firstName` and `firstname` alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: Vec<String>,
    compact: String,
}

/// Single-word keywords shorter than this only match whole tokens.
const COMPACT_MIN_LEN: usize = 5;

impl TokenSet {
    pub fn new(raw: &str) -> Self {
        let tokens = split_words(raw);
        let compact = tokens.concat();
        Self { tokens, compact }
    }

    /// Tokens of several sources, e.g. name and id together.
    pub fn from_sources(sources: &[&str]) -> Self {
        let mut tokens = Vec::new();
        let mut compact = Vec::new();
        for s in sources {
            let words = split_words(s);
            compact.push(words.concat());
            tokens.extend(words);
        }
        Self {
            tokens,
            compact: compact.join(" "),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whole-token or contiguous-phrase match only.
    pub fn has_exact(&self, keyword: &str) -> bool {
        let words = split_words(keyword);
        match words.len() {
            0 => false,
            1 => self.tokens.iter().any(|t| *t == words[0]),
            n => self.tokens.windows(n).any(|w| w == words.as_slice()),
        }
    }

    /// Exact match, or substring of the compact form for longer keywords.
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        if self.has_exact(keyword) {
            return true;
        }
        let kc: String = split_words(keyword).concat();
        kc.len() >= COMPACT_MIN_LEN && self.compact.contains(&kc)
    }
}

/// SHA-1 hex digest, used to fingerprint values the engine wrote.
pub fn text_fingerprint(text: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
