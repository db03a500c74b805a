//! Text patterns a term can carry.

use std::fmt;

use regex::Regex;

/// What a single term matches inside one field's text.
///
/// All variants compare case-insensitively.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Substring of the field text.
    Text(String),
    /// Exact substring, inner whitespace preserved.
    Phrase(String),
    /// Whole-word glob with `*` and `?`.
    Glob(Glob),
}

impl Pattern {
    /// Build a pattern from a bare word, detecting wildcards.
    pub fn word(word: &str) -> Result<Self, regex::Error> {
        if Glob::is_glob(word) { Ok(Self::Glob(Glob::new(word)?)) } else { Ok(Self::Text(word.to_lowercase())) }
    }

    /// Build a phrase pattern. Wildcards inside quotes are literal.
    #[must_use]
    pub fn phrase(text: &str) -> Self {
        Self::Phrase(text.to_lowercase())
    }

    /// Test the pattern against a field's text.
    #[must_use]
    pub fn matches(&self, haystack: &str) -> bool {
        if haystack.is_empty() {
            return false;
        }
        match self {
            Self::Text(needle) | Self::Phrase(needle) => contains_folded(haystack, needle),
            Self::Glob(glob) => glob.matches(haystack),
        }
    }
}

/// Case-insensitive substring test; `needle` must already be lower-case.
pub(crate) fn contains_folded(haystack: &str, needle: &str) -> bool {
    !haystack.is_empty() && haystack.to_lowercase().contains(needle)
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) | (Self::Phrase(a), Self::Phrase(b)) => a == b,
            (Self::Glob(a), Self::Glob(b)) => a.source == b.source,
            _ => false,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Phrase(text) => write!(f, "\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\"")),
            Self::Glob(glob) => f.write_str(&glob.source),
        }
    }
}

/// A compiled wildcard pattern.
///
/// `*` stands for any run of non-whitespace characters and `?` for exactly
/// one. The glob must cover a whole word; words are split on whitespace and
/// tried both as-is and with surrounding punctuation trimmed.
#[derive(Debug, Clone)]
pub struct Glob {
    source: String,
    regex: Regex,
}

impl Glob {
    /// Whether a bare word contains wildcard characters.
    #[must_use]
    pub fn is_glob(word: &str) -> bool {
        word.contains(['*', '?'])
    }

    /// Compile a glob.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let mut pattern = String::with_capacity(source.len() + 8);
        pattern.push_str("(?i)^");
        let mut literal = [0u8; 4];
        for ch in source.chars() {
            match ch {
                '*' => pattern.push_str(r"\S*"),
                '?' => pattern.push_str(r"\S"),
                other => pattern.push_str(&regex::escape(other.encode_utf8(&mut literal))),
            }
        }
        pattern.push('$');

        Ok(Self { source: source.to_lowercase(), regex: Regex::new(&pattern)? })
    }

    /// Original glob text, lower-cased.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Test the glob against every word of the text.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        text.split_whitespace().any(|word| {
            let trimmed = word.trim_matches(|c: char| c.is_ascii_punctuation());
            self.regex.is_match(word) || (trimmed != word && self.regex.is_match(trimmed))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_case_insensitive_substring() {
        let pattern = Pattern::word("Network").unwrap();
        assert!(pattern.matches("Neural NETWORKS for graphs"));
        assert!(!pattern.matches("Socket programming"));
        assert!(!pattern.matches(""));
    }

    #[test]
    fn test_phrase_keeps_whitespace() {
        let pattern = Pattern::phrase("deep learning");
        assert!(pattern.matches("Advances in Deep Learning"));
        assert!(!pattern.matches("deep  learning"));
        assert!(!pattern.matches("learning deep"));
    }

    #[test]
    fn test_glob_prefix_suffix_infix() {
        let prefix = Glob::new("netw*").unwrap();
        assert!(prefix.matches("network"));
        assert!(prefix.matches("Networking stacks"));
        assert!(!prefix.matches("socket"));
        assert!(!prefix.matches("subnetwork"));

        let suffix = Glob::new("*ing").unwrap();
        assert!(suffix.matches("deep learning"));
        assert!(!suffix.matches("inglorious"));

        let infix = Glob::new("n*k").unwrap();
        assert!(infix.matches("a network"));
        assert!(!infix.matches("networks"));
    }

    #[test]
    fn test_glob_single_char() {
        let glob = Glob::new("polari?ation").unwrap();
        assert!(glob.matches("polarisation"));
        assert!(glob.matches("Polarization effects"));
        assert!(!glob.matches("polarition"));

        let year = Glob::new("200?").unwrap();
        assert!(year.matches("2008"));
        assert!(!year.matches("2010"));
    }

    #[test]
    fn test_glob_trims_punctuation() {
        let glob = Glob::new("netw*").unwrap();
        assert!(glob.matches("(networks),"));
        assert!(glob.matches("graph-based: network."));
    }

    #[test]
    fn test_glob_escapes_regex_metacharacters() {
        let glob = Glob::new("c++*").unwrap();
        assert!(glob.matches("c++17 features"));
        assert!(!glob.matches("cpp"));

        let dotted = Glob::new("10.1145/*").unwrap();
        assert!(dotted.matches("10.1145/3292500"));
        assert!(!dotted.matches("10x1145/3292500"));
    }

    #[test]
    fn test_word_detects_wildcards() {
        assert!(matches!(Pattern::word("disc*").unwrap(), Pattern::Glob(_)));
        assert!(matches!(Pattern::word("disc").unwrap(), Pattern::Text(_)));
    }

    #[test]
    fn test_phrase_display_escapes_quotes() {
        let pattern = Pattern::phrase(r#"say "hi""#);
        assert_eq!(pattern.to_string(), r#""say \"hi\"""#);
    }
}
