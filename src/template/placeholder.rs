//! Placeholder tokens and their grammar.
//!
//! A token is `{{name}}` or `{{type:name}}`, where both parts are runs of
//! word characters. The same matcher drives extraction and substitution,
//! so the two passes always agree on what a placeholder is.

use memchr::memmem;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(?:(\w+):)?(\w+)\}\}").expect("failed to compile placeholder regex")
});

/// The declared type of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderKind {
    Text,
    Image,
    List,
    Table,
    Choice,
    Scrape,
}

impl PlaceholderKind {
    /// Map a declared type to a kind; an absent or unrecognized type is
    /// [`PlaceholderKind::Text`].
    pub fn from_declared(declared: &str) -> Self {
        match declared {
            "image" => Self::Image,
            "list" => Self::List,
            "table" => Self::Table,
            "choice" => Self::Choice,
            "scrape" => Self::Scrape,
            _ => Self::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::List => "list",
            Self::Table => "table",
            Self::Choice => "choice",
            Self::Scrape => "scrape",
        }
    }

    /// Substituted as plain text (`text` and `choice`).
    #[inline]
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Text | Self::Choice)
    }

    /// Replaced by a picture (`image` and `scrape`).
    #[inline]
    pub fn is_image(self) -> bool {
        matches!(self, Self::Image | Self::Scrape)
    }
}

impl fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A distinct placeholder found in a document.
///
/// Ordering is by name first, so a sorted collection of placeholders is
/// sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Placeholder {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PlaceholderKind,
}

impl Placeholder {
    pub fn new(name: impl Into<String>, kind: PlaceholderKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// One token occurrence inside a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'t> {
    /// The declared type as written, empty when omitted
    pub declared: &'t str,
    pub name: &'t str,
    /// Byte range of the whole token, braces included
    pub range: Range<usize>,
}

impl Token<'_> {
    #[inline]
    pub fn kind(&self) -> PlaceholderKind {
        PlaceholderKind::from_declared(self.declared)
    }

    pub fn to_placeholder(&self) -> Placeholder {
        Placeholder::new(self.name, self.kind())
    }
}

/// Whether `text` contains an opening `{{` at all.
#[inline]
pub fn has_open_delimiter(text: &str) -> bool {
    memmem::find(text.as_bytes(), b"{{").is_some()
}

/// Every token in `text`, left to right, non-overlapping.
pub fn tokens(text: &str) -> impl Iterator<Item = Token<'_>> {
    // Text without `{{` cannot hold a token; skip the regex entirely.
    let haystack = if has_open_delimiter(text) { text } else { "" };

    TOKEN_RE.captures_iter(haystack).filter_map(|caps| {
        let whole = caps.get(0)?;
        Some(Token {
            declared: caps.get(1).map_or("", |m| m.as_str()),
            name: caps.get(2)?.as_str(),
            range: whole.range(),
        })
    })
}

/// `(declared_type_or_empty, name)` for every token in `text`.
pub fn tokenize(text: &str) -> Vec<(&str, &str)> {
    tokens(text).map(|t| (t.declared, t.name)).collect()
}

/// Whether `text` holds a token that plain-text substitution would replace.
pub fn has_textual_token(text: &str) -> bool {
    tokens(text).any(|t| t.kind().is_textual())
}

/// Replace every textual token in `text` with `value(name)`.
///
/// Tokens of other kinds are left as written. Returns the new text and the
/// number of tokens replaced.
pub fn substitute_textual<F>(text: &str, mut value: F) -> (String, usize)
where
    F: FnMut(&str) -> String,
{
    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    let mut replaced = 0;

    for token in tokens(text).filter(|t| t.kind().is_textual()) {
        output.push_str(&text[last..token.range.start]);
        output.push_str(&value(token.name));
        last = token.range.end;
        replaced += 1;
    }
    output.push_str(&text[last..]);

    (output, replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_mixed() {
        assert_eq!(
            tokenize("Hello {{a}} and {{image:b}}!"),
            vec![("", "a"), ("image", "b")]
        );
    }

    #[test]
    fn test_tokenize_adjacent_and_malformed() {
        assert_eq!(tokenize("{{a}}{{b}}"), vec![("", "a"), ("", "b")]);
        assert!(tokenize("{{a}").is_empty());
        assert!(tokenize("{{ a }}").is_empty());
        assert!(tokenize("{{a:b:c}}").is_empty());
        assert_eq!(tokenize("{{{x}}}"), vec![("", "x")]);
        assert!(tokenize("no placeholders here").is_empty());
    }

    #[test]
    fn test_kind_defaulting() {
        assert_eq!(PlaceholderKind::from_declared(""), PlaceholderKind::Text);
        assert_eq!(PlaceholderKind::from_declared("text"), PlaceholderKind::Text);
        assert_eq!(PlaceholderKind::from_declared("chart"), PlaceholderKind::Text);
        assert_eq!(PlaceholderKind::from_declared("scrape"), PlaceholderKind::Scrape);
        assert!(PlaceholderKind::Choice.is_textual());
        assert!(PlaceholderKind::Scrape.is_image());
    }

    #[test]
    fn test_token_ranges() {
        let text = "x {{list:items}} y";
        let token = tokens(text).next().unwrap();
        assert_eq!(&text[token.range.clone()], "{{list:items}}");
        assert_eq!(token.kind(), PlaceholderKind::List);
        assert_eq!(token.to_placeholder(), Placeholder::new("items", PlaceholderKind::List));
    }

    #[test]
    fn test_substitute_textual_leaves_other_kinds() {
        let (out, n) = substitute_textual("{{a}}, {{choice:b}}, {{image:c}}, {{odd:d}}", |name| {
            name.to_uppercase()
        });
        assert_eq!(out, "A, B, {{image:c}}, D");
        assert_eq!(n, 3);
    }

    #[test]
    fn test_textual_detection() {
        assert!(has_textual_token("{{text:x}}"));
        assert!(!has_textual_token("{{table:x}}"));
        assert!(!has_textual_token("{{ broken"));
        assert!(has_open_delimiter("{{ broken"));
    }

    #[test]
    fn test_placeholder_serializes_with_type_key() {
        let json = serde_json::to_string(&Placeholder::new("logo", PlaceholderKind::Image)).unwrap();
        assert_eq!(json, r#"{"name":"logo","type":"image"}"#);
    }
}
