use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Static initialization: automata are built only once, thread-safe
static ATTR_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML attribute escaper")
});

static TEXT_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">"])
        .expect("Failed to build XML text escaper")
});

/// Escape a string for use inside a double- or single-quoted attribute value.
///
/// # Examples
///
/// ```
/// use loquat::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"hello\"</tag>"), "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    ATTR_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Escape a string for use as element text content.
///
/// Quotes are left alone; the characters that would start markup are
/// replaced, and characters XML 1.0 does not allow at all (most C0
/// controls, U+FFFE, U+FFFF) are written in the OOXML `_xHHHH_` form.
///
/// # Examples
///
/// ```
/// use loquat::common::xml::escape_text;
/// assert_eq!(escape_text("Q&A <draft> \"v2\""), "Q&amp;A &lt;draft&gt; \"v2\"");
/// assert_eq!(escape_text("line\u{000B}break"), "line_x000B_break");
/// ```
#[inline]
pub fn escape_text(s: &str) -> String {
    let escaped = TEXT_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;"]);
    if escaped.chars().all(is_xml_char) {
        return escaped;
    }
    escape_xstring(&escaped)
}

/// Whether `c` may appear in an XML 1.0 document.
#[inline]
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Replace every character XML cannot carry with its `_xHHHH_` escape.
fn escape_xstring(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        if is_xml_char(c) {
            out.push(c);
        } else {
            out.push_str(&format!("_x{:04X}_", c as u32));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_control_characters() {
        assert_eq!(escape_text("a\u{000B}b"), "a_x000B_b");
        assert_eq!(escape_text("\u{0001}<x>\u{FFFF}"), "_x0001_&lt;x&gt;_xFFFF_");
        assert_eq!(escape_text("tab\tnewline\n"), "tab\tnewline\n");
        assert_eq!(escape_text("caf\u{E9} \u{1F600}"), "caf\u{E9} \u{1F600}");
    }
}
