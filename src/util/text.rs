use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

static TAG_RE: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"))
}

fn whitespace_re() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Converts an HTML fragment from a feed into a single line of plain text.
///
/// Steps, in order:
/// 1. HTML entities are unescaped (`&amp;` → `&`, `&#x3042;` → `あ`, `&nbsp;` → U+00A0)
/// 2. Every tag is replaced by a space, so `a<br>b` does not fuse into `ab`
/// 3. Runs of Unicode whitespace collapse to one ASCII space
/// 4. Leading and trailing whitespace is trimmed
///
/// Entities are decoded before tags are removed. Markup that a feed
/// double-escaped (`&lt;p&gt;`) is therefore stripped as well.
///
/// # Examples
///
/// ```
/// use feedsnap::util::strip_html;
///
/// assert_eq!(strip_html("<p>Hello &amp; world</p>"), "Hello & world");
/// assert_eq!(strip_html("line one<br/>line\n\n two"), "line one line two");
/// ```
pub fn strip_html(raw: &str) -> String {
    let unescaped = html_escape::decode_html_entities(raw);
    let untagged = tag_re().replace_all(&unescaped, " ");
    collapse_whitespace(&untagged).into_owned()
}

/// Collapses whitespace runs to single spaces and trims both ends.
///
/// Returns `Cow::Borrowed` when the input is already normalized.
pub fn collapse_whitespace(s: &str) -> Cow<'_, str> {
    let trimmed = s.trim();
    // Fast path: single ASCII spaces only
    let normalized = !trimmed.contains("  ")
        && !trimmed.contains(|c: char| c.is_whitespace() && c != ' ');
    if normalized {
        return Cow::Borrowed(trimmed);
    }
    Cow::Owned(whitespace_re().replace_all(trimmed, " ").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strip_paragraph_and_entity() {
        assert_eq!(strip_html("<p>Hello &amp; world</p>"), "Hello & world");
    }

    #[test]
    fn test_tags_become_word_breaks() {
        assert_eq!(strip_html("one<br>two<br/>three"), "one two three");
        assert_eq!(
            strip_html(r#"<a href="https://example.com">link</a>text"#),
            "link text"
        );
    }

    #[test]
    fn test_double_escaped_markup_is_stripped() {
        assert_eq!(strip_html("&lt;b&gt;bold&lt;/b&gt; move"), "bold move");
    }

    #[test]
    fn test_numeric_and_named_entities() {
        assert_eq!(strip_html("&#12354;&#x3044; &quot;q&quot; &copy;"), "あい \"q\" ©");
    }

    #[test]
    fn test_nbsp_counts_as_whitespace() {
        assert_eq!(strip_html("a&nbsp;&nbsp; b"), "a b");
    }

    #[test]
    fn test_newlines_and_tabs_collapse() {
        assert_eq!(strip_html("\n\t first \r\n\n second\t\t"), "first second");
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert_eq!(strip_html(""), "");
        assert_eq!(strip_html("   \n  "), "");
        assert_eq!(strip_html("<div>   </div>"), "");
    }

    #[test]
    fn test_japanese_text_preserved() {
        assert_eq!(
            strip_html("<p>Rustで<strong>CLI</strong>を作る</p>"),
            "Rustで CLI を作る"
        );
    }

    #[test]
    fn test_collapse_borrows_normalized_input() {
        let result = collapse_whitespace("already clean text");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "already clean text");
    }

    #[test]
    fn test_collapse_owns_when_changed() {
        let result = collapse_whitespace("two  spaces");
        assert!(matches!(result, Cow::Owned(_)));
        assert_eq!(result, "two spaces");
    }

    proptest! {
        #[test]
        fn prop_stripped_text_is_normalized(input in "\\PC*") {
            let out = strip_html(&input);
            prop_assert_eq!(out.trim(), out.as_str());
            prop_assert!(!out.contains("  "));
            prop_assert!(!out.contains(|c: char| c.is_whitespace() && c != ' '));
        }

        #[test]
        fn prop_plain_words_survive(words in proptest::collection::vec("[a-zA-Z0-9]{1,8}", 0..8)) {
            let input = format!("<p>{}</p>", words.join("\n  "));
            prop_assert_eq!(strip_html(&input), words.join(" "));
        }
    }
}
