//! Normalization of untrusted source text before it reaches the compiler.

use std::fmt;
use std::ops::Deref;

/// Entities decoded by [`sanitize`], applied in this order.
const ENTITIES: [(&str, &str); 3] = [("&lt;", "<"), ("&gt;", ">"), ("&amp;", "&")];

/// Source text with the three supported HTML entities decoded and every
/// carriage return removed.
///
/// Only [`sanitize`] constructs this type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SanitizedText(String);

impl SanitizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for SanitizedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SanitizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SanitizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decode `&lt;`, `&gt;` and `&amp;`, then strip `\r`.
///
/// This is literal substring replacement, one pass per entity. Any other
/// entity is left untouched. Never fails.
pub fn sanitize(raw: &str) -> SanitizedText {
    let mut text = raw.to_string();
    for (entity, replacement) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }
    text.retain(|c| c != '\r');
    SanitizedText(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decodes_entities_and_strips_carriage_returns() {
        assert_eq!(sanitize("a &lt;b&gt; c\r\n").as_str(), "a <b> c\n");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(sanitize("").as_str(), "");
    }

    #[test]
    fn unknown_entities_pass_through() {
        assert_eq!(sanitize("&quot;x&quot; &nbsp;&#39;").as_str(), "&quot;x&quot; &nbsp;&#39;");
    }

    #[test]
    fn ampersand_is_decoded_last() {
        // `&amp;lt;` only loses its `amp;` part; `&lt;` is not decoded twice.
        assert_eq!(sanitize("&amp;lt;").as_str(), "&lt;");
        assert_eq!(sanitize("&amp;amp;").as_str(), "&amp;");
    }

    #[test]
    fn lone_carriage_returns_are_removed() {
        assert_eq!(sanitize("G1 X1\rG1 X2\r\r").as_str(), "G1 X1G1 X2");
    }

    #[test]
    fn decoded_characters_survive_a_second_pass() {
        let once = sanitize("if (a &lt; b &amp;&amp; c &gt; d) {\r\n}");
        assert_eq!(once.as_str(), "if (a < b && c > d) {\n}");
        assert_eq!(sanitize(once.as_str()), once);
    }

    proptest! {
        #[test]
        fn output_never_contains_carriage_return(raw in ".*") {
            prop_assert!(!sanitize(&raw).contains('\r'));
        }

        #[test]
        fn text_without_ampersands_only_loses_carriage_returns(raw in "[^&]*") {
            let expected: String = raw.chars().filter(|c| *c != '\r').collect();
            let once = sanitize(&raw);
            prop_assert_eq!(once.as_str(), expected.as_str());
            prop_assert_eq!(sanitize(once.as_str()), once);
        }

        #[test]
        fn decoding_never_grows_the_text(raw in "(&lt;|&gt;|&amp;|&|[a-z;\r\n ])*") {
            prop_assert!(sanitize(&raw).len() <= raw.len());
        }
    }
}
