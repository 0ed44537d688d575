//! Label quoting for Newick output.
//!
//! Labels are stored verbatim in the model. When written, a label that
//! would otherwise be split by the Newick grammar is wrapped in single
//! quotes with internal single quotes doubled; the
//! [ByteParser](crate::parser::ByteParser) undoes this when reading.

/// Returns `true` if the label must be quoted to survive a Newick round trip.
///
/// # Examples
/// ```
/// # use cladeshift::parser::utils::needs_quotes;
/// assert_eq!(needs_quotes("Pukeko"), false);
/// assert_eq!(needs_quotes("foo,bar"), true);
/// assert_eq!(needs_quotes("Pu[ke]ko"), true);
/// assert_eq!(needs_quotes("Australasian Swamphen"), true);
/// assert_eq!(needs_quotes("Baillon's"), true);
/// ```
pub fn needs_quotes(label: &str) -> bool {
    label.chars().any(|c| {
        matches!(c, ',' | ';' | ':' | '(' | ')' | '[' | ']' | '\'') || c.is_whitespace()
    })
}

/// Quotes a label for safe use in Newick text if required.
///
/// # Examples
/// ```
/// # use cladeshift::parser::utils::quote_label;
/// assert_eq!(quote_label("Pukeko"), "Pukeko");
/// assert_eq!(quote_label("foo,bar"), "'foo,bar'");
/// assert_eq!(quote_label("Baillon's Crake"), "'Baillon''s Crake'");
/// ```
pub fn quote_label(label: &str) -> String {
    if needs_quotes(label) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_labels_untouched() {
        assert_eq!(quote_label("Apteryx_haastii"), "Apteryx_haastii");
        assert_eq!(quote_label(""), "");
    }

    #[test]
    fn test_every_grammar_character_quotes() {
        for label in ["a,b", "a;b", "a:b", "a(b", "a)b", "a[b", "a]b"] {
            assert_eq!(quote_label(label), format!("'{label}'"));
        }
    }
}
