//! The one-line quick entry grammar.
//!
//! A message like `150 food супермаркет` records an expense without entering
//! the guided dialogue.

use crate::amount::parse_amount;

/// A transaction candidate parsed from a single line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickEntry {
    /// The unsigned amount of money.
    pub amount: f64,
    /// The category label, taken verbatim from the second token.
    pub category: String,
    /// The rest of the line, or an empty string when there is none.
    pub description: String,
}

/// Parse a line of text as a quick entry.
///
/// The first whitespace-delimited token must be a positive decimal amount,
/// the second token is the category, and any remaining tokens re-joined with
/// single spaces become the description. Returns [None] when the line does
/// not match the grammar so the caller can fall back to treating the line as
/// free text.
pub fn parse_quick_entry(text: &str) -> Option<QuickEntry> {
    let mut tokens = text.split_whitespace();

    let amount = parse_amount(tokens.next()?)?;
    let category = tokens.next()?.to_owned();
    let description = tokens.collect::<Vec<_>>().join(" ");

    Some(QuickEntry {
        amount,
        category,
        description,
    })
}

#[cfg(test)]
mod parse_quick_entry_tests {
    use crate::quick_entry::{QuickEntry, parse_quick_entry};

    #[test]
    fn parses_amount_category_and_description() {
        let result = parse_quick_entry("150 food супермаркет");

        assert_eq!(
            result,
            Some(QuickEntry {
                amount: 150.0,
                category: "food".to_owned(),
                description: "супермаркет".to_owned(),
            })
        );
    }

    #[test]
    fn description_defaults_to_empty() {
        let result = parse_quick_entry("99,9 кафе");

        assert_eq!(
            result,
            Some(QuickEntry {
                amount: 99.9,
                category: "кафе".to_owned(),
                description: String::new(),
            })
        );
    }

    #[test]
    fn joins_description_tokens_with_single_spaces() {
        let result = parse_quick_entry(" 200  taxi  дорога   додому ");

        assert_eq!(
            result.map(|entry| entry.description),
            Some("дорога додому".to_owned())
        );
    }

    #[test]
    fn rejects_single_token() {
        assert_eq!(parse_quick_entry("150"), None);
    }

    #[test]
    fn rejects_non_numeric_amount() {
        assert_eq!(parse_quick_entry("кава зранку"), None);
    }

    #[test]
    fn rejects_negative_amount() {
        assert_eq!(parse_quick_entry("-50 food"), None);
    }

    #[test]
    fn rejects_empty_line() {
        assert_eq!(parse_quick_entry(""), None);
    }
}
