//! Parsing of user-typed money amounts.
//!
//! The quick-entry grammar and the numeric dialogue steps share this parser
//! so that `"150,5"` and `"150.5"` mean the same amount everywhere.

/// Parse a user-typed amount of money.
///
/// One decimal comma is accepted in place of a decimal point. Returns [None]
/// when the text is not a number or the amount is not a positive, finite
/// value.
pub fn parse_amount(text: &str) -> Option<f64> {
    let normalised = text.trim().replace(',', ".");

    match normalised.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Some(amount),
        _ => None,
    }
}
