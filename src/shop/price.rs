//! Price normalization for listing price text.

use crate::error::ScrapeError;

/// Turns strings like `₹1,234.50` into `1234.50`.
///
/// The currency markers are fixed at construction; there is no locale
/// detection, and `,` is always the thousands separator.
#[derive(Debug, Clone)]
pub struct PriceParser {
    symbols: Vec<String>,
}

impl PriceParser {
    /// Creates a parser that strips the given currency markers.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let symbols = symbols.into_iter().map(Into::into).filter(|s: &String| !s.is_empty()).collect();
        Self { symbols }
    }

    /// Parses a price, failing if anything but a plain decimal remains.
    pub fn parse(&self, text: &str) -> Result<f64, ScrapeError> {
        let malformed = || ScrapeError::MalformedPrice { text: text.to_string() };

        let mut cleaned = text.to_string();
        for symbol in &self.symbols {
            cleaned = cleaned.replace(symbol.as_str(), "");
        }
        let cleaned = cleaned.replace(',', "");
        let cleaned = cleaned.trim();

        // Plain digits with at most one decimal point; rejects signs,
        // exponents and the inf/NaN spellings f64 would otherwise accept.
        let digits = cleaned.chars().filter(|c| c.is_ascii_digit()).count();
        let points = cleaned.chars().filter(|c| *c == '.').count();
        if digits == 0 || points > 1 || digits + points != cleaned.len() {
            return Err(malformed());
        }

        // Long enough digit runs overflow to infinity.
        cleaned.parse::<f64>().ok().filter(|price| price.is_finite()).ok_or_else(malformed)
    }
}

impl Default for PriceParser {
    fn default() -> Self {
        Self::new(["₹"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rupee_prices() {
        let parser = PriceParser::default();
        assert_eq!(parser.parse("₹1,234.50").unwrap(), 1234.50);
        assert_eq!(parser.parse("₹ 850.00").unwrap(), 850.0);
        assert_eq!(parser.parse("₹12,34,567").unwrap(), 1234567.0);
        assert_eq!(parser.parse("  ₹99  ").unwrap(), 99.0);
        assert_eq!(parser.parse("₹0.00").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_without_marker() {
        let parser = PriceParser::default();
        assert_eq!(parser.parse("1,000").unwrap(), 1000.0);
        assert_eq!(parser.parse(".5").unwrap(), 0.5);
    }

    #[test]
    fn test_parse_non_breaking_space() {
        let parser = PriceParser::default();
        assert_eq!(parser.parse("₹\u{a0}2,499.00").unwrap(), 2499.0);
    }

    #[test]
    fn test_parse_custom_symbols() {
        let parser = PriceParser::new(["$", "USD"]);
        assert_eq!(parser.parse("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parser.parse("USD 10").unwrap(), 10.0);

        // Unknown markers are not stripped
        assert!(parser.parse("€10").is_err());
    }

    #[test]
    fn test_parse_malformed() {
        let parser = PriceParser::default();
        for text in ["", "   ", "₹", "N/A", "₹12abc", "1.2.3", "-5", "+5", "1e5", "inf", "NaN", "₹10 - ₹20"] {
            let err = parser.parse(text).unwrap_err();
            assert!(
                matches!(err, ScrapeError::MalformedPrice { .. }),
                "expected malformed price for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_parse_rejects_overflowing_digits() {
        let parser = PriceParser::default();
        let huge = format!("₹{}", "9".repeat(400));
        assert!(matches!(parser.parse(&huge), Err(ScrapeError::MalformedPrice { .. })));

        let huge_fraction = format!("{}.50", "1".repeat(320));
        assert!(matches!(parser.parse(&huge_fraction), Err(ScrapeError::MalformedPrice { .. })));
    }

    #[test]
    fn test_malformed_error_keeps_original_text() {
        let parser = PriceParser::default();
        let err = parser.parse("₹ call us").unwrap_err();
        assert!(err.to_string().contains("₹ call us"));
    }

    #[test]
    fn test_empty_symbols_ignored() {
        let parser = PriceParser::new(["", "₹"]);
        assert_eq!(parser.parse("₹5").unwrap(), 5.0);
    }
}
