//! Pulls the displayed price out of a product page.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::utils::html::text_content;

/// Class the product page puts on the element holding the displayed price
pub const PRICE_MARKER_CLASS: &str = "a-offscreen";

/// Characters removed before the price text is parsed
const STRIPPED_CHARS: &[char] = &['£', '$', ','];

lazy_static! {
    // Opening <span ...> tag with a class attribute, quotes either way
    static ref SPAN_OPEN: Regex = Regex::new(
        r#"(?i)<span\b[^>]*?\sclass\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#
    )
    .expect("span open pattern is valid");
    // Any <span ...> or </span> tag; group 1 is set for closing tags
    static ref SPAN_TAG: Regex = Regex::new(r"(?i)<(/)?span\b[^>]*>").expect("span tag pattern is valid");
}

/// Why no price could be read from the page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("price element not found")]
    NotFound,
    #[error("unable to convert '{0}' to a price")]
    Unparseable(String),
}

/// Find the first marker-tagged element and parse its text as a price
pub fn extract_price(html: &str) -> Result<Decimal, ExtractError> {
    let text = find_marked_text(html).ok_or(ExtractError::NotFound)?;
    parse_price(&text)
}

/// Text content of the first `<span>` carrying the price marker class
fn find_marked_text(html: &str) -> Option<String> {
    let open = SPAN_OPEN.captures_iter(html).find(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().split_whitespace().any(|c| c == PRICE_MARKER_CLASS))
            .unwrap_or(false)
    })?;

    let rest = &html[open.get(0)?.end()..];
    let end = matching_close(rest)?;
    Some(text_content(&rest[..end]))
}

/// Offset of the `</span>` closing the element whose content starts `rest`
fn matching_close(rest: &str) -> Option<usize> {
    let mut depth = 1usize;
    for tag in SPAN_TAG.captures_iter(rest) {
        let whole = tag.get(0)?;
        if tag.get(1).is_some() {
            depth -= 1;
            if depth == 0 {
                return Some(whole.start());
            }
        } else if !whole.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    None
}

/// Drop currency symbols and thousands separators
pub fn clean_price_text(text: &str) -> String {
    text.chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn parse_price(text: &str) -> Result<Decimal, ExtractError> {
    let cleaned = clean_price_text(text);
    Decimal::from_str(&cleaned).map_err(|_| ExtractError::Unparseable(cleaned))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(inner: &str) -> String {
        format!(
            r#"<html><body><div id="corePrice">
                 <span class="a-price aok-align-center">
                   <span class="a-offscreen">{}</span>
                   <span aria-hidden="true">ignored</span>
                 </span>
               </div></body></html>"#,
            inner
        )
    }

    #[test]
    fn test_extracts_pound_price() {
        assert_eq!(extract_price(&page("£650.00")), Ok(Decimal::from_str("650.00").unwrap()));
    }

    #[test]
    fn test_strips_dollar_and_thousands_separator() {
        assert_eq!(clean_price_text("$1,234.56"), "1234.56");
        assert_eq!(extract_price(&page("$1,234.56")), Ok(Decimal::from_str("1234.56").unwrap()));
    }

    #[test]
    fn test_missing_marker_is_not_found() {
        let html = r#"<html><span class="a-price-whole">650</span></html>"#;
        assert_eq!(extract_price(html), Err(ExtractError::NotFound));
        assert_eq!(extract_price(""), Err(ExtractError::NotFound));
    }

    #[test]
    fn test_non_numeric_text_is_unparseable() {
        assert_eq!(
            extract_price(&page("N/A")),
            Err(ExtractError::Unparseable("N/A".to_string()))
        );
        assert_eq!(extract_price(&page("")), Err(ExtractError::Unparseable(String::new())));
    }

    #[test]
    fn test_first_marker_wins() {
        let html = r#"<span class='a-offscreen'>£590.00</span><span class="a-offscreen">£700.00</span>"#;
        assert_eq!(extract_price(html), Ok(Decimal::from_str("590.00").unwrap()));
    }

    #[test]
    fn test_marker_must_be_whole_class_token() {
        let html = r#"<span class="a-offscreen-label">£1.00</span><SPAN CLASS="x a-offscreen">&pound;2&#44;000.50</SPAN>"#;
        assert_eq!(extract_price(html), Ok(Decimal::from_str("2000.50").unwrap()));
    }

    #[test]
    fn test_nested_span_inside_marker() {
        let html = r#"<span class="a-offscreen"><span>£</span>650.00</span><span>£9.99</span>"#;
        assert_eq!(extract_price(html), Ok(Decimal::from_str("650.00").unwrap()));
    }

    #[test]
    fn test_other_attribute_ending_in_class_ignored() {
        let html = r#"<span data-class="a-offscreen">£1.00</span>"#;
        assert_eq!(extract_price(html), Err(ExtractError::NotFound));

        let html = r#"<span data-class="a-offscreen">£1.00</span><span id="p" class="a-offscreen">£3.50</span>"#;
        assert_eq!(extract_price(html), Ok(Decimal::from_str("3.50").unwrap()));
    }

    #[test]
    fn test_unclosed_marker_is_not_found() {
        assert_eq!(extract_price(r#"<span class="a-offscreen">£650.00"#), Err(ExtractError::NotFound));
    }
}
