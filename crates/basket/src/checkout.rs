//! Checkout by messaging.
//!
//! There is no order pipeline: checkout hands a prefilled message to an
//! external messaging app. This module only composes the message text and
//! the deep link that opens it.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use url::Url;

use crate::cart::CartLine;
use crate::config::CheckoutConfig;
use crate::selectors;

const ORDER_GREETING: &str = "Hello, I would like to order the following products from the phone store:";

/// Message listing every cart line and the order total.
///
/// ```text
/// Hello, I would like to order the following products from the phone store:
/// - Galaxy S24 × 2
/// Total: 7998.00 SAR
/// ```
#[must_use]
pub fn order_summary(lines: &[CartLine], currency: &str) -> String {
    let mut text = String::from(ORDER_GREETING);
    for line in lines {
        let _ = write!(text, "\n- {} × {}", line.details.name, line.quantity);
    }
    let _ = write!(
        text,
        "\nTotal: {} {currency}",
        format_amount(selectors::total_price(lines))
    );
    text
}

/// Message requesting a single cart line.
#[must_use]
pub fn item_request(line: &CartLine) -> String {
    format!(
        "Hello, I would like to order \"{}\" ({} pcs) from the phone store.",
        line.details.name, line.quantity
    )
}

/// Deep link opening a chat with the store, prefilled with `text`.
///
/// `<base_url><phone>?text=<percent-encoded text>`
#[must_use]
pub fn messaging_link(config: &CheckoutConfig, text: &str) -> Url {
    let mut url = config.base_url.clone();
    let path = format!("{}{}", config.base_url.path(), config.phone);
    url.set_path(&path);
    url.set_query(Some(&format!("text={}", urlencoding::encode(text))));
    url
}

fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use handset_core::{CatalogItem, Quantity};

    use super::*;

    fn line(id: i64, name: &str, price: Decimal, qty: i64) -> CartLine {
        CartLine::new(&CatalogItem::new(id, name, price), Quantity::clamped(qty))
    }

    #[test]
    fn test_order_summary() {
        let lines = [
            line(1, "Galaxy S24", Decimal::new(399_950, 2), 2),
            line(2, "Case", Decimal::new(4999, 2), 1),
        ];
        let text = order_summary(&lines, "SAR");
        assert_eq!(
            text,
            "Hello, I would like to order the following products from the phone store:\n\
             - Galaxy S24 × 2\n\
             - Case × 1\n\
             Total: 8048.99 SAR"
        );
    }

    #[test]
    fn test_order_summary_empty_cart() {
        let text = order_summary(&[], "USD");
        assert!(text.ends_with("\nTotal: 0.00 USD"));
    }

    #[test]
    fn test_order_summary_with_out_of_range_total() {
        let lines = [line(1, "Gold", Decimal::MAX, 2)];
        let text = order_summary(&lines, "SAR");
        assert!(text.contains("- Gold × 2"));
        assert!(text.ends_with(" SAR"));
    }

    #[test]
    fn test_amount_is_rounded_to_cents() {
        assert_eq!(format_amount(Decimal::new(12_345, 3)), "12.35");
        assert_eq!(format_amount(Decimal::from(7)), "7.00");
    }

    #[test]
    fn test_item_request() {
        let text = item_request(&line(1, "Pixel 9", Decimal::ONE, 3));
        assert_eq!(
            text,
            "Hello, I would like to order \"Pixel 9\" (3 pcs) from the phone store."
        );
    }

    #[test]
    fn test_messaging_link() {
        let config = CheckoutConfig::default();
        let url = messaging_link(&config, "Hi there & bye\n- A × 1");
        assert_eq!(
            url.as_str(),
            "https://wa.me/966500000000?text=Hi%20there%20%26%20bye%0A-%20A%20%C3%97%201"
        );
    }

    #[test]
    fn test_messaging_link_keeps_base_path() {
        let config = CheckoutConfig {
            base_url: Url::parse("https://chat.example.com/send/").unwrap(),
            ..CheckoutConfig::default()
        };
        let url = messaging_link(&config, "x");
        assert_eq!(url.as_str(), "https://chat.example.com/send/966500000000?text=x");
    }
}
