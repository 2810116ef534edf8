//! Integration tests for messaging checkout built from a persisted cart.

#![allow(clippy::unwrap_used)]

use handset_basket::CheckoutConfig;
use handset_basket::checkout::{item_request, messaging_link, order_summary};
use handset_integration_tests::{TestContext, phone};

#[test]
fn test_checkout_link_for_reloaded_cart() {
    let ctx = TestContext::new();
    let mut cart = ctx.cart();
    cart.add_to_cart(&phone(1, "Pixel 9", 2899), 2);
    cart.add(&phone(2, "Case", 49));

    let reloaded = ctx.cart();
    let config = CheckoutConfig::default();
    let text = order_summary(reloaded.lines(), &config.currency);
    assert!(text.contains("- Pixel 9 × 2"));
    assert!(text.contains("- Case × 1"));
    assert!(text.ends_with("Total: 5847.00 SAR"));

    let url = messaging_link(&config, &text);
    assert_eq!(url.host_str(), Some("wa.me"));
    assert_eq!(url.path(), "/966500000000");
    let (key, value) = url.query_pairs().next().unwrap();
    assert_eq!(key, "text");
    assert_eq!(value, text);
}

#[test]
fn test_single_item_request() {
    let ctx = TestContext::new();
    let mut cart = ctx.cart();
    cart.add_to_cart(&phone(9, "iPhone 15", 3799), 3);

    let text = item_request(cart.line(9).unwrap());
    assert!(text.contains("\"iPhone 15\" (3 pcs)"));
}
