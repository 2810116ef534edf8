//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! hs-cli cart add 42 --name "Galaxy S24" --price 3999 --qty 2
//! hs-cli cart set 42 5
//! hs-cli cart dec 42
//! hs-cli cart checkout --item 42
//! ```

use handset_basket::checkout;
use handset_basket::{Cart, CartLine};
use handset_core::CatalogItem;

use super::{CliError, Context};

/// Print every line and the totals.
#[allow(clippy::print_stdout)]
pub fn list(ctx: &Context, json: bool) -> Result<(), CliError> {
    let cart = Cart::open(ctx.storage());

    if json {
        println!("{}", serde_json::to_string_pretty(cart.lines())?);
        return Ok(());
    }

    if cart.is_empty() {
        println!("Cart is empty");
        return Ok(());
    }
    for line in cart.lines() {
        println!("{}", describe(line));
    }
    println!(
        "{} item(s), total {:.2} {}",
        cart.total_count(),
        cart.total_price(),
        ctx.config.checkout.currency
    );
    Ok(())
}

/// Add `qty` units of `item`.
pub fn add(ctx: &Context, item: &CatalogItem, qty: i64) {
    let mut cart = Cart::open(ctx.storage());
    cart.add_to_cart(item, qty);
    tracing::info!(id = %item.id, quantity = cart.quantity_of(&item.id), "Added to cart");
}

pub fn remove(ctx: &Context, id: &str) {
    let mut cart = Cart::open(ctx.storage());
    cart.remove_from_cart(id);
    tracing::info!(id, "Removed from cart");
}

pub fn set(ctx: &Context, id: &str, qty: i64) {
    let mut cart = Cart::open(ctx.storage());
    cart.set_quantity(id, qty);
    tracing::info!(id, quantity = cart.quantity_of(id), "Quantity set");
}

pub fn increment(ctx: &Context, id: &str) {
    let mut cart = Cart::open(ctx.storage());
    cart.increment(id);
    tracing::info!(id, quantity = cart.quantity_of(id), "Incremented");
}

pub fn decrement(ctx: &Context, id: &str) {
    let mut cart = Cart::open(ctx.storage());
    cart.decrement(id);
    tracing::info!(id, quantity = cart.quantity_of(id), "Decremented");
}

pub fn clear(ctx: &Context) {
    let mut cart = Cart::open(ctx.storage());
    cart.clear_cart();
    tracing::info!("Cart cleared");
}

/// Print the messaging link for the whole cart, or for one line.
#[allow(clippy::print_stdout)]
pub fn checkout(ctx: &Context, item: Option<&str>) -> Result<(), CliError> {
    let cart = Cart::open(ctx.storage());
    let checkout_config = &ctx.config.checkout;

    let text = match item {
        Some(id) => {
            let line = cart
                .line(id)
                .ok_or_else(|| CliError::NotInCart(id.to_owned()))?;
            checkout::item_request(line)
        }
        None => checkout::order_summary(cart.lines(), &checkout_config.currency),
    };

    println!("{}", checkout::messaging_link(checkout_config, &text));
    Ok(())
}

fn describe(line: &CartLine) -> String {
    format!(
        "{:>8}  {} × {}  @ {:.2} = {:.2}",
        line.id.as_str(),
        line.details.name,
        line.quantity,
        line.details.price,
        line.line_total()
    )
}
