//! Favorites commands.

use handset_basket::{Cart, Favorites};
use handset_core::CatalogItem;

use super::{CliError, Context};

/// Print every favorite.
#[allow(clippy::print_stdout)]
pub fn list(ctx: &Context, json: bool) -> Result<(), CliError> {
    let favorites = Favorites::open(ctx.storage());

    if json {
        println!("{}", serde_json::to_string_pretty(favorites.entries())?);
        return Ok(());
    }

    if favorites.is_empty() {
        println!("No favorites");
    }
    for entry in favorites.entries() {
        println!("{:>8}  {}  {:.2}", entry.id.as_str(), entry.details.name, entry.details.price);
    }
    Ok(())
}

pub fn toggle(ctx: &Context, item: &CatalogItem) {
    let mut favorites = Favorites::open(ctx.storage());
    if favorites.toggle_favorite(item) {
        tracing::info!(id = %item.id, "Added to favorites");
    } else {
        tracing::info!(id = %item.id, "Removed from favorites");
    }
}

pub fn remove(ctx: &Context, id: &str) {
    let mut favorites = Favorites::open(ctx.storage());
    favorites.remove_favorite(id);
    tracing::info!(id, "Removed from favorites");
}

/// Print `yes` or `no`.
#[allow(clippy::print_stdout)]
pub fn check(ctx: &Context, id: &str) {
    let favorites = Favorites::open(ctx.storage());
    println!("{}", if favorites.is_favorite(id) { "yes" } else { "no" });
}

pub fn clear(ctx: &Context) {
    let mut favorites = Favorites::open(ctx.storage());
    favorites.clear();
    tracing::info!("Favorites cleared");
}

/// Add the favorite `id` to the cart. The favorite is kept.
pub fn to_cart(ctx: &Context, id: &str, qty: i64) -> Result<(), CliError> {
    let favorites = Favorites::open(ctx.storage());
    let entry = favorites
        .entry(id)
        .ok_or_else(|| CliError::NotAFavorite(id.to_owned()))?;

    let mut cart = Cart::open(ctx.storage());
    cart.add_favorite_to_cart(entry, qty);
    tracing::info!(id, quantity = cart.quantity_of(id), "Favorite added to cart");
    Ok(())
}
