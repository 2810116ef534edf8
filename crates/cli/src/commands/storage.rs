//! Raw blob inspection and schema upgrades.

use handset_basket::migrate::storage_key;
use handset_basket::{Cart, Favorites};
use serde_json::Value;

use super::{CliError, Context};

const AGGREGATES: [&str; 2] = ["cart", "favorites"];

/// Print each persisted blob, pretty-printed when it is valid JSON.
#[allow(clippy::print_stdout)]
pub fn show(ctx: &Context) -> Result<(), CliError> {
    println!("# {}", ctx.files.dir().display());
    for name in AGGREGATES {
        let key = storage_key(name);
        match ctx.files.try_get(&key)? {
            None => println!("{key}: <absent>"),
            Some(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => println!("{key}: {}", serde_json::to_string_pretty(&value)?),
                Err(_) => println!("{key}: <unparseable, {} bytes>", bytes.len()),
            },
        }
    }
    Ok(())
}

/// Load every aggregate through the migration pipeline and write it back in
/// the current schema.
pub fn upgrade(ctx: &Context) {
    let cart = Cart::open(ctx.storage());
    cart.flush();
    tracing::info!(lines = cart.len(), "Cart upgraded");

    let favorites = Favorites::open(ctx.storage());
    favorites.flush();
    tracing::info!(entries = favorites.len(), "Favorites upgraded");
}
