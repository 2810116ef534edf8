//! Handset CLI - inspect and edit persisted shopping state.
//!
//! Operates on the same file-backed blobs the storefront client writes, so
//! a cart can be examined, repaired or upgraded to the current schema from a
//! terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add two units of product 42 to the cart
//! hs-cli cart add 42 --name "Galaxy S24" --price 3999 --qty 2
//!
//! # Print the cart and the checkout link
//! hs-cli cart list
//! hs-cli cart checkout
//!
//! # Toggle a favorite, then move it to the cart
//! hs-cli favorites toggle 7 --name "Pixel 9" --price 2899
//! hs-cli favorites to-cart 7
//!
//! # Rewrite every blob in the current schema
//! hs-cli storage upgrade
//! ```
//!
//! # Commands
//!
//! - `cart` - List, add, remove, change quantities, clear, checkout
//! - `favorites` - List, toggle, remove, check, clear, move to cart
//! - `storage` - Show raw blobs, upgrade them to the current schema
//!
//! The storage directory comes from `--storage-dir` or `HANDSET_STORAGE_DIR`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "hs-cli")]
#[command(author, version, about = "Handset shopping state tools")]
struct Cli {
    /// Directory holding the persisted blobs (overrides `HANDSET_STORAGE_DIR`)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Inspect and upgrade persisted blobs
    Storage {
        #[command(subcommand)]
        action: StorageAction,
    },
}

/// Catalog fields for an item added from the command line.
#[derive(Args)]
struct ItemArgs {
    /// Product id
    id: String,

    /// Display name
    #[arg(long)]
    name: Option<String>,

    /// Unit price
    #[arg(long, default_value = "0")]
    price: Decimal,

    /// Image URL or path
    #[arg(long)]
    image: Option<String>,

    /// Brand label
    #[arg(long)]
    brand: Option<String>,

    /// Model designation
    #[arg(long)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum CartAction {
    /// Print every line and the totals
    List {
        /// Print the lines as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add units of a product
    Add {
        #[command(flatten)]
        item: ItemArgs,

        /// Units to add (values below 1 count as 1)
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        qty: i64,
    },
    /// Remove a line
    Remove { id: String },
    /// Set a line's quantity (0 or less removes it)
    Set {
        id: String,
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// Add one unit to a line
    Inc { id: String },
    /// Remove one unit from a line
    Dec { id: String },
    /// Remove every line
    Clear,
    /// Print the messaging checkout link
    Checkout {
        /// Request a single line instead of the whole cart
        #[arg(long)]
        item: Option<String>,
    },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// Print every favorite
    List {
        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a product to favorites, or remove it if already there
    Toggle {
        #[command(flatten)]
        item: ItemArgs,
    },
    /// Remove a favorite
    Remove { id: String },
    /// Report whether a product is a favorite
    Check { id: String },
    /// Remove every favorite
    Clear,
    /// Add a favorite to the cart
    ToCart {
        id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        qty: i64,
    },
}

#[derive(Subcommand)]
enum StorageAction {
    /// Print the raw persisted blobs
    Show,
    /// Migrate every blob and write it back in the current schema
    Upgrade,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Defaults to info level for the state crate if `RUST_LOG` is not set.
fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "handset_basket=info,hs_cli=info".into());

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = commands::Context::load(cli.storage_dir)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::List { json } => commands::cart::list(&ctx, json)?,
            CartAction::Add { item, qty } => commands::cart::add(&ctx, &item.into_catalog(), qty),
            CartAction::Remove { id } => commands::cart::remove(&ctx, &id),
            CartAction::Set { id, qty } => commands::cart::set(&ctx, &id, qty),
            CartAction::Inc { id } => commands::cart::increment(&ctx, &id),
            CartAction::Dec { id } => commands::cart::decrement(&ctx, &id),
            CartAction::Clear => commands::cart::clear(&ctx),
            CartAction::Checkout { item } => commands::cart::checkout(&ctx, item.as_deref())?,
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List { json } => commands::favorites::list(&ctx, json)?,
            FavoritesAction::Toggle { item } => {
                commands::favorites::toggle(&ctx, &item.into_catalog());
            }
            FavoritesAction::Remove { id } => commands::favorites::remove(&ctx, &id),
            FavoritesAction::Check { id } => commands::favorites::check(&ctx, &id),
            FavoritesAction::Clear => commands::favorites::clear(&ctx),
            FavoritesAction::ToCart { id, qty } => commands::favorites::to_cart(&ctx, &id, qty)?,
        },
        Commands::Storage { action } => match action {
            StorageAction::Show => commands::storage::show(&ctx)?,
            StorageAction::Upgrade => commands::storage::upgrade(&ctx),
        },
    }
    Ok(())
}

impl ItemArgs {
    fn into_catalog(self) -> handset_core::CatalogItem {
        let mut item = match self.name {
            Some(name) => handset_core::CatalogItem::new(self.id, name, self.price),
            None => handset_core::CatalogItem::bare(self.id, self.price),
        };
        item.image = self.image;
        item.brand_name = self.brand;
        item.model = self.model;
        item
    }
}
