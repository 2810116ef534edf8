//! Catalog item descriptors handed to the shopping state.
//!
//! The product-fetch layer owns the catalog; cart lines and favorites are
//! built from a [`CatalogItem`] and never call back into the catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ItemId;

/// Display data for one sellable item, as supplied by the catalog.
///
/// Only `id` and `price` are guaranteed; the shopping state fills in
/// placeholders for missing display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    /// Average review score, 0 to 5.
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub category_id: Option<ItemId>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand_id: Option<ItemId>,
    #[serde(default)]
    pub brand_name: Option<String>,
    /// Model designation, e.g. "iPhone 15 Pro 256GB".
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_color: Option<String>,
    #[serde(default)]
    pub near_color: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CatalogItem {
    /// Create a descriptor with the fields every page knows.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            price,
            image: None,
            slug: None,
            rating: None,
            category_id: None,
            category: None,
            brand_id: None,
            brand_name: None,
            model: None,
            base_color: None,
            near_color: None,
            thumbnail_url: None,
            note: None,
            tags: Vec::new(),
            created_at: None,
        }
    }

    /// Create a descriptor that carries nothing but an identity and a price.
    #[must_use]
    pub fn bare(id: impl Into<ItemId>, price: Decimal) -> Self {
        Self {
            name: None,
            ..Self::new(id, String::new(), price)
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    #[must_use]
    pub fn with_brand(mut self, brand_id: impl Into<ItemId>, brand_name: impl Into<String>) -> Self {
        self.brand_id = Some(brand_id.into());
        self.brand_name = Some(brand_name.into());
        self
    }

    #[must_use]
    pub fn with_category(
        mut self,
        category_id: impl Into<ItemId>,
        category: impl Into<String>,
    ) -> Self {
        self.category_id = Some(category_id.into());
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_colors(mut self, base: impl Into<String>, near: impl Into<String>) -> Self {
        self.base_color = Some(base.into());
        self.near_color = Some(near.into());
        self
    }

    #[must_use]
    pub const fn with_rating(mut self, rating: Decimal) -> Self {
        self.rating = Some(rating);
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A product row as returned by the catalog data source.
///
/// Only the columns the shopping state cares about are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ItemId,
    pub name: String,
    pub price: Decimal,
    /// Price after discount, when the product is on sale.
    #[serde(default)]
    pub final_price: Option<Decimal>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category_id: Option<ItemId>,
    #[serde(default)]
    pub brand_id: Option<ItemId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<CatalogProduct> for CatalogItem {
    fn from(product: CatalogProduct) -> Self {
        Self {
            id: product.id,
            name: Some(product.name),
            price: product.final_price.unwrap_or(product.price),
            image: product.thumbnail_url.clone(),
            slug: product.slug,
            rating: product.rating,
            category_id: product.category_id,
            category: None,
            brand_id: product.brand_id,
            brand_name: None,
            model: None,
            base_color: None,
            near_color: None,
            thumbnail_url: product.thumbnail_url,
            note: None,
            tags: Vec::new(),
            created_at: product.created_at,
        }
    }
}
