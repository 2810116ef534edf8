//! Display fields shared by cart lines and favorites.
//!
//! Every field that the UI renders unconditionally (name, image, brand and
//! category labels) is non-optional here; placeholders are applied when an
//! item is first created or migrated, never at render time.

use chrono::{DateTime, Utc};
use handset_core::{CatalogItem, ItemId};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

/// Name shown for items whose name is missing.
pub const PLACEHOLDER_NAME: &str = "Unavailable product";

/// Image shown for items without a renderable image.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholders/phone-placeholder.jpg";

/// Label used for a missing brand or category.
pub const UNSPECIFIED_LABEL: &str = "Unspecified";

/// An ordered list of historical keys for one field.
///
/// The first key holding a usable value wins; later keys are only consulted
/// when every earlier one is absent, empty or of the wrong type.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    candidates: &'static [&'static str],
}

impl Field {
    #[must_use]
    pub const fn new(candidates: &'static [&'static str]) -> Self {
        Self { candidates }
    }

    /// The candidate keys, in priority order.
    #[must_use]
    pub const fn candidates(&self) -> &'static [&'static str] {
        self.candidates
    }

    /// Raw value of the first candidate key present, whatever its type.
    #[must_use]
    pub fn value<'a>(&self, raw: &'a Map<String, Value>) -> Option<&'a Value> {
        self.candidates.iter().find_map(|key| raw.get(*key))
    }

    fn first<T>(&self, raw: &Map<String, Value>, extract: impl Fn(&Value) -> Option<T>) -> Option<T> {
        self.candidates
            .iter()
            .filter_map(|key| raw.get(*key))
            .find_map(extract)
    }

    /// First non-empty string.
    #[must_use]
    pub fn text(&self, raw: &Map<String, Value>) -> Option<String> {
        self.first(raw, |v| v.as_str().filter(|s| !s.is_empty()).map(str::to_owned))
    }

    /// First string usable as an image source.
    #[must_use]
    pub fn image(&self, raw: &Map<String, Value>) -> Option<String> {
        self.first(raw, |v| v.as_str().filter(|s| is_renderable_image(s)).map(str::to_owned))
    }

    /// First number or numeric string.
    #[must_use]
    pub fn decimal(&self, raw: &Map<String, Value>) -> Option<Decimal> {
        self.first(raw, decimal_from_json)
    }

    /// First number or non-empty string, as an identity.
    #[must_use]
    pub fn identity(&self, raw: &Map<String, Value>) -> Option<ItemId> {
        self.first(raw, ItemId::from_json)
    }

    /// First RFC 3339 timestamp.
    #[must_use]
    pub fn timestamp(&self, raw: &Map<String, Value>) -> Option<DateTime<Utc>> {
        self.first(raw, |v| {
            v.as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc))
        })
    }

    /// First array, keeping its string elements.
    #[must_use]
    pub fn string_list(&self, raw: &Map<String, Value>) -> Option<Vec<String>> {
        self.first(raw, |v| {
            v.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(|t| t.as_str().map(str::to_owned))
                    .collect()
            })
        })
    }
}

/// Field sources for every persisted display field.
pub mod fields {
    use super::Field;

    pub const ID: Field = Field::new(&["id"]);
    /// Older catalogs called the display name `title`.
    pub const NAME: Field = Field::new(&["name", "title"]);
    /// `cover_url` comes from the book-shop era of the data.
    pub const IMAGE: Field = Field::new(&["image", "thumbnail_url", "cover_url"]);
    pub const PRICE: Field = Field::new(&["price", "final_price"]);
    pub const SLUG: Field = Field::new(&["slug"]);
    pub const RATING: Field = Field::new(&["rating"]);
    pub const CATEGORY_ID: Field = Field::new(&["category_id"]);
    pub const CATEGORY: Field = Field::new(&["category", "category_name"]);
    pub const BRAND_ID: Field = Field::new(&["brand_id"]);
    pub const BRAND: Field = Field::new(&["brand_name", "brand"]);
    /// Model designation was persisted as `identity` before the rename.
    pub const MODEL: Field = Field::new(&["model", "identity"]);
    pub const BASE_COLOR: Field = Field::new(&["base_color"]);
    pub const NEAR_COLOR: Field = Field::new(&["near_color"]);
    pub const THUMBNAIL: Field = Field::new(&["thumbnail_url"]);
    pub const CREATED_AT: Field = Field::new(&["created_at"]);
    pub const NOTE: Field = Field::new(&["note"]);
    pub const TAGS: Field = Field::new(&["tags"]);
    pub const QUANTITY: Field = Field::new(&["quantity", "qty"]);
}

/// Whether a string can be handed to an image element as-is.
#[must_use]
pub fn is_renderable_image(src: &str) -> bool {
    src.starts_with('/') || src.starts_with("http")
}

fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Empty strings are stored as absent, the same way migration reads them.
pub(crate) fn non_empty(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(str::to_owned)
}

fn non_empty_id(id: Option<&ItemId>) -> Option<ItemId> {
    id.filter(|id| !id.is_empty()).cloned()
}

fn label_or_unspecified(label: Option<&str>) -> String {
    label
        .filter(|l| !l.is_empty())
        .unwrap_or(UNSPECIFIED_LABEL)
        .to_owned()
}

/// Display fields of a cart line or favorite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDetails {
    pub name: String,
    pub price: Decimal,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<ItemId>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<ItemId>,
    pub brand_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ItemDetails {
    /// Build display fields for a new entry, applying placeholders.
    #[must_use]
    pub fn from_catalog(item: &CatalogItem) -> Self {
        Self {
            name: item
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_NAME.to_owned()),
            price: item.price,
            image: item
                .image
                .iter()
                .chain(&item.thumbnail_url)
                .find(|src| is_renderable_image(src))
                .cloned()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
            slug: non_empty(item.slug.as_deref()),
            rating: item.rating,
            category_id: non_empty_id(item.category_id.as_ref()),
            category: label_or_unspecified(item.category.as_deref()),
            brand_id: non_empty_id(item.brand_id.as_ref()),
            brand_name: label_or_unspecified(item.brand_name.as_deref()),
            model: non_empty(item.model.as_deref()),
            base_color: non_empty(item.base_color.as_deref()),
            near_color: non_empty(item.near_color.as_deref()),
            thumbnail_url: non_empty(item.thumbnail_url.as_deref()),
            created_at: item.created_at,
        }
    }

    /// Rebuild display fields from a persisted object of any historical shape.
    #[must_use]
    pub fn from_persisted(raw: &Map<String, Value>) -> Self {
        Self {
            name: fields::NAME
                .text(raw)
                .unwrap_or_else(|| PLACEHOLDER_NAME.to_owned()),
            price: fields::PRICE.decimal(raw).unwrap_or_default(),
            image: fields::IMAGE
                .image(raw)
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
            slug: fields::SLUG.text(raw),
            rating: fields::RATING.decimal(raw),
            category_id: fields::CATEGORY_ID.identity(raw),
            category: label_or_unspecified(fields::CATEGORY.text(raw).as_deref()),
            brand_id: fields::BRAND_ID.identity(raw),
            brand_name: label_or_unspecified(fields::BRAND.text(raw).as_deref()),
            model: fields::MODEL.text(raw),
            base_color: fields::BASE_COLOR.text(raw),
            near_color: fields::NEAR_COLOR.text(raw),
            thumbnail_url: fields::THUMBNAIL.text(raw),
            created_at: fields::CREATED_AT.timestamp(raw),
        }
    }

    /// Convert back into a catalog descriptor.
    #[must_use]
    pub fn to_catalog(&self, id: &ItemId) -> CatalogItem {
        CatalogItem {
            id: id.clone(),
            name: Some(self.name.clone()),
            price: self.price,
            image: Some(self.image.clone()),
            slug: self.slug.clone(),
            rating: self.rating,
            category_id: self.category_id.clone(),
            category: Some(self.category.clone()),
            brand_id: self.brand_id.clone(),
            brand_name: Some(self.brand_name.clone()),
            model: self.model.clone(),
            base_color: self.base_color.clone(),
            near_color: self.near_color.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            note: None,
            tags: Vec::new(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: &Value) -> &Map<String, Value> {
        value.as_object().unwrap()
    }

    #[test]
    fn test_first_candidate_wins() {
        let raw = json!({"name": "Galaxy", "title": "Old title"});
        assert_eq!(fields::NAME.text(object(&raw)).unwrap(), "Galaxy");
    }

    #[test]
    fn test_falls_through_empty_and_mistyped_candidates() {
        let raw = json!({"name": "", "title": "Nokia 3310"});
        assert_eq!(fields::NAME.text(object(&raw)).unwrap(), "Nokia 3310");

        let raw = json!({"name": 42, "title": "Moto"});
        assert_eq!(fields::NAME.text(object(&raw)).unwrap(), "Moto");
    }

    #[test]
    fn test_image_skips_unrenderable_sources() {
        let raw = json!({"image": "blob.png", "thumbnail_url": "", "cover_url": "https://cdn/x.jpg"});
        assert_eq!(fields::IMAGE.image(object(&raw)).unwrap(), "https://cdn/x.jpg");
    }

    #[test]
    fn test_decimal_accepts_numbers_and_strings() {
        assert_eq!(
            fields::PRICE.decimal(object(&json!({"price": 10}))).unwrap(),
            Decimal::from(10)
        );
        assert_eq!(
            fields::PRICE.decimal(object(&json!({"price": "12.50"}))).unwrap(),
            Decimal::new(1250, 2)
        );
        assert_eq!(
            fields::PRICE
                .decimal(object(&json!({"price": "free", "final_price": 3})))
                .unwrap(),
            Decimal::from(3)
        );
    }

    #[test]
    fn test_timestamp() {
        let raw = json!({"created_at": "2024-05-01T12:00:00+03:00"});
        let ts = fields::CREATED_AT.timestamp(object(&raw)).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T09:00:00+00:00");
        assert!(fields::CREATED_AT.timestamp(object(&json!({"created_at": "yesterday"}))).is_none());
    }

    #[test]
    fn test_from_catalog_applies_placeholders() {
        let details = ItemDetails::from_catalog(&CatalogItem::bare(1, Decimal::from(5)));
        assert_eq!(details.name, PLACEHOLDER_NAME);
        assert_eq!(details.image, PLACEHOLDER_IMAGE);
        assert_eq!(details.brand_name, UNSPECIFIED_LABEL);
        assert_eq!(details.category, UNSPECIFIED_LABEL);
    }

    #[test]
    fn test_from_catalog_drops_empty_optional_text() {
        let item = CatalogItem::new(1, "A", Decimal::ONE)
            .with_slug("")
            .with_model("")
            .with_colors("", "blue")
            .with_brand("", "Nokia");
        let details = ItemDetails::from_catalog(&item);
        assert_eq!(details.slug, None);
        assert_eq!(details.model, None);
        assert_eq!(details.base_color, None);
        assert_eq!(details.near_color.as_deref(), Some("blue"));
        assert_eq!(details.brand_id, None);
    }

    #[test]
    fn test_catalog_details_survive_persisting() {
        let item = CatalogItem::new(1, "A", Decimal::new(1999, 2))
            .with_slug("")
            .with_image("/a.png")
            .with_model("X1")
            .with_category(3, "")
            .with_rating(Decimal::new(45, 1));
        let details = ItemDetails::from_catalog(&item);
        let raw = serde_json::to_value(&details).unwrap();
        assert_eq!(ItemDetails::from_persisted(object(&raw)), details);
    }

    #[test]
    fn test_from_catalog_uses_thumbnail_when_image_missing() {
        let mut item = CatalogItem::new(1, "A", Decimal::ONE);
        item.thumbnail_url = Some("/thumbs/a.png".to_string());
        assert_eq!(ItemDetails::from_catalog(&item).image, "/thumbs/a.png");
    }

    #[test]
    fn test_from_persisted_legacy_book_shape() {
        let raw = json!({"id": 3, "title": "Old Book", "cover_url": "/covers/3.jpg", "price": 40});
        let details = ItemDetails::from_persisted(object(&raw));
        assert_eq!(details.name, "Old Book");
        assert_eq!(details.image, "/covers/3.jpg");
        assert_eq!(details.price, Decimal::from(40));
        assert_eq!(details.brand_name, UNSPECIFIED_LABEL);
    }

    #[test]
    fn test_model_reads_legacy_identity_key() {
        let raw = json!({"identity": "iPhone 15 Pro 256GB"});
        assert_eq!(
            ItemDetails::from_persisted(object(&raw)).model.as_deref(),
            Some("iPhone 15 Pro 256GB")
        );
    }
}
