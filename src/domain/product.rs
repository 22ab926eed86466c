use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{category::Category, product_type::ProductType};

/// Domain representation of a catalog product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier of the product.
    pub id: i32,
    /// Human-readable name of the product.
    pub name: String,
    /// Price represented in the smallest currency unit (for example cents).
    pub price_cents: i64,
    /// Public URL of the featured image, when one is stored.
    pub image_url: Option<String>,
    /// Identifier of the owning category.
    pub category_id: i32,
    /// Identifier of the linked product type, if any.
    pub product_type_id: Option<i32>,
    /// Owning category, present only when loaded with [`ProductRelations::category`].
    pub category: Option<Category>,
    /// Linked product type, present only when loaded with [`ProductRelations::product_type`].
    pub product_type: Option<ProductType>,
    /// Timestamp for when the product record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the product record.
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    /// Human-readable name of the product.
    pub name: String,
    /// Price represented in the smallest currency unit.
    pub price_cents: i64,
    /// Public URL of the stored featured image.
    pub image_url: Option<String>,
    /// Identifier of the owning category.
    pub category_id: i32,
    /// Identifier of the product type to link, if any.
    pub product_type_id: Option<i32>,
    /// Timestamp captured when the product payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewProduct {
    /// Build a new product payload with the supplied details and current timestamp.
    pub fn new(name: impl Into<String>, price_cents: i64, category_id: i32) -> Self {
        let now = chrono::Local::now().naive_utc();
        Self {
            name: name.into(),
            price_cents,
            image_url: None,
            category_id,
            product_type_id: None,
            updated_at: now,
        }
    }

    /// Link the product to a product type.
    pub fn with_product_type(mut self, product_type_id: i32) -> Self {
        self.product_type_id = Some(product_type_id);
        self
    }

    /// Attach the URL of an already stored image.
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// Full replacement of the editable product fields.
///
/// `product_type_id` replaces the current link: `None` removes it.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProduct {
    pub name: String,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub category_id: i32,
    pub product_type_id: Option<i32>,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl UpdateProduct {
    /// Create an update that keeps no image and links no product type.
    pub fn new(name: impl Into<String>, price_cents: i64, category_id: i32) -> Self {
        let now = chrono::Local::now().naive_utc();
        Self {
            name: name.into(),
            price_cents,
            image_url: None,
            category_id,
            product_type_id: None,
            updated_at: now,
        }
    }

    /// Set or clear the product type link.
    pub fn product_type(mut self, product_type_id: Option<i32>) -> Self {
        self.product_type_id = product_type_id;
        self
    }

    /// Set or clear the image URL.
    pub fn image_url(mut self, image_url: Option<impl Into<String>>) -> Self {
        self.image_url = image_url.map(|value| value.into());
        self
    }
}

/// Related records that should be loaded together with products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductRelations {
    /// Load the owning [`Category`].
    pub category: bool,
    /// Load the linked [`ProductType`].
    pub product_type: bool,
}

impl ProductRelations {
    /// Load the product row and its type link id only.
    pub fn none() -> Self {
        Self::default()
    }

    /// Load every relation.
    pub fn all() -> Self {
        Self {
            category: true,
            product_type: true,
        }
    }
}
