use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Optional classification attached to at most one per product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProductType {
    pub id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
