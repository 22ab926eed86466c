use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Row of the `product_type_products` association table.
#[derive(Debug, Clone, Identifiable, Queryable, Associations, Selectable)]
#[diesel(
    table_name = crate::schema::product_type_products,
    belongs_to(super::product::Product, foreign_key = product_id),
    belongs_to(super::product_type::ProductType, foreign_key = product_type_id)
)]
pub struct ProductTypeLink {
    pub id: i32,
    pub product_id: i32,
    pub product_type_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_type_products)]
pub struct NewProductTypeLink {
    pub product_id: i32,
    pub product_type_id: i32,
}

impl NewProductTypeLink {
    pub fn new(product_id: i32, product_type_id: i32) -> Self {
        Self {
            product_id,
            product_type_id,
        }
    }
}
