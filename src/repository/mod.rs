use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::{
    category::Category,
    product::{NewProduct, Product, ProductRelations, UpdateProduct},
    product_type::ProductType,
};

pub mod category;
pub mod product;
pub mod product_type;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only access to product categories.
pub trait CategoryReader {
    fn get_category_by_id(&self, id: i32) -> RepositoryResult<Option<Category>>;
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
}

/// Read-only access to product types.
pub trait ProductTypeReader {
    fn get_product_type_by_id(&self, id: i32) -> RepositoryResult<Option<ProductType>>;
    fn list_product_types(&self) -> RepositoryResult<Vec<ProductType>>;
}

/// Read-only operations over product records.
///
/// `relations` controls which associated records are eagerly loaded.
pub trait ProductReader {
    fn get_product_by_id(
        &self,
        id: i32,
        relations: ProductRelations,
    ) -> RepositoryResult<Option<Product>>;
    fn list_products(&self, relations: ProductRelations) -> RepositoryResult<Vec<Product>>;
}

/// Write operations over product records and their product type link.
pub trait ProductWriter {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    fn update_product(&self, product_id: i32, updates: &UpdateProduct)
    -> RepositoryResult<Product>;
    fn delete_product(&self, product_id: i32) -> RepositoryResult<()>;
}
