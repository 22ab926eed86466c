use mockall::mock;

use super::{CategoryReader, ProductReader, ProductTypeReader, ProductWriter};
use crate::domain::{
    category::Category,
    product::{NewProduct, Product, ProductRelations, UpdateProduct},
    product_type::ProductType,
};
use pushkind_common::repository::errors::RepositoryResult;

mock! {
    pub CategoryReader {}

    impl CategoryReader for CategoryReader {
        fn get_category_by_id(&self, id: i32) -> RepositoryResult<Option<Category>>;
        fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    }
}

mock! {
    pub ProductTypeReader {}

    impl ProductTypeReader for ProductTypeReader {
        fn get_product_type_by_id(&self, id: i32) -> RepositoryResult<Option<ProductType>>;
        fn list_product_types(&self) -> RepositoryResult<Vec<ProductType>>;
    }
}

mock! {
    pub ProductReader {}

    impl ProductReader for ProductReader {
        fn get_product_by_id(&self, id: i32, relations: ProductRelations) -> RepositoryResult<Option<Product>>;
        fn list_products(&self, relations: ProductRelations) -> RepositoryResult<Vec<Product>>;
    }
}

mock! {
    pub ProductWriter {}

    impl ProductWriter for ProductWriter {
        fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
        fn update_product(&self, product_id: i32, updates: &UpdateProduct) -> RepositoryResult<Product>;
        fn delete_product(&self, product_id: i32) -> RepositoryResult<()>;
    }
}
