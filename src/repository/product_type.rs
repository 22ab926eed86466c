use diesel::prelude::*;
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::product_type::ProductType as DomainProductType;
use crate::models::product_type::ProductType as DbProductType;
use crate::repository::{DieselRepository, ProductTypeReader};

impl ProductTypeReader for DieselRepository {
    fn get_product_type_by_id(&self, id: i32) -> RepositoryResult<Option<DomainProductType>> {
        use crate::schema::product_types;

        let mut conn = self.conn()?;

        let product_type = product_types::table
            .filter(product_types::id.eq(id))
            .first::<DbProductType>(&mut conn)
            .optional()?;

        Ok(product_type.map(DomainProductType::from))
    }

    fn list_product_types(&self) -> RepositoryResult<Vec<DomainProductType>> {
        use crate::schema::product_types;

        let mut conn = self.conn()?;

        let product_types = product_types::table
            .order((product_types::name.asc(), product_types::id.asc()))
            .load::<DbProductType>(&mut conn)?;

        Ok(product_types
            .into_iter()
            .map(DomainProductType::from)
            .collect())
    }
}
