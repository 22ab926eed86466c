use std::collections::{HashMap, HashSet};

use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::category::Category as DomainCategory,
    domain::product::{
        NewProduct as DomainNewProduct, Product as DomainProduct, ProductRelations,
        UpdateProduct as DomainUpdateProduct,
    },
    domain::product_type::ProductType as DomainProductType,
    models::category::Category as DbCategory,
    models::product::{
        NewProduct as DbNewProduct, Product as DbProduct, UpdateProduct as DbUpdateProduct,
    },
    models::product_type::ProductType as DbProductType,
    models::product_type_link::{NewProductTypeLink, ProductTypeLink as DbProductTypeLink},
    repository::{DieselRepository, ProductReader, ProductWriter},
};

impl ProductReader for DieselRepository {
    fn get_product_by_id(
        &self,
        id: i32,
        relations: ProductRelations,
    ) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let product = products::table
            .filter(products::id.eq(id))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        match product {
            Some(db_product) => {
                let mut loaded = hydrate_products(&mut conn, vec![db_product], relations)?;
                Ok(loaded.pop())
            }
            None => Ok(None),
        }
    }

    fn list_products(&self, relations: ProductRelations) -> RepositoryResult<Vec<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let db_products = products::table
            .order((products::created_at.desc(), products::id.desc()))
            .load::<DbProduct>(&mut conn)?;

        hydrate_products(&mut conn, db_products, relations)
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        use crate::schema::{product_type_products, products};

        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            ensure_references(conn, new_product.category_id, new_product.product_type_id)?;

            let db_new = DbNewProduct::from(new_product);
            let created = diesel::insert_into(products::table)
                .values(&db_new)
                .get_result::<DbProduct>(conn)?;

            if let Some(product_type_id) = new_product.product_type_id {
                diesel::insert_into(product_type_products::table)
                    .values(&NewProductTypeLink::new(created.id, product_type_id))
                    .execute(conn)?;
            }

            let mut domain: DomainProduct = created.into();
            domain.product_type_id = new_product.product_type_id;
            Ok(domain)
        })
    }

    fn update_product(
        &self,
        product_id: i32,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::{product_type_products, products};

        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            ensure_references(conn, updates.category_id, updates.product_type_id)?;

            let db_updates = DbUpdateProduct::from(updates);
            let updated = diesel::update(products::table.filter(products::id.eq(product_id)))
                .set(&db_updates)
                .get_result::<DbProduct>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            diesel::delete(
                product_type_products::table
                    .filter(product_type_products::product_id.eq(product_id)),
            )
            .execute(conn)?;

            if let Some(product_type_id) = updates.product_type_id {
                diesel::insert_into(product_type_products::table)
                    .values(&NewProductTypeLink::new(product_id, product_type_id))
                    .execute(conn)?;
            }

            let mut domain: DomainProduct = updated.into();
            domain.product_type_id = updates.product_type_id;
            Ok(domain)
        })
    }

    fn delete_product(&self, product_id: i32) -> RepositoryResult<()> {
        use crate::schema::{product_type_products, products};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            diesel::delete(
                product_type_products::table
                    .filter(product_type_products::product_id.eq(product_id)),
            )
            .execute(conn)?;

            let deleted = diesel::delete(products::table.filter(products::id.eq(product_id)))
                .execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(())
        })
    }
}

fn ensure_references(
    conn: &mut SqliteConnection,
    category_id: i32,
    product_type_id: Option<i32>,
) -> RepositoryResult<()> {
    use crate::schema::{categories, product_types};

    let category_exists: bool =
        select(exists(categories::table.filter(categories::id.eq(category_id))))
            .get_result(conn)?;
    if !category_exists {
        return Err(RepositoryError::NotFound);
    }

    if let Some(product_type_id) = product_type_id {
        let type_exists: bool = select(exists(
            product_types::table.filter(product_types::id.eq(product_type_id)),
        ))
        .get_result(conn)?;
        if !type_exists {
            return Err(RepositoryError::NotFound);
        }
    }

    Ok(())
}

/// Converts product rows into domain products, attaching the type link and
/// whichever relations were requested. Keeps the input order.
fn hydrate_products(
    conn: &mut SqliteConnection,
    db_products: Vec<DbProduct>,
    relations: ProductRelations,
) -> RepositoryResult<Vec<DomainProduct>> {
    if db_products.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<i32> = db_products.iter().map(|product| product.id).collect();
    let type_links = load_type_links(conn, &product_ids)?;

    let categories = if relations.category {
        let category_ids: HashSet<i32> = db_products
            .iter()
            .map(|product| product.category_id)
            .collect();
        load_categories(conn, &category_ids)?
    } else {
        HashMap::new()
    };

    let product_types = if relations.product_type {
        let type_ids: HashSet<i32> = type_links.values().copied().collect();
        load_product_types(conn, &type_ids)?
    } else {
        HashMap::new()
    };

    let mut domain_products = Vec::with_capacity(db_products.len());
    for db_product in db_products {
        let mut domain: DomainProduct = db_product.into();
        domain.product_type_id = type_links.get(&domain.id).copied();
        domain.category = categories.get(&domain.category_id).cloned();
        domain.product_type = domain
            .product_type_id
            .and_then(|type_id| product_types.get(&type_id).cloned());
        domain_products.push(domain);
    }

    Ok(domain_products)
}

fn load_type_links(
    conn: &mut SqliteConnection,
    product_ids: &[i32],
) -> RepositoryResult<HashMap<i32, i32>> {
    use crate::schema::product_type_products;

    let rows = product_type_products::table
        .filter(product_type_products::product_id.eq_any(product_ids))
        .load::<DbProductTypeLink>(conn)?;

    Ok(rows
        .into_iter()
        .map(|link| (link.product_id, link.product_type_id))
        .collect())
}

fn load_categories(
    conn: &mut SqliteConnection,
    category_ids: &HashSet<i32>,
) -> RepositoryResult<HashMap<i32, DomainCategory>> {
    use crate::schema::categories;

    if category_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let ids: Vec<i32> = category_ids.iter().copied().collect();
    let rows = categories::table
        .filter(categories::id.eq_any(ids))
        .load::<DbCategory>(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| (row.id, DomainCategory::from(row)))
        .collect())
}

fn load_product_types(
    conn: &mut SqliteConnection,
    type_ids: &HashSet<i32>,
) -> RepositoryResult<HashMap<i32, DomainProductType>> {
    use crate::schema::product_types;

    if type_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let ids: Vec<i32> = type_ids.iter().copied().collect();
    let rows = product_types::table
        .filter(product_types::id.eq_any(ids))
        .load::<DbProductType>(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| (row.id, DomainProductType::from(row)))
        .collect())
}
