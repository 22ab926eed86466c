use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::repository::errors::RepositoryError;
use pushkind_common::routes::check_role;
use serde::Serialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::{
    category::Category,
    image::ImageUpload,
    product::{NewProduct, Product, ProductRelations, UpdateProduct},
    product_type::ProductType,
};
use crate::forms::products::{ProductForm, ProductFormValues, format_price};
use crate::repository::{CategoryReader, ProductReader, ProductTypeReader, ProductWriter};
use crate::services::{Entity, ServiceError, ServiceResult};
use crate::storage::{FileStorage, PRODUCT_IMAGE_NAMESPACE};

/// Data required to render the products index template.
pub struct ProductsPageData {
    /// Every product, newest first.
    pub products: Vec<ProductView>,
}

/// Data required to render the add/edit product templates.
#[derive(Debug)]
pub struct ProductFormData {
    /// All categories offered in the category select.
    pub categories: Vec<Category>,
    /// All product types offered in the product type select.
    pub product_types: Vec<ProductType>,
    /// Values pre-filled into the form fields.
    pub values: ProductFormValues,
    /// Product being edited, `None` on the add form.
    pub product_id: Option<i32>,
    /// Current image of the edited product.
    pub image_url: Option<String>,
}

impl ProductFormData {
    /// Replace the pre-filled values, e.g. with rejected user input.
    pub fn with_values(mut self, values: ProductFormValues) -> Self {
        self.values = values;
        self
    }
}

/// Loads the products overview page.
pub fn load_products_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<ProductsPageData>
where
    R: ProductReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let products = repo
        .list_products(ProductRelations::all())
        .map_err(ServiceError::from)?;

    Ok(ProductsPageData {
        products: products.into_iter().map(ProductView::from).collect(),
    })
}

/// Loads the reference lists for an empty "Add product" form.
pub fn load_add_product_form<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<ProductFormData>
where
    R: CategoryReader + ProductTypeReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let (categories, product_types) = load_reference_lists(repo)?;

    Ok(ProductFormData {
        categories,
        product_types,
        values: ProductFormValues::default(),
        product_id: None,
        image_url: None,
    })
}

/// Loads an existing product into the "Edit product" form.
pub fn load_edit_product_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: i32,
) -> ServiceResult<ProductFormData>
where
    R: ProductReader + CategoryReader + ProductTypeReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let product = repo
        .get_product_by_id(product_id, ProductRelations::all())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound(Entity::Product))?;

    let (categories, product_types) = load_reference_lists(repo)?;

    let values = ProductFormValues {
        name: product.name,
        price: format_price(product.price_cents),
        category_id: Some(product.category_id),
        product_type_id: product.product_type_id,
    };

    Ok(ProductFormData {
        categories,
        product_types,
        values,
        product_id: Some(product.id),
        image_url: product.image_url,
    })
}

/// Creates a product, storing its image first.
///
/// When the record cannot be saved the freshly stored image is removed again.
pub fn create_product<R, S>(
    repo: &R,
    storage: &S,
    user: &AuthenticatedUser,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: CategoryReader + ProductTypeReader + ProductWriter + ?Sized,
    S: FileStorage + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let payload = form
        .into_create_payload()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    ensure_references(repo, payload.category_id, payload.product_type_id)?;

    let image = payload
        .image
        .as_ref()
        .ok_or_else(|| ServiceError::Form("product image is required".to_string()))?;
    let image_url = storage.store(image, PRODUCT_IMAGE_NAMESPACE)?;

    let mut new_product = NewProduct::new(payload.name, payload.price_cents, payload.category_id)
        .with_image_url(image_url.as_str());
    if let Some(product_type_id) = payload.product_type_id {
        new_product = new_product.with_product_type(product_type_id);
    }

    match repo.create_product(&new_product) {
        Ok(created) => {
            log::info!("Created product {} ({})", created.id, created.name);
            Ok(created)
        }
        Err(err) => {
            log::error!("Failed to save new product {}: {err}", new_product.name);
            discard_image(storage, &image_url);
            Err(write_error(
                repo,
                err,
                new_product.category_id,
                new_product.product_type_id,
            ))
        }
    }
}

/// Updates a product.
///
/// A newly uploaded image is stored before the record is saved and the
/// previous image is removed only after the save succeeded.
pub fn update_product<R, S>(
    repo: &R,
    storage: &S,
    user: &AuthenticatedUser,
    product_id: i32,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: ProductReader + CategoryReader + ProductTypeReader + ProductWriter + ?Sized,
    S: FileStorage + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let payload = form
        .into_update_payload()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let existing = repo
        .get_product_by_id(product_id, ProductRelations::all())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound(Entity::Product))?;

    ensure_references(repo, payload.category_id, payload.product_type_id)?;

    let new_image_url = payload
        .image
        .as_ref()
        .map(|image| store_image(storage, image))
        .transpose()?;

    let image_url = new_image_url
        .clone()
        .or_else(|| existing.image_url.clone());

    let updates = UpdateProduct::new(payload.name, payload.price_cents, payload.category_id)
        .product_type(payload.product_type_id)
        .image_url(image_url);

    let updated = match repo.update_product(product_id, &updates) {
        Ok(updated) => updated,
        Err(err) => {
            log::error!("Failed to save product {product_id}: {err}");
            if let Some(url) = new_image_url.as_deref() {
                discard_image(storage, url);
            }
            return Err(write_error(
                repo,
                err,
                updates.category_id,
                updates.product_type_id,
            ));
        }
    };

    if new_image_url.is_some()
        && let Some(old_url) = existing.image_url.as_deref()
    {
        // The record already points at the new file, a leftover is only garbage.
        if let Err(err) = storage.remove(old_url, PRODUCT_IMAGE_NAMESPACE) {
            log::warn!("Failed to remove previous image {old_url} of product {product_id}: {err}");
        }
    }

    log::info!("Updated product {product_id}");
    Ok(updated)
}

/// Deletes a product and then its image.
pub fn delete_product<R, S>(
    repo: &R,
    storage: &S,
    user: &AuthenticatedUser,
    product_id: i32,
) -> ServiceResult<()>
where
    R: ProductReader + ProductWriter + ?Sized,
    S: FileStorage + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let product = repo
        .get_product_by_id(product_id, ProductRelations::none())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound(Entity::Product))?;

    repo.delete_product(product.id)
        .map_err(ServiceError::from)?;

    if let Some(url) = product.image_url.as_deref() {
        storage.remove(url, PRODUCT_IMAGE_NAMESPACE)?;
    }

    log::info!("Deleted product {product_id}");
    Ok(())
}

fn load_reference_lists<R>(repo: &R) -> ServiceResult<(Vec<Category>, Vec<ProductType>)>
where
    R: CategoryReader + ProductTypeReader + ?Sized,
{
    let categories = repo.list_categories().map_err(ServiceError::from)?;
    let product_types = repo.list_product_types().map_err(ServiceError::from)?;
    Ok((categories, product_types))
}

fn ensure_references<R>(
    repo: &R,
    category_id: i32,
    product_type_id: Option<i32>,
) -> ServiceResult<()>
where
    R: CategoryReader + ProductTypeReader + ?Sized,
{
    if repo
        .get_category_by_id(category_id)
        .map_err(ServiceError::from)?
        .is_none()
    {
        return Err(ServiceError::NotFound(Entity::Category));
    }

    if let Some(product_type_id) = product_type_id
        && repo
            .get_product_type_by_id(product_type_id)
            .map_err(ServiceError::from)?
            .is_none()
    {
        return Err(ServiceError::NotFound(Entity::ProductType));
    }

    Ok(())
}

/// Maps a failed write to the record that is actually missing.
///
/// The writer reports a vanished category or product type the same way as a
/// vanished product, so the references are checked again before blaming the
/// product.
fn write_error<R>(
    repo: &R,
    err: RepositoryError,
    category_id: i32,
    product_type_id: Option<i32>,
) -> ServiceError
where
    R: CategoryReader + ProductTypeReader + ?Sized,
{
    match err {
        RepositoryError::NotFound => match ensure_references(repo, category_id, product_type_id) {
            Err(missing) => missing,
            Ok(()) => ServiceError::NotFound(Entity::Product),
        },
        other => ServiceError::from(other),
    }
}

fn store_image<S>(storage: &S, image: &ImageUpload) -> ServiceResult<String>
where
    S: FileStorage + ?Sized,
{
    storage
        .store(image, PRODUCT_IMAGE_NAMESPACE)
        .map_err(ServiceError::from)
}

fn discard_image<S>(storage: &S, url: &str)
where
    S: FileStorage + ?Sized,
{
    if let Err(err) = storage.remove(url, PRODUCT_IMAGE_NAMESPACE) {
        log::error!("Failed to remove orphaned image {url}: {err}");
    }
}

/// View model exposed to the products index template.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub price_cents: i64,
    pub price_formatted: String,
    pub image_url: Option<String>,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub product_type_id: Option<i32>,
    pub product_type_name: Option<String>,
    pub updated_at: chrono::NaiveDateTime,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let Product {
            id,
            name,
            price_cents,
            image_url,
            category_id,
            product_type_id,
            category,
            product_type,
            updated_at,
            ..
        } = product;

        Self {
            id,
            name,
            price_cents,
            price_formatted: format_price(price_cents),
            image_url,
            category_id,
            category_name: category.map(|category| category.name),
            product_type_id,
            product_type_name: product_type.map(|product_type| product_type.name),
            updated_at,
        }
    }
}
