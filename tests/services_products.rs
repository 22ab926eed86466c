use std::io::Cursor;
use std::path::{Path, PathBuf};

use pushkind_catalog::domain::image::ImageUpload;
use pushkind_catalog::domain::product::ProductRelations;
use pushkind_catalog::forms::products::{ProductForm, ProductFormValues};
use pushkind_catalog::repository::{DieselRepository, ProductReader};
use pushkind_catalog::services::{Entity, products};
use pushkind_catalog::storage::LocalFileStorage;
use pushkind_catalog::{SERVICE_ACCESS_ROLE, services::ServiceError};
use pushkind_common::domain::auth::AuthenticatedUser;

mod common;

fn admin() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "user".into(),
        email: "user@example.com".into(),
        hub_id: 1,
        name: "User".into(),
        roles: vec![SERVICE_ACCESS_ROLE.to_string()],
        exp: 0,
    }
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbImage::new(2, 2)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png");
    bytes
}

fn form(name: &str, price: &str, category_id: i32, image: Option<&str>) -> ProductForm {
    ProductForm {
        name: name.to_string(),
        price: price.to_string(),
        category_id: category_id.to_string(),
        product_type_id: None,
        image: image.map(|file_name| ImageUpload::new(file_name, png_bytes())),
    }
}

fn stored_path(root: &Path, url: &str) -> PathBuf {
    root.join(url.trim_start_matches('/'))
}

fn stored_files(root: &Path) -> usize {
    std::fs::read_dir(root.join("img/featured"))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[test]
fn create_product_persists_record_and_image() {
    let test_db = common::TestDb::new("service_create_product_persists_record_and_image.db");
    let category_id = test_db.seed_category("Tools");
    let product_type_id = test_db.seed_product_type("Featured");
    let repo = DieselRepository::new(test_db.pool());
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = LocalFileStorage::new(dir.path());

    let mut input = form("Widget", "9.99", category_id, Some("widget.png"));
    input.product_type_id = Some(product_type_id.to_string());

    let created = products::create_product(&repo, &storage, &admin(), input)
        .expect("product created");

    let loaded = repo
        .get_product_by_id(created.id, ProductRelations::all())
        .unwrap()
        .expect("product stored");
    assert_eq!(loaded.name, "Widget");
    assert_eq!(loaded.price_cents, 999);
    assert_eq!(loaded.product_type_id, Some(product_type_id));

    let url = loaded.image_url.expect("image url");
    assert!(url.starts_with("/img/featured/"));
    assert!(url.ends_with(".png"));
    assert!(stored_path(dir.path(), &url).exists());

    let page = products::load_products_page(&repo, &admin()).expect("products page");
    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].price_formatted, "9.99");
    assert_eq!(page.products[0].category_name.as_deref(), Some("Tools"));
}

#[test]
fn created_product_prefills_edit_form() {
    let test_db = common::TestDb::new("service_created_product_prefills_edit_form.db");
    test_db.seed_category("Toys");
    let category_id = test_db.seed_category("Tools");
    let product_type_id = test_db.seed_product_type("Featured");
    let repo = DieselRepository::new(test_db.pool());
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = LocalFileStorage::new(dir.path());

    let mut input = form("  Deluxe   Widget ", "12,5", category_id, Some("widget.png"));
    input.product_type_id = Some(product_type_id.to_string());
    let created = products::create_product(&repo, &storage, &admin(), input)
        .expect("product created");

    let data = products::load_edit_product_form(&repo, &admin(), created.id)
        .expect("edit form loaded");

    assert_eq!(
        data.values,
        ProductFormValues {
            name: "Deluxe Widget".to_string(),
            price: "12.50".to_string(),
            category_id: Some(category_id),
            product_type_id: Some(product_type_id),
        }
    );
    assert_eq!(data.product_id, Some(created.id));
    assert_eq!(data.image_url, created.image_url);
    assert_eq!(data.categories.len(), 2);
    assert_eq!(data.product_types.len(), 1);
}

#[test]
fn create_product_rejects_renamed_non_image() {
    let test_db = common::TestDb::new("service_create_product_rejects_non_image.db");
    let category_id = test_db.seed_category("Tools");
    let repo = DieselRepository::new(test_db.pool());
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = LocalFileStorage::new(dir.path());

    let mut input = form("Widget", "1", category_id, None);
    input.image = Some(ImageUpload::new("widget.png", b"#!/bin/sh\n".to_vec()));

    let result = products::create_product(&repo, &storage, &admin(), input);

    assert!(matches!(result, Err(ServiceError::Form(_))));
    assert_eq!(stored_files(dir.path()), 0);
}

#[test]
fn create_product_with_unknown_category_leaves_nothing_behind() {
    let test_db = common::TestDb::new("service_create_product_unknown_category.db");
    let repo = DieselRepository::new(test_db.pool());
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = LocalFileStorage::new(dir.path());

    let result = products::create_product(
        &repo,
        &storage,
        &admin(),
        form("Widget", "1", 42, Some("widget.png")),
    );

    assert!(matches!(
        result,
        Err(ServiceError::NotFound(Entity::Category))
    ));
    assert!(
        repo.list_products(ProductRelations::none())
            .unwrap()
            .is_empty()
    );
    assert_eq!(stored_files(dir.path()), 0);
}

#[test]
fn create_product_without_image_is_rejected() {
    let test_db = common::TestDb::new("service_create_product_without_image.db");
    let category_id = test_db.seed_category("Tools");
    let repo = DieselRepository::new(test_db.pool());
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = LocalFileStorage::new(dir.path());

    let result =
        products::create_product(&repo, &storage, &admin(), form("Widget", "1", category_id, None));

    assert!(matches!(result, Err(ServiceError::Form(_))));
    assert!(
        repo.list_products(ProductRelations::none())
            .unwrap()
            .is_empty()
    );
}

#[test]
fn update_product_replaces_image_and_type_link() {
    let test_db = common::TestDb::new("service_update_product_replaces_image.db");
    let category_id = test_db.seed_category("Tools");
    let featured = test_db.seed_product_type("Featured");
    let sale = test_db.seed_product_type("Sale");
    let repo = DieselRepository::new(test_db.pool());
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = LocalFileStorage::new(dir.path());

    let mut input = form("Widget", "5", category_id, Some("a.png"));
    input.product_type_id = Some(featured.to_string());
    let created = products::create_product(&repo, &storage, &admin(), input).unwrap();
    let old_url = created.image_url.clone().unwrap();

    let mut input = form("Gadget", "7,50", category_id, Some("b.jpg"));
    input.product_type_id = Some(sale.to_string());
    let updated = products::update_product(&repo, &storage, &admin(), created.id, input)
        .expect("product updated");

    assert_eq!(updated.name, "Gadget");
    assert_eq!(updated.price_cents, 750);
    assert_eq!(updated.product_type_id, Some(sale));
    assert_eq!(test_db.count_type_links(), 1);

    let new_url = updated.image_url.expect("image url");
    assert_ne!(new_url, old_url);
    assert!(stored_path(dir.path(), &new_url).exists());
    assert!(!stored_path(dir.path(), &old_url).exists());
    assert_eq!(stored_files(dir.path()), 1);
}

#[test]
fn update_product_without_image_keeps_current_one() {
    let test_db = common::TestDb::new("service_update_product_keeps_image.db");
    let category_id = test_db.seed_category("Tools");
    let repo = DieselRepository::new(test_db.pool());
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = LocalFileStorage::new(dir.path());

    let created = products::create_product(
        &repo,
        &storage,
        &admin(),
        form("Widget", "5", category_id, Some("a.png")),
    )
    .unwrap();

    let updated = products::update_product(
        &repo,
        &storage,
        &admin(),
        created.id,
        form("Widget v2", "6", category_id, None),
    )
    .expect("product updated");

    assert_eq!(updated.image_url, created.image_url);
    assert!(stored_path(dir.path(), updated.image_url.as_deref().unwrap()).exists());
}

#[test]
fn update_missing_product_returns_not_found() {
    let test_db = common::TestDb::new("service_update_missing_product.db");
    let category_id = test_db.seed_category("Tools");
    let repo = DieselRepository::new(test_db.pool());
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = LocalFileStorage::new(dir.path());

    let result = products::update_product(
        &repo,
        &storage,
        &admin(),
        999,
        form("Ghost", "1", category_id, Some("ghost.png")),
    );

    assert!(matches!(result, Err(ServiceError::NotFound(Entity::Product))));
    assert_eq!(stored_files(dir.path()), 0);
}

#[test]
fn delete_product_removes_only_that_product_and_its_image() {
    let test_db = common::TestDb::new("service_delete_product_removes_image.db");
    let category_id = test_db.seed_category("Tools");
    let repo = DieselRepository::new(test_db.pool());
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = LocalFileStorage::new(dir.path());

    let doomed = products::create_product(
        &repo,
        &storage,
        &admin(),
        form("Doomed", "1", category_id, Some("a.png")),
    )
    .unwrap();
    let kept = products::create_product(
        &repo,
        &storage,
        &admin(),
        form("Kept", "2", category_id, Some("b.png")),
    )
    .unwrap();

    products::delete_product(&repo, &storage, &admin(), doomed.id).expect("product deleted");

    let remaining = repo.list_products(ProductRelations::none()).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept.id);
    assert!(!stored_path(dir.path(), doomed.image_url.as_deref().unwrap()).exists());
    assert!(stored_path(dir.path(), kept.image_url.as_deref().unwrap()).exists());

    let again = products::delete_product(&repo, &storage, &admin(), doomed.id);
    assert!(matches!(again, Err(ServiceError::NotFound(Entity::Product))));
}

#[test]
fn services_require_admin_role() {
    let test_db = common::TestDb::new("service_products_require_admin_role.db");
    let repo = DieselRepository::new(test_db.pool());
    let mut user = admin();
    user.roles.clear();

    let result = products::load_products_page(&repo, &user);
    assert!(matches!(result, Err(ServiceError::Unauthorized)));
}
