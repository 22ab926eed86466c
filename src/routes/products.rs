use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{base_context, redirect, render_template};
use tera::Tera;

use crate::forms::products::{ProductFormValues, ProductMultipartForm};
use crate::repository::DieselRepository;
use crate::services::products::{self, ProductFormData};
use crate::services::{Entity, ServiceError};
use crate::storage::LocalFileStorage;

#[get("/products")]
pub async fn show_products(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match products::load_products_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "products",
                &server_config.auth_service_url,
            );
            context.insert("products", &data.products);
            render_template(&tera, "products/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to list products: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/products/add")]
pub async fn show_add_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match products::load_add_product_form(repo.get_ref(), &user) {
        Ok(data) => render_product_form(
            &tera,
            &flash_messages,
            &user,
            &server_config,
            "products/add.html",
            data,
            None,
        ),
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to load product form: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/products/add")]
pub async fn add_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalFileStorage>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<ProductMultipartForm>,
) -> impl Responder {
    let form = match form.into_form() {
        Ok(form) => form,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect("/products/add");
        }
    };
    let submitted = form.values();

    match products::create_product(repo.get_ref(), storage.get_ref(), &user, form) {
        Ok(product) => {
            FlashMessage::success(format!("Товар «{}» добавлен.", product.name)).send();
            redirect("/products")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => rerender_add_form(
            &tera,
            &flash_messages,
            &user,
            &server_config,
            &repo,
            submitted,
            &message,
        ),
        Err(ServiceError::NotFound(entity)) => rerender_add_form(
            &tera,
            &flash_messages,
            &user,
            &server_config,
            &repo,
            submitted,
            missing_reference_message(entity),
        ),
        Err(err) => {
            log::error!("Failed to create product: {err}");
            FlashMessage::error("Не удалось добавить товар.").send();
            redirect("/products/add")
        }
    }
}

#[get("/products/{product_id}/edit")]
pub async fn show_edit_product(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let product_id = path.into_inner();

    match products::load_edit_product_form(repo.get_ref(), &user, product_id) {
        Ok(data) => render_product_form(
            &tera,
            &flash_messages,
            &user,
            &server_config,
            "products/edit.html",
            data,
            None,
        ),
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound(_)) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to load product {product_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/products/{product_id}/edit")]
#[allow(clippy::too_many_arguments)]
pub async fn edit_product(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalFileStorage>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<ProductMultipartForm>,
) -> impl Responder {
    let product_id = path.into_inner();
    let edit_url = format!("/products/{product_id}/edit");

    let form = match form.into_form() {
        Ok(form) => form,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect(&edit_url);
        }
    };
    let submitted = form.values();

    match products::update_product(repo.get_ref(), storage.get_ref(), &user, product_id, form) {
        Ok(product) => {
            FlashMessage::success(format!("Товар «{}» изменен.", product.name)).send();
            redirect("/products")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound(Entity::Product)) => HttpResponse::NotFound().finish(),
        Err(ServiceError::Form(message)) => rerender_edit_form(
            &tera,
            &flash_messages,
            &user,
            &server_config,
            &repo,
            product_id,
            submitted,
            &message,
        ),
        Err(ServiceError::NotFound(entity)) => rerender_edit_form(
            &tera,
            &flash_messages,
            &user,
            &server_config,
            &repo,
            product_id,
            submitted,
            missing_reference_message(entity),
        ),
        Err(err) => {
            log::error!("Failed to update product {product_id}: {err}");
            FlashMessage::error("Не удалось изменить товар.").send();
            redirect(&edit_url)
        }
    }
}

#[post("/products/{product_id}/delete")]
pub async fn delete_product(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalFileStorage>,
) -> impl Responder {
    let product_id = path.into_inner();

    match products::delete_product(repo.get_ref(), storage.get_ref(), &user, product_id) {
        Ok(()) => {
            FlashMessage::success("Товар удален.").send();
            redirect("/products")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound(_)) => {
            FlashMessage::error("Товар не найден или уже удален.").send();
            redirect("/products")
        }
        Err(ServiceError::Storage(err)) => {
            log::error!("Product {product_id} deleted but its image was not: {err}");
            FlashMessage::warning("Товар удален, но изображение удалить не удалось.").send();
            redirect("/products")
        }
        Err(err) => {
            log::error!("Failed to delete product {product_id}: {err}");
            FlashMessage::error("Не удалось удалить товар.").send();
            redirect("/products")
        }
    }
}

fn missing_reference_message(entity: Entity) -> &'static str {
    match entity {
        Entity::Category => "Выбранная категория не найдена.",
        Entity::ProductType => "Выбранный тип товара не найден.",
        Entity::Product => "Товар не найден.",
    }
}

fn rerender_add_form(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    server_config: &CommonServerConfig,
    repo: &DieselRepository,
    submitted: ProductFormValues,
    error: &str,
) -> HttpResponse {
    match products::load_add_product_form(repo, user) {
        Ok(data) => render_product_form(
            tera,
            flash_messages,
            user,
            server_config,
            "products/add.html",
            data.with_values(submitted),
            Some(error),
        ),
        Err(err) => {
            log::error!("Failed to reload product form: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn rerender_edit_form(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    server_config: &CommonServerConfig,
    repo: &DieselRepository,
    product_id: i32,
    submitted: ProductFormValues,
    error: &str,
) -> HttpResponse {
    match products::load_edit_product_form(repo, user, product_id) {
        Ok(data) => render_product_form(
            tera,
            flash_messages,
            user,
            server_config,
            "products/edit.html",
            data.with_values(submitted),
            Some(error),
        ),
        Err(ServiceError::NotFound(_)) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to reload product {product_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn render_product_form(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    server_config: &CommonServerConfig,
    template: &str,
    data: ProductFormData,
    error: Option<&str>,
) -> HttpResponse {
    let mut context = base_context(
        flash_messages,
        user,
        "products",
        &server_config.auth_service_url,
    );
    context.insert("categories", &data.categories);
    context.insert("product_types", &data.product_types);
    context.insert("values", &data.values);
    context.insert("product_id", &data.product_id);
    context.insert("image_url", &data.image_url);
    context.insert("form_error", &error);
    render_template(tera, template, &context)
}
