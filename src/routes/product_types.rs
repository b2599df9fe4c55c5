use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::forms::product_types::{AddProductTypeForm, EditProductTypeForm};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::product_types;

#[get("/product-types")]
pub async fn list_product_types(
    params: web::Query<product_types::ProductTypesQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match product_types::load_product_types(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(err, "Failed to list product types"),
    }
}

#[post("/product-types")]
pub async fn create_product_type(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddProductTypeForm>,
) -> impl Responder {
    match product_types::create_product_type(repo.get_ref(), &user, form.into_inner()) {
        Ok(product_type) => HttpResponse::Created().json(product_type),
        Err(err) => error_response(err, "Failed to create product type"),
    }
}

#[get("/product-types/{id}")]
pub async fn show_product_type(
    type_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match product_types::get_product_type(repo.get_ref(), &user, type_id.into_inner()) {
        Ok(product_type) => HttpResponse::Ok().json(product_type),
        Err(err) => error_response(err, "Failed to load product type"),
    }
}

#[put("/product-types/{id}")]
pub async fn update_product_type(
    type_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditProductTypeForm>,
) -> impl Responder {
    match product_types::update_product_type(
        repo.get_ref(),
        &user,
        type_id.into_inner(),
        form.into_inner(),
    ) {
        Ok(product_type) => HttpResponse::Ok().json(product_type),
        Err(err) => error_response(err, "Failed to update product type"),
    }
}

#[delete("/product-types/{id}")]
pub async fn delete_product_type(
    type_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match product_types::remove_product_type(repo.get_ref(), &user, type_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err, "Failed to delete product type"),
    }
}
