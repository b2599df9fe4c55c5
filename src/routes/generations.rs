use actix_web::{HttpResponse, Responder, delete, get, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde_json::json;

use crate::forms::generation::GenerateProductForm;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::ServiceError;
use crate::services::generation::{self, GenerationError};

#[get("/generations")]
/// Generated products, newest first.
pub async fn list_generations(
    params: web::Query<generation::GeneratedProductsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match generation::load_generated_products(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(err, "Failed to list generated products"),
    }
}

#[post("/generations")]
/// Generates a product from a random template of the requested product type.
pub async fn generate_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<GenerateProductForm>,
) -> impl Responder {
    let result = generation::generate_for_product_type(
        repo.get_ref(),
        &user,
        form.into_inner(),
        &mut rand::thread_rng(),
    );

    match result {
        Ok(product) => HttpResponse::Created().json(product),
        Err(ServiceError::NotFound) => HttpResponse::NotFound()
            .json(json!({ "error": GenerationError::NoTemplatesForType.to_string() })),
        Err(err) => error_response(err, "Failed to generate product"),
    }
}

#[get("/generations/{id}")]
pub async fn show_generation(
    product_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match generation::get_generated_product(repo.get_ref(), &user, &product_id) {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(err) => error_response(err, "Failed to load generated product"),
    }
}

#[delete("/generations/{id}")]
pub async fn delete_generation(
    product_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match generation::remove_generated_product(repo.get_ref(), &user, &product_id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err, "Failed to delete generated product"),
    }
}
