use actix_multipart::form::MultipartForm;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::domain::template::TemplateDraft;
use crate::forms::templates::{BulkDeleteForm, EditTemplateForm, ImportTemplatesForm};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::{generation, import, templates};

#[get("/templates")]
/// Paginated template list with optional search, product type filter and sort.
pub async fn list_templates(
    params: web::Query<templates::TemplatesQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match templates::load_templates(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(err, "Failed to list templates"),
    }
}

#[post("/templates")]
pub async fn create_template(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    draft: web::Json<TemplateDraft>,
) -> impl Responder {
    match templates::create_template(repo.get_ref(), &user, draft.into_inner()) {
        Ok(template) => HttpResponse::Created().json(template),
        Err(err) => error_response(err, "Failed to create template"),
    }
}

#[get("/templates/export")]
/// Downloads every template of the hub as an importable JSON file.
pub async fn export_templates(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match import::export_templates(repo.get_ref(), &user) {
        Ok(body) => HttpResponse::Ok()
            .content_type("application/json")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(
                    import::EXPORT_FILE_NAME.to_string(),
                )],
            })
            .body(body),
        Err(err) => error_response(err, "Failed to export templates"),
    }
}

#[post("/templates/import")]
pub async fn import_templates(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<ImportTemplatesForm>,
) -> impl Responder {
    let upload = match form.into_upload() {
        Ok(upload) => upload,
        Err(err) => {
            log::warn!("Rejected template upload: {err}");
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": err.to_string() }));
        }
    };

    match import::import_templates(repo.get_ref(), &user, upload) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(err) => error_response(err, "Failed to import templates"),
    }
}

#[post("/templates/import/preview")]
pub async fn preview_import(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<ImportTemplatesForm>,
) -> impl Responder {
    let upload = match form.into_upload() {
        Ok(upload) => upload,
        Err(err) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": err.to_string() }));
        }
    };

    match import::preview_import(repo.get_ref(), &user, upload) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => error_response(err, "Failed to preview import"),
    }
}

#[post("/templates/bulk-delete")]
pub async fn bulk_delete_templates(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<BulkDeleteForm>,
) -> impl Responder {
    match templates::remove_templates(repo.get_ref(), &user, form.into_inner()) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(err) => error_response(err, "Failed to delete templates"),
    }
}

#[get("/templates/{id}")]
pub async fn show_template(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match templates::get_template(repo.get_ref(), &user, template_id.into_inner()) {
        Ok(template) => HttpResponse::Ok().json(template),
        Err(err) => error_response(err, "Failed to load template"),
    }
}

#[get("/templates/by-handle/{handle}")]
pub async fn show_template_by_handle(
    handle: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match templates::get_template_by_handle(repo.get_ref(), &user, &handle) {
        Ok(template) => HttpResponse::Ok().json(template),
        Err(err) => error_response(err, "Failed to load template"),
    }
}

#[put("/templates/by-handle/{handle}")]
pub async fn update_template(
    handle: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditTemplateForm>,
) -> impl Responder {
    match templates::update_template(repo.get_ref(), &user, &handle, form.into_inner()) {
        Ok(template) => HttpResponse::Ok().json(template),
        Err(err) => error_response(err, "Failed to update template"),
    }
}

#[delete("/templates/{id}")]
/// Deletes a template and every product generated from it.
pub async fn delete_template(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match templates::remove_template(repo.get_ref(), &user, template_id.into_inner()) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(err) => error_response(err, "Failed to delete template"),
    }
}

#[post("/templates/{id}/generate")]
pub async fn generate_from_template(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = generation::generate_from_template(
        repo.get_ref(),
        &user,
        template_id.into_inner(),
        &mut rand::thread_rng(),
    );

    match result {
        Ok(product) => HttpResponse::Created().json(product),
        Err(err) => error_response(err, "Failed to generate product"),
    }
}
