use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use pushkind_common::routes::check_role;
use serde::{Deserialize, Serialize};

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::generated_product::GeneratedProductListQuery;
use crate::domain::template::{
    ProductTemplate, TemplateDraft, TemplateListQuery, TemplateSort, UpdateProductTemplate,
};
use crate::forms::templates::{BulkDeleteForm, EditTemplateForm};
use crate::repository::{
    GeneratedProductReader, GeneratedProductWriter, RepositoryError, TemplateReader,
    TemplateWriter,
};
use crate::services::validation::{ValidationOptions, validate_template};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the templates listing.
#[derive(Debug, Default, Deserialize)]
pub struct TemplatesQuery {
    /// Optional search string entered by the user.
    pub search: Option<String>,
    pub product_type_id: Option<String>,
    pub sort: Option<TemplateSort>,
    /// Page requested by the UI (1-based).
    pub page: Option<usize>,
}

/// Lists the hub's templates.
pub fn load_templates<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: TemplatesQuery,
) -> ServiceResult<Paginated<ProductTemplate>>
where
    R: TemplateReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let TemplatesQuery {
        search,
        product_type_id,
        sort,
        page,
    } = query;

    let page = page.unwrap_or(1);
    let mut list_query = TemplateListQuery::new(user.hub_id)
        .sort(sort.unwrap_or_default())
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(term) = non_blank(search.as_deref()) {
        list_query = list_query.search(term);
    }

    if let Some(product_type_id) = non_blank(product_type_id.as_deref()) {
        list_query = list_query.product_type_id(product_type_id);
    }

    let (total, templates) = repo
        .list_templates(list_query)
        .map_err(ServiceError::from)?;

    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
    Ok(Paginated::new(templates, page, total_pages))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub fn get_template_by_handle<R>(
    repo: &R,
    user: &AuthenticatedUser,
    handle: &str,
) -> ServiceResult<ProductTemplate>
where
    R: TemplateReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.get_template_by_handle(handle.trim(), user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

pub fn get_template<R>(
    repo: &R,
    user: &AuthenticatedUser,
    template_id: i32,
) -> ServiceResult<ProductTemplate>
where
    R: TemplateReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.get_template_by_id(template_id, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

/// Stores a new template after full validation.
pub fn create_template<R>(
    repo: &R,
    user: &AuthenticatedUser,
    draft: TemplateDraft,
) -> ServiceResult<ProductTemplate>
where
    R: TemplateWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let mut draft = draft;
    draft.handle = draft.handle.trim().to_string();
    draft.product_type_id = draft.product_type_id.trim().to_string();

    let report = validate_template(&draft, ValidationOptions::default());
    if !report.is_valid {
        return Err(ServiceError::Validation(report.errors));
    }

    let created = repo
        .create_template(&draft.into_new_template(user.hub_id))
        .map_err(ServiceError::from)?;

    log::info!(
        "Created template {} ({}) for hub {}",
        created.id,
        created.handle,
        user.hub_id
    );

    Ok(created)
}

/// Applies a partial update to the template carrying `handle`.
///
/// The merged result must still pass validation. A stale
/// `expected_updated_at` surfaces as [`ServiceError::Conflict`].
pub fn update_template<R>(
    repo: &R,
    user: &AuthenticatedUser,
    handle: &str,
    form: EditTemplateForm,
) -> ServiceResult<ProductTemplate>
where
    R: TemplateReader + TemplateWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let updates = form
        .into_update_template()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let handle = handle.trim();
    let existing = repo
        .get_template_by_handle(handle, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    let report = validate_template(&merged_draft(existing, &updates), ValidationOptions::default());
    if !report.is_valid {
        return Err(ServiceError::Validation(report.errors));
    }

    repo.update_template_by_handle(handle, user.hub_id, &updates)
        .map_err(ServiceError::from)
}

fn merged_draft(existing: ProductTemplate, updates: &UpdateProductTemplate) -> TemplateDraft {
    let mut draft = TemplateDraft::from(existing);

    if let Some(title) = &updates.title {
        draft.title = title.clone();
    }
    if let Some(images) = &updates.images {
        draft.images = images.clone();
    }
    if let Some(variants) = &updates.variants {
        draft.variants = variants.clone();
    }
    if let Some(body_html) = &updates.body_html {
        draft.body_html = body_html.clone();
    }
    if let Some(vendor) = &updates.vendor {
        draft.vendor = vendor.clone();
    }
    if let Some(product_type) = &updates.product_type {
        draft.product_type = product_type.clone();
    }
    if let Some(product_type_id) = &updates.product_type_id {
        draft.product_type_id = product_type_id.clone();
    }
    if let Some(tags) = &updates.tags {
        draft.tags = tags.clone();
    }
    if let Some(meta_variations) = &updates.meta_variations {
        draft.meta_variations = Some(meta_variations.clone());
    }
    if let Some(template_suffix) = &updates.template_suffix {
        draft.template_suffix = template_suffix.clone();
    }

    draft
}

/// Outcome of a cascade delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletedTemplates {
    pub template_ids: Vec<i32>,
    /// Generated products removed along with the templates.
    pub generated_products: usize,
}

/// Deletes a template together with every product generated from it.
///
/// Fail-closed: the template row is only removed once all of its generated
/// products are gone.
pub fn remove_template<R>(
    repo: &R,
    user: &AuthenticatedUser,
    template_id: i32,
) -> ServiceResult<DeletedTemplates>
where
    R: TemplateReader + TemplateWriter + GeneratedProductReader + GeneratedProductWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let generated_products = cascade_delete(repo, user.hub_id, template_id)?;

    Ok(DeletedTemplates {
        template_ids: vec![template_id],
        generated_products,
    })
}

/// Cascade-deletes every selected template.
///
/// Stops at the first template that cannot be removed; templates handled
/// before it stay deleted.
pub fn remove_templates<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: BulkDeleteForm,
) -> ServiceResult<DeletedTemplates>
where
    R: TemplateReader + TemplateWriter + GeneratedProductReader + GeneratedProductWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let ids = form
        .into_ids()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let mut summary = DeletedTemplates::default();
    for template_id in ids {
        summary.generated_products += cascade_delete(repo, user.hub_id, template_id)?;
        summary.template_ids.push(template_id);
    }

    Ok(summary)
}

/// Removes the generated products of a template, then the template itself.
///
/// Generated products are independent of each other, so the order in which
/// they are deleted does not matter; any failure aborts before the template
/// row is touched.
fn cascade_delete<R>(repo: &R, hub_id: i32, template_id: i32) -> ServiceResult<usize>
where
    R: TemplateReader + TemplateWriter + GeneratedProductReader + GeneratedProductWriter + ?Sized,
{
    repo.get_template_by_id(template_id, hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    let (_, generated) = repo
        .list_generated_products(GeneratedProductListQuery::new(hub_id).template_id(template_id))
        .map_err(ServiceError::from)?;

    for product in &generated {
        match repo.delete_generated_product(&product.id, hub_id) {
            Ok(()) | Err(RepositoryError::NotFound) => {}
            Err(err) => {
                log::error!(
                    "Failed to delete generated product {} of template {template_id}: {err}",
                    product.id
                );
                return Err(ServiceError::from(err));
            }
        }
    }

    repo.delete_template(template_id, hub_id)
        .map_err(ServiceError::from)?;

    log::info!(
        "Deleted template {template_id} of hub {hub_id} with {} generated products",
        generated.len()
    );

    Ok(generated.len())
}
