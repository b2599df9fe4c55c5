//! Assembles concrete products from template variation pools.
//!
//! Sampling is uniform per pool with one exception: inside an
//! image-with-text section the description index is derived from the
//! randomly chosen title index (`title_index % descriptions.len()`), so
//! parallel pools always yield matching title/description pairs.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{NaiveDateTime, Utc};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use pushkind_common::routes::check_role;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::generated_product::{
    GeneratedProduct, GeneratedProductListQuery, ImageTextSelection, NewGeneratedProduct,
    QaSelection, SelectedMeta,
};
use crate::domain::template::{ProductTemplate, ProductVariant, TemplateListQuery};
use crate::forms::generation::GenerateProductForm;
use crate::repository::{GeneratedProductReader, GeneratedProductWriter, TemplateReader};
use crate::services::{ServiceError, ServiceResult};

/// Reasons a template cannot produce a product.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("No templates found for the selected product type")]
    NoTemplatesForType,
    /// A pool that has to be sampled holds no entries.
    #[error("no variations available for {0}")]
    EmptyPool(String),
}

impl From<GenerationError> for ServiceError {
    fn from(value: GenerationError) -> Self {
        match value {
            GenerationError::NoTemplatesForType => ServiceError::NotFound,
            GenerationError::EmptyPool(_) => ServiceError::Validation(vec![value.to_string()]),
        }
    }
}

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Identity and time of a single generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStamp {
    /// Identifier given to the generated product.
    pub id: String,
    /// Millisecond stamp appended to handles and SKUs; strictly increasing per process.
    pub stamp: i64,
    pub generated_at: NaiveDateTime,
}

impl GenerationStamp {
    /// Stamp for a generation happening now.
    pub fn next() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            stamp: next_stamp(now.timestamp_millis()),
            generated_at: now.naive_utc(),
        }
    }
}

fn next_stamp(now_millis: i64) -> i64 {
    let mut last = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let candidate = now_millis.max(last + 1);
        match LAST_STAMP.compare_exchange_weak(last, candidate, Ordering::SeqCst, Ordering::Relaxed)
        {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

/// Description index paired with a title index.
///
/// `description_len` must be non-zero.
pub fn correlated_index(title_index: usize, description_len: usize) -> usize {
    title_index % description_len
}

/// Splits a comma-joined tag string into trimmed tags. A blank string has no tags.
pub fn split_tags(tags: &str) -> Vec<String> {
    if tags.trim().is_empty() {
        return Vec::new();
    }
    tags.split(',').map(|tag| tag.trim().to_string()).collect()
}

fn pick_index<R>(rng: &mut R, len: usize, field: impl FnOnce() -> String) -> Result<usize, GenerationError>
where
    R: Rng + ?Sized,
{
    if len == 0 {
        return Err(GenerationError::EmptyPool(field()));
    }
    Ok(rng.gen_range(0..len))
}

fn pick<'a, R>(
    rng: &mut R,
    pool: &'a [String],
    field: impl FnOnce() -> String,
) -> Result<&'a str, GenerationError>
where
    R: Rng + ?Sized,
{
    let index = pick_index(rng, pool.len(), field)?;
    Ok(pool[index].as_str())
}

/// Produces one product from `template`.
pub fn generate_product<R>(
    template: &ProductTemplate,
    rng: &mut R,
    stamp: &GenerationStamp,
) -> Result<NewGeneratedProduct, GenerationError>
where
    R: Rng + ?Sized,
{
    let meta = &template.meta_variations;

    let main_description = pick(rng, &meta.product_main_description, || {
        "product_main_description".to_string()
    })?
    .to_string();

    let selected_title = pick(rng, &meta.brandable_title_variations, || {
        "brandable_title_variations".to_string()
    })?
    .to_string();

    let mut image_text_sections = Vec::with_capacity(meta.image_with_text_sections.len());
    for (position, section) in meta.image_with_text_sections.iter().enumerate() {
        let title_index = pick_index(rng, section.title_variations.len(), || {
            format!("image_with_text_sections[{position}].title_variations")
        })?;
        if section.description_variations.is_empty() {
            return Err(GenerationError::EmptyPool(format!(
                "image_with_text_sections[{position}].description_variations"
            )));
        }
        let description_index =
            correlated_index(title_index, section.description_variations.len());

        image_text_sections.push(ImageTextSelection {
            title: section.title_variations[title_index].clone(),
            description: section.description_variations[description_index].clone(),
        });
    }

    let mut qa_sections = Vec::with_capacity(meta.collapsible_qa_sections.len());
    for (position, section) in meta.collapsible_qa_sections.iter().enumerate() {
        let answer = pick(rng, &section.answer_variations, || {
            format!("collapsible_qa_sections[{position}].answer_variations")
        })?;
        qa_sections.push(QaSelection {
            question: section.question.clone(),
            answer: answer.to_string(),
        });
    }

    let variants = template
        .variants
        .iter()
        .map(|variant| ProductVariant {
            sku: format!("{}-{}", variant.sku, stamp.stamp),
            ..variant.clone()
        })
        .collect();

    Ok(NewGeneratedProduct {
        id: stamp.id.clone(),
        hub_id: template.hub_id,
        template_id: Some(template.id),
        title: selected_title.clone(),
        handle: format!("{}-{}", template.handle, stamp.stamp),
        images: template.images.clone(),
        variants,
        body_html: template.body_html.clone(),
        vendor: template.vendor.clone(),
        product_type: template.product_type.clone(),
        product_type_id: template.product_type_id.clone(),
        tags: split_tags(&template.tags),
        selected_meta: SelectedMeta {
            main_description,
            image_text_sections,
            qa_sections,
            selected_title,
        },
        created_at: stamp.generated_at,
        updated_at: stamp.generated_at,
    })
}

/// Picks one of the templates whose `product_type_id` equals `product_type_id`.
pub fn pick_template<'a, R>(
    product_type_id: &str,
    templates: &'a [ProductTemplate],
    rng: &mut R,
) -> Result<&'a ProductTemplate, GenerationError>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<&ProductTemplate> = templates
        .iter()
        .filter(|template| template.product_type_id == product_type_id)
        .collect();

    candidates
        .choose(rng)
        .copied()
        .ok_or(GenerationError::NoTemplatesForType)
}

/// Produces one product from a random template of the given product type.
pub fn generate_for_type<R>(
    product_type_id: &str,
    templates: &[ProductTemplate],
    rng: &mut R,
    stamp: &GenerationStamp,
) -> Result<NewGeneratedProduct, GenerationError>
where
    R: Rng + ?Sized,
{
    let template = pick_template(product_type_id, templates, rng)?;
    generate_product(template, rng, stamp)
}

/// Query parameters accepted by the generated products listing.
#[derive(Debug, Default, Deserialize)]
pub struct GeneratedProductsQuery {
    pub product_type_id: Option<String>,
    pub template_id: Option<i32>,
    /// Page requested by the UI (1-based).
    pub page: Option<usize>,
}

/// Generates and stores a product for the product type named in `form`.
///
/// Not idempotent: every call stores a new product, so failures are never retried here.
pub fn generate_for_product_type<R, G>(
    repo: &R,
    user: &AuthenticatedUser,
    form: GenerateProductForm,
    rng: &mut G,
) -> ServiceResult<GeneratedProduct>
where
    R: TemplateReader + GeneratedProductWriter + ?Sized,
    G: Rng + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let product_type_id = form
        .into_product_type_id()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let (_, templates) = repo
        .list_templates(TemplateListQuery::new(user.hub_id).product_type_id(&product_type_id))
        .map_err(ServiceError::from)?;

    let stamp = GenerationStamp::next();
    let new_product = generate_for_type(&product_type_id, &templates, rng, &stamp)?;

    let created = repo
        .create_generated_product(&new_product)
        .map_err(ServiceError::from)?;

    log::info!(
        "Generated product {} from template {:?} for product type {}",
        created.id,
        created.template_id,
        product_type_id
    );

    Ok(created)
}

/// Generates and stores a product from one specific template.
pub fn generate_from_template<R, G>(
    repo: &R,
    user: &AuthenticatedUser,
    template_id: i32,
    rng: &mut G,
) -> ServiceResult<GeneratedProduct>
where
    R: TemplateReader + GeneratedProductWriter + ?Sized,
    G: Rng + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let template = repo
        .get_template_by_id(template_id, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    let new_product = generate_product(&template, rng, &GenerationStamp::next())?;

    let created = repo
        .create_generated_product(&new_product)
        .map_err(ServiceError::from)?;

    log::info!(
        "Generated product {} from template {}",
        created.id,
        template.id
    );

    Ok(created)
}

/// Lists generated products newest first.
pub fn load_generated_products<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: GeneratedProductsQuery,
) -> ServiceResult<Paginated<GeneratedProduct>>
where
    R: GeneratedProductReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let page = query.page.unwrap_or(1);
    let mut list_query =
        GeneratedProductListQuery::new(user.hub_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(product_type_id) = query
        .product_type_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        list_query = list_query.product_type_id(product_type_id);
    }

    if let Some(template_id) = query.template_id {
        list_query = list_query.template_id(template_id);
    }

    let (total, products) = repo
        .list_generated_products(list_query)
        .map_err(ServiceError::from)?;

    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
    Ok(Paginated::new(products, page, total_pages))
}

pub fn get_generated_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id: &str,
) -> ServiceResult<GeneratedProduct>
where
    R: GeneratedProductReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.get_generated_product_by_id(id, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

pub fn remove_generated_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id: &str,
) -> ServiceResult<()>
where
    R: GeneratedProductWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_generated_product(id, user.hub_id)
        .map_err(ServiceError::from)
}
