use std::io::{Read, Seek};

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::template::{MetaVariations, ProductVariant, UpdateProductTemplate};
use crate::forms::sanitize_inline_text;

/// Maximum allowed length for a template title.
const TITLE_MAX_LEN: usize = 255;
const TITLE_MAX_LEN_VALIDATOR: u64 = TITLE_MAX_LEN as u64;

/// Result type returned by the template form helpers.
pub type TemplateFormResult<T> = Result<T, TemplateFormError>;

/// Errors that can occur while processing template forms.
#[derive(Debug, Error)]
pub enum TemplateFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("template title cannot be empty")]
    EmptyTitle,
    #[error("no changes supplied")]
    NothingToUpdate,
    #[error("error reading uploaded file")]
    FileRead(#[from] std::io::Error),
    #[error("invalid default product type `{0}`")]
    InvalidProductType(String),
}

/// Partial template update submitted as JSON.
///
/// Omitted fields keep their stored values. The handle is the lookup key and
/// cannot be changed here.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditTemplateForm {
    #[validate(length(min = 1, max = TITLE_MAX_LEN_VALIDATOR))]
    pub title: Option<String>,
    pub images: Option<Vec<String>>,
    pub variants: Option<Vec<ProductVariant>>,
    pub body_html: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub product_type_id: Option<String>,
    pub tags: Option<String>,
    pub meta_variations: Option<MetaVariations>,
    pub template_suffix: Option<String>,
    /// Last `updated_at` seen by the client; enables the stale-write check.
    pub expected_updated_at: Option<NaiveDateTime>,
}

impl EditTemplateForm {
    /// Validates and sanitizes the payload into a domain `UpdateProductTemplate`.
    pub fn into_update_template(self) -> TemplateFormResult<UpdateProductTemplate> {
        self.validate()?;

        let mut updates = UpdateProductTemplate::new();

        if let Some(title) = self.title {
            let sanitized = sanitize_inline_text(&title);
            if sanitized.is_empty() {
                return Err(TemplateFormError::EmptyTitle);
            }
            updates = updates.title(sanitized);
        }

        updates.images = self
            .images
            .map(|images| images.iter().map(|url| url.trim().to_string()).collect());
        updates.variants = self.variants;
        updates.body_html = self.body_html;
        updates.vendor = self.vendor.map(|vendor| sanitize_inline_text(&vendor));
        updates.product_type = self.product_type.map(|name| sanitize_inline_text(&name));
        updates.product_type_id = self.product_type_id.map(|id| id.trim().to_string());
        updates.tags = self.tags;
        updates.meta_variations = self.meta_variations;
        updates.template_suffix = self.template_suffix;

        if updates.is_empty() {
            return Err(TemplateFormError::NothingToUpdate);
        }

        if let Some(expected) = self.expected_updated_at {
            updates = updates.expecting(expected);
        }

        Ok(updates)
    }
}

/// Selection submitted by the bulk delete action.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkDeleteForm {
    #[validate(length(min = 1))]
    pub ids: Vec<i32>,
}

impl BulkDeleteForm {
    /// Validates the selection and returns the ids without duplicates, in order.
    pub fn into_ids(self) -> TemplateFormResult<Vec<i32>> {
        self.validate()?;

        let mut ids = Vec::with_capacity(self.ids.len());
        for id in self.ids {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

#[derive(MultipartForm)]
/// Multipart form used by both the import and the import preview endpoints.
pub struct ImportTemplatesForm {
    #[multipart(limit = "10MB")]
    /// JSON array of templates.
    pub templates: TempFile,
    #[multipart(limit = "10MB")]
    /// Optional JSON object mapping handles to meta variations.
    pub meta: Option<TempFile>,
    pub default_product_type_id: Option<Text<String>>,
    pub skip_meta_validation: Option<Text<String>>,
}

/// Raw import payload extracted from [`ImportTemplatesForm`].
#[derive(Debug, Default, Clone)]
pub struct TemplateUpload {
    pub templates: Vec<u8>,
    pub meta: Option<Vec<u8>>,
    /// Product type id used for templates lacking one.
    pub default_product_type_id: Option<i32>,
    pub skip_meta_validation: bool,
}

impl ImportTemplatesForm {
    /// Reads the uploaded files and normalizes the text fields.
    pub fn into_upload(mut self) -> TemplateFormResult<TemplateUpload> {
        let templates = read_temp_file(&mut self.templates)?;
        let meta = match self.meta.as_mut() {
            Some(file) => Some(read_temp_file(file)?),
            None => None,
        };

        let default_product_type_id = match self
            .default_product_type_id
            .map(|text| text.into_inner())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
            Some(value) => Some(
                value
                    .parse::<i32>()
                    .map_err(|_| TemplateFormError::InvalidProductType(value))?,
            ),
            None => None,
        };

        let skip_meta_validation = self
            .skip_meta_validation
            .map(|text| parse_flag(&text.into_inner()))
            .unwrap_or(false);

        Ok(TemplateUpload {
            templates,
            meta,
            default_product_type_id,
            skip_meta_validation,
        })
    }
}

fn read_temp_file(file: &mut TempFile) -> std::io::Result<Vec<u8>> {
    file.file.rewind()?;
    let mut bytes = Vec::new();
    file.file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Interprets checkbox-style values.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}
