//! Structural checks applied to templates before they are stored.

use serde::Serialize;

use crate::domain::template::TemplateDraft;

/// Which product type field must be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductTypeCheck {
    /// The free-text `product_type` name.
    #[default]
    Name,
    /// The `product_type_id` reference, as required by the import preview.
    Id,
}

/// Switches controlling [`validate_template`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Do not require meta variations to be present.
    pub skip_meta_validation: bool,
    pub product_type_check: ProductTypeCheck,
}

impl ValidationOptions {
    pub fn skip_meta(mut self, skip: bool) -> Self {
        self.skip_meta_validation = skip;
        self
    }

    pub fn check_product_type(mut self, check: ProductTypeCheck) -> Self {
        self.product_type_check = check;
        self
    }
}

/// Outcome of validating one template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Issues joined for single-line display.
    pub fn summary(&self) -> String {
        self.errors.join(", ")
    }
}

/// Checks a template for missing required data.
///
/// All issues are collected; nothing short-circuits and nothing panics.
pub fn validate_template(draft: &TemplateDraft, options: ValidationOptions) -> ValidationReport {
    let mut errors = Vec::new();

    if is_blank(&draft.title) {
        errors.push("Missing title".to_string());
    }
    if is_blank(&draft.handle) {
        errors.push("Missing handle".to_string());
    }
    if is_blank(&draft.vendor) {
        errors.push("Missing vendor".to_string());
    }
    match options.product_type_check {
        ProductTypeCheck::Name if is_blank(&draft.product_type) => {
            errors.push("Missing product type".to_string());
        }
        ProductTypeCheck::Id if is_blank(&draft.product_type_id) => {
            errors.push("Missing product type ID".to_string());
        }
        _ => {}
    }

    if draft.images.is_empty() {
        errors.push("At least one image is required".to_string());
    } else {
        for (index, url) in draft.images.iter().enumerate() {
            if is_blank(url) {
                errors.push(format!("Invalid image URL at index {index}"));
            }
        }
    }

    if draft.variants.is_empty() {
        errors.push("At least one variant is required".to_string());
    } else {
        for (index, variant) in draft.variants.iter().enumerate() {
            if is_blank(&variant.price) {
                errors.push(format!("Missing price for variant {index}"));
            }
            if is_blank(&variant.sku) {
                errors.push(format!("Missing SKU for variant {index}"));
            }
        }
    }

    if !options.skip_meta_validation && draft.meta_variations.is_none() {
        errors.push("Missing meta variations".to_string());
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
