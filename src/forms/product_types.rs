use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product_type::{NewProductType, UpdateProductType};
use crate::forms::{sanitize_inline_text, sanitize_multiline_text};

/// Maximum allowed length for a product type name.
const NAME_MAX_LEN: usize = 128;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Result type returned by the product type form helpers.
pub type ProductTypeFormResult<T> = Result<T, ProductTypeFormError>;

/// Errors that can occur while processing product type forms.
#[derive(Debug, Error)]
pub enum ProductTypeFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("product type name cannot be empty")]
    EmptyName,
}

/// Payload submitted when creating a product type.
#[derive(Debug, Deserialize, Validate)]
pub struct AddProductTypeForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    pub description: Option<String>,
}

impl AddProductTypeForm {
    /// Validates and sanitizes the payload into a domain `NewProductType`.
    pub fn into_new_product_type(self, hub_id: i32) -> ProductTypeFormResult<NewProductType> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(ProductTypeFormError::EmptyName);
        }

        let mut new_type = NewProductType::new(hub_id, name);
        if let Some(description) = clean_description(self.description) {
            new_type = new_type.with_description(description);
        }

        Ok(new_type)
    }
}

/// Payload submitted when editing a product type.
#[derive(Debug, Deserialize, Validate)]
pub struct EditProductTypeForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    /// New description; empty or missing clears it.
    pub description: Option<String>,
}

impl EditProductTypeForm {
    /// Validates and sanitizes the payload into a domain `UpdateProductType`.
    pub fn into_update_product_type(self) -> ProductTypeFormResult<UpdateProductType> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(ProductTypeFormError::EmptyName);
        }

        Ok(UpdateProductType::new(
            name,
            clean_description(self.description),
        ))
    }
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .as_deref()
        .map(sanitize_multiline_text)
        .filter(|value| !value.is_empty())
}
