use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Maximum allowed length for a product type reference.
const REFERENCE_MAX_LEN: u64 = 64;

/// Errors that can occur while processing generation requests.
#[derive(Debug, Error)]
pub enum GenerationFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("product type is required")]
    EmptyProductType,
}

/// Request body of `POST /generations`.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateProductForm {
    #[validate(length(min = 1, max = REFERENCE_MAX_LEN))]
    pub product_type_id: String,
}

impl GenerateProductForm {
    /// Validates the payload and returns the trimmed product type reference.
    pub fn into_product_type_id(self) -> Result<String, GenerationFormError> {
        self.validate()?;

        let trimmed = self.product_type_id.trim();
        if trimmed.is_empty() {
            return Err(GenerationFormError::EmptyProductType);
        }

        Ok(trimmed.to_string())
    }
}
