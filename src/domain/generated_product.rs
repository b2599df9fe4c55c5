use chrono::NaiveDateTime;
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

use crate::domain::template::ProductVariant;

/// Title/description pair chosen for one image-with-text section.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImageTextSelection {
    pub title: String,
    pub description: String,
}

/// Question with the answer chosen for it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QaSelection {
    pub question: String,
    pub answer: String,
}

/// Copy picked from a template's meta variations during generation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SelectedMeta {
    pub main_description: String,
    pub image_text_sections: Vec<ImageTextSelection>,
    pub qa_sections: Vec<QaSelection>,
    pub selected_title: String,
}

/// Immutable product assembled from a template.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratedProduct {
    /// Globally unique identifier (UUID v4).
    pub id: String,
    pub hub_id: i32,
    /// Source template; `None` once the template row no longer exists.
    pub template_id: Option<i32>,
    pub title: String,
    pub handle: String,
    pub images: Vec<String>,
    pub variants: Vec<ProductVariant>,
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub product_type_id: String,
    pub tags: Vec<String>,
    pub selected_meta: SelectedMeta,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Generation result ready to be persisted.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewGeneratedProduct {
    pub id: String,
    pub hub_id: i32,
    pub template_id: Option<i32>,
    pub title: String,
    pub handle: String,
    pub images: Vec<String>,
    pub variants: Vec<ProductVariant>,
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub product_type_id: String,
    pub tags: Vec<String>,
    pub selected_meta: SelectedMeta,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Query definition used to list generated products, newest first.
#[derive(Debug, Clone)]
pub struct GeneratedProductListQuery {
    pub hub_id: i32,
    pub template_id: Option<i32>,
    pub product_type_id: Option<String>,
    pub pagination: Option<Pagination>,
}

impl GeneratedProductListQuery {
    /// Construct a query that targets all generated products of `hub_id`.
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            template_id: None,
            product_type_id: None,
            pagination: None,
        }
    }

    /// Only return products generated from `template_id`.
    pub fn template_id(mut self, template_id: i32) -> Self {
        self.template_id = Some(template_id);
        self
    }

    /// Only return products of the given product type reference.
    pub fn product_type_id(mut self, product_type_id: impl Into<String>) -> Self {
        self.product_type_id = Some(product_type_id.into());
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
