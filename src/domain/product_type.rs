use chrono::{NaiveDateTime, Utc};
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

/// Product category used to group templates and generated products.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProductType {
    /// Unique identifier of the product type.
    pub id: i32,
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Display name of the product type.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Timestamp for when the record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the record.
    pub updated_at: NaiveDateTime,
}

impl ProductType {
    /// Textual reference stored in `product_type_id` columns of templates.
    pub fn reference(&self) -> String {
        self.id.to_string()
    }
}

/// Payload required to insert a new product type for a hub.
#[derive(Debug, Clone)]
pub struct NewProductType {
    pub hub_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl NewProductType {
    /// Build a new product type payload capturing the current timestamp.
    pub fn new(hub_id: i32, name: impl Into<String>) -> Self {
        Self {
            hub_id,
            name: name.into(),
            description: None,
            updated_at: Utc::now().naive_utc(),
        }
    }

    /// Attach a description to the payload.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Patch data applied when updating an existing product type.
#[derive(Debug, Clone)]
pub struct UpdateProductType {
    /// Updated name.
    pub name: String,
    /// New description; `None` clears it.
    pub description: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl UpdateProductType {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            updated_at: Utc::now().naive_utc(),
        }
    }
}

/// Query definition used to list product types for a hub.
#[derive(Debug, Clone)]
pub struct ProductTypeListQuery {
    pub hub_id: i32,
    /// Optional case-insensitive substring search applied to names.
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl ProductTypeListQuery {
    /// Construct a query that targets all product types belonging to `hub_id`.
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            search: None,
            pagination: None,
        }
    }

    /// Filter the results by a search term applied to the name.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
