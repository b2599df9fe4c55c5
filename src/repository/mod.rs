use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::pagination::Pagination;

use crate::domain::generated_product::{
    GeneratedProduct, GeneratedProductListQuery, NewGeneratedProduct,
};
use crate::domain::product_type::{
    NewProductType, ProductType, ProductTypeListQuery, UpdateProductType,
};
use crate::domain::template::{
    NewProductTemplate, ProductTemplate, TemplateListQuery, UpdateProductTemplate,
};

pub mod errors;
pub mod generated_product;
pub mod product_type;
pub mod template;

#[cfg(test)]
pub mod mock;

pub use errors::{RepositoryError, RepositoryResult};

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// SQL `(offset, limit)` for a page; out-of-range pages clamp instead of overflowing.
fn page_window(pagination: &Pagination) -> (i64, i64) {
    let skipped = (pagination.page.max(1) - 1).saturating_mul(pagination.per_page);
    let offset = i64::try_from(skipped).unwrap_or(i64::MAX);
    let limit = i64::try_from(pagination.per_page).unwrap_or(i64::MAX);
    (offset, limit)
}

/// Read-only operations over the product type directory.
pub trait ProductTypeReader {
    fn get_product_type_by_id(&self, id: i32, hub_id: i32)
    -> RepositoryResult<Option<ProductType>>;
    fn list_product_types(
        &self,
        query: ProductTypeListQuery,
    ) -> RepositoryResult<(usize, Vec<ProductType>)>;
}

/// Write operations over the product type directory.
pub trait ProductTypeWriter {
    fn create_product_type(&self, new_type: &NewProductType) -> RepositoryResult<ProductType>;
    fn update_product_type(
        &self,
        type_id: i32,
        hub_id: i32,
        updates: &UpdateProductType,
    ) -> RepositoryResult<ProductType>;
    fn delete_product_type(&self, type_id: i32, hub_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over product templates.
pub trait TemplateReader {
    fn get_template_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<ProductTemplate>>;
    /// Returns the oldest template carrying `handle` when duplicates exist.
    fn get_template_by_handle(
        &self,
        handle: &str,
        hub_id: i32,
    ) -> RepositoryResult<Option<ProductTemplate>>;
    fn list_templates(
        &self,
        query: TemplateListQuery,
    ) -> RepositoryResult<(usize, Vec<ProductTemplate>)>;
}

/// Write operations over product templates.
pub trait TemplateWriter {
    fn create_template(&self, new_template: &NewProductTemplate)
    -> RepositoryResult<ProductTemplate>;
    fn update_template_by_handle(
        &self,
        handle: &str,
        hub_id: i32,
        updates: &UpdateProductTemplate,
    ) -> RepositoryResult<ProductTemplate>;
    fn delete_template(&self, template_id: i32, hub_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over generated products.
pub trait GeneratedProductReader {
    fn get_generated_product_by_id(
        &self,
        id: &str,
        hub_id: i32,
    ) -> RepositoryResult<Option<GeneratedProduct>>;
    /// Lists matching products ordered newest first.
    fn list_generated_products(
        &self,
        query: GeneratedProductListQuery,
    ) -> RepositoryResult<(usize, Vec<GeneratedProduct>)>;
}

/// Write operations over generated products. Products are never updated.
pub trait GeneratedProductWriter {
    fn create_generated_product(
        &self,
        new_product: &NewGeneratedProduct,
    ) -> RepositoryResult<GeneratedProduct>;
    fn delete_generated_product(&self, id: &str, hub_id: i32) -> RepositoryResult<()>;
}
