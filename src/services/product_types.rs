use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use pushkind_common::routes::check_role;
use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::product_type::{ProductType, ProductTypeListQuery};
use crate::forms::product_types::{AddProductTypeForm, EditProductTypeForm};
use crate::repository::{ProductTypeReader, ProductTypeWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the product type listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductTypesQuery {
    pub search: Option<String>,
    /// Page requested by the UI (1-based).
    pub page: Option<usize>,
}

pub fn load_product_types<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ProductTypesQuery,
) -> ServiceResult<Paginated<ProductType>>
where
    R: ProductTypeReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let page = query.page.unwrap_or(1);
    let mut list_query =
        ProductTypeListQuery::new(user.hub_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(term) = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
    {
        list_query = list_query.search(term);
    }

    let (total, product_types) = repo
        .list_product_types(list_query)
        .map_err(ServiceError::from)?;

    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
    Ok(Paginated::new(product_types, page, total_pages))
}

pub fn get_product_type<R>(
    repo: &R,
    user: &AuthenticatedUser,
    type_id: i32,
) -> ServiceResult<ProductType>
where
    R: ProductTypeReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.get_product_type_by_id(type_id, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_product_type<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddProductTypeForm,
) -> ServiceResult<ProductType>
where
    R: ProductTypeWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let new_type = form
        .into_new_product_type(user.hub_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let created = repo
        .create_product_type(&new_type)
        .map_err(ServiceError::from)?;

    log::info!("Created product type {} for hub {}", created.id, user.hub_id);

    Ok(created)
}

pub fn update_product_type<R>(
    repo: &R,
    user: &AuthenticatedUser,
    type_id: i32,
    form: EditProductTypeForm,
) -> ServiceResult<ProductType>
where
    R: ProductTypeWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let updates = form
        .into_update_product_type()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.update_product_type(type_id, user.hub_id, &updates)
        .map_err(ServiceError::from)
}

/// Deletes a product type. Templates keep their reference to it.
pub fn remove_product_type<R>(
    repo: &R,
    user: &AuthenticatedUser,
    type_id: i32,
) -> ServiceResult<()>
where
    R: ProductTypeWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_product_type(type_id, user.hub_id)
        .map_err(ServiceError::from)?;

    log::info!("Deleted product type {type_id} of hub {}", user.hub_id);

    Ok(())
}
