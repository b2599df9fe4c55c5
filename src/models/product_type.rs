use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product_type::{
    NewProductType as DomainNewProductType, ProductType as DomainProductType,
    UpdateProductType as DomainUpdateProductType,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::product_types)]
pub struct ProductType {
    pub id: i32,
    pub hub_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_types)]
pub struct NewProductType<'a> {
    pub hub_id: i32,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::product_types)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateProductType<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl From<ProductType> for DomainProductType {
    fn from(value: ProductType) -> Self {
        Self {
            id: value.id,
            hub_id: value.hub_id,
            name: value.name,
            description: value.description,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewProductType> for NewProductType<'a> {
    fn from(value: &'a DomainNewProductType) -> Self {
        Self {
            hub_id: value.hub_id,
            name: value.name.as_str(),
            description: value.description.as_deref(),
            created_at: value.updated_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateProductType> for UpdateProductType<'a> {
    fn from(value: &'a DomainUpdateProductType) -> Self {
        Self {
            name: value.name.as_str(),
            description: value.description.as_deref(),
            updated_at: value.updated_at,
        }
    }
}
