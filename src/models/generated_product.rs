use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::generated_product::{
    GeneratedProduct as DomainGeneratedProduct, NewGeneratedProduct as DomainNewGeneratedProduct,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::generated_products)]
pub struct GeneratedProduct {
    pub id: String,
    pub hub_id: i32,
    pub template_id: Option<i32>,
    pub title: String,
    pub handle: String,
    pub images: String,
    pub variants: String,
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub product_type_id: String,
    pub tags: String,
    pub selected_meta: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::generated_products)]
pub struct NewGeneratedProduct<'a> {
    pub id: &'a str,
    pub hub_id: i32,
    pub template_id: Option<i32>,
    pub title: &'a str,
    pub handle: &'a str,
    pub images: String,
    pub variants: String,
    pub body_html: &'a str,
    pub vendor: &'a str,
    pub product_type: &'a str,
    pub product_type_id: &'a str,
    pub tags: String,
    pub selected_meta: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<GeneratedProduct> for DomainGeneratedProduct {
    type Error = serde_json::Error;

    fn try_from(value: GeneratedProduct) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            hub_id: value.hub_id,
            template_id: value.template_id,
            title: value.title,
            handle: value.handle,
            images: serde_json::from_str(&value.images)?,
            variants: serde_json::from_str(&value.variants)?,
            body_html: value.body_html,
            vendor: value.vendor,
            product_type: value.product_type,
            product_type_id: value.product_type_id,
            tags: serde_json::from_str(&value.tags)?,
            selected_meta: serde_json::from_str(&value.selected_meta)?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainNewGeneratedProduct> for NewGeneratedProduct<'a> {
    type Error = serde_json::Error;

    fn try_from(value: &'a DomainNewGeneratedProduct) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.as_str(),
            hub_id: value.hub_id,
            template_id: value.template_id,
            title: value.title.as_str(),
            handle: value.handle.as_str(),
            images: serde_json::to_string(&value.images)?,
            variants: serde_json::to_string(&value.variants)?,
            body_html: value.body_html.as_str(),
            vendor: value.vendor.as_str(),
            product_type: value.product_type.as_str(),
            product_type_id: value.product_type_id.as_str(),
            tags: serde_json::to_string(&value.tags)?,
            selected_meta: serde_json::to_string(&value.selected_meta)?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}
