use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::template::{
    NewProductTemplate as DomainNewTemplate, ProductTemplate as DomainTemplate,
    UpdateProductTemplate as DomainUpdateTemplate,
};

/// Row of `product_templates`; list fields are stored as JSON text.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::product_templates)]
pub struct ProductTemplate {
    pub id: i32,
    pub hub_id: i32,
    pub title: String,
    pub handle: String,
    pub images: String,
    pub variants: String,
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub product_type_id: String,
    pub tags: String,
    pub meta_variations: String,
    pub template_suffix: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_templates)]
pub struct NewProductTemplate<'a> {
    pub hub_id: i32,
    pub title: &'a str,
    pub handle: &'a str,
    pub images: String,
    pub variants: String,
    pub body_html: &'a str,
    pub vendor: &'a str,
    pub product_type: &'a str,
    pub product_type_id: &'a str,
    pub tags: &'a str,
    pub meta_variations: String,
    pub template_suffix: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::product_templates)]
pub struct UpdateProductTemplate<'a> {
    pub title: Option<&'a str>,
    pub images: Option<String>,
    pub variants: Option<String>,
    pub body_html: Option<&'a str>,
    pub vendor: Option<&'a str>,
    pub product_type: Option<&'a str>,
    pub product_type_id: Option<&'a str>,
    pub tags: Option<&'a str>,
    pub meta_variations: Option<String>,
    pub template_suffix: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<ProductTemplate> for DomainTemplate {
    type Error = serde_json::Error;

    fn try_from(value: ProductTemplate) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            hub_id: value.hub_id,
            title: value.title,
            handle: value.handle,
            images: serde_json::from_str(&value.images)?,
            variants: serde_json::from_str(&value.variants)?,
            body_html: value.body_html,
            vendor: value.vendor,
            product_type: value.product_type,
            product_type_id: value.product_type_id,
            tags: value.tags,
            meta_variations: serde_json::from_str(&value.meta_variations)?,
            template_suffix: value.template_suffix,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainNewTemplate> for NewProductTemplate<'a> {
    type Error = serde_json::Error;

    fn try_from(value: &'a DomainNewTemplate) -> Result<Self, Self::Error> {
        Ok(Self {
            hub_id: value.hub_id,
            title: value.title.as_str(),
            handle: value.handle.as_str(),
            images: serde_json::to_string(&value.images)?,
            variants: serde_json::to_string(&value.variants)?,
            body_html: value.body_html.as_str(),
            vendor: value.vendor.as_str(),
            product_type: value.product_type.as_str(),
            product_type_id: value.product_type_id.as_str(),
            tags: value.tags.as_str(),
            meta_variations: serde_json::to_string(&value.meta_variations)?,
            template_suffix: value.template_suffix.as_str(),
            created_at: value.updated_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainUpdateTemplate> for UpdateProductTemplate<'a> {
    type Error = serde_json::Error;

    fn try_from(value: &'a DomainUpdateTemplate) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title.as_deref(),
            images: value.images.as_ref().map(serde_json::to_string).transpose()?,
            variants: value
                .variants
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            body_html: value.body_html.as_deref(),
            vendor: value.vendor.as_deref(),
            product_type: value.product_type.as_deref(),
            product_type_id: value.product_type_id.as_deref(),
            tags: value.tags.as_deref(),
            meta_variations: value
                .meta_variations
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            template_suffix: value.template_suffix.as_deref(),
            updated_at: value.updated_at,
        })
    }
}
