use chrono::{NaiveDateTime, Utc};
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

/// Question used for the Q&A block of the empty meta-variations placeholder.
pub const PLACEHOLDER_QUESTION: &str = "Product FAQ";

/// Sellable variant of a product template.
///
/// Options are positional (`option1..3`) and are never renumbered by the
/// generator; only the SKU is rewritten per generation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProductVariant {
    #[serde(default)]
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(default)]
    pub option1: Option<String>,
    #[serde(default)]
    pub option2: Option<String>,
    #[serde(default)]
    pub option3: Option<String>,
    #[serde(default = "default_fulfillment_service")]
    pub fulfillment_service: String,
    #[serde(default = "default_inventory_management")]
    pub inventory_management: String,
    #[serde(default = "default_requires_shipping")]
    pub requires_shipping: bool,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub inventory_quantity: i64,
}

fn default_fulfillment_service() -> String {
    "manual".to_string()
}

fn default_inventory_management() -> String {
    "shopify".to_string()
}

fn default_requires_shipping() -> bool {
    true
}

impl ProductVariant {
    /// Build a variant with the given price and SKU and default fulfillment settings.
    pub fn new(price: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            position: None,
            option1: None,
            option2: None,
            option3: None,
            fulfillment_service: default_fulfillment_service(),
            inventory_management: default_inventory_management(),
            requires_shipping: default_requires_shipping(),
            sku: sku.into(),
            inventory_quantity: 0,
        }
    }

    /// Set the first option value.
    pub fn with_option1(mut self, value: impl Into<String>) -> Self {
        self.option1 = Some(value.into());
        self
    }
}

/// Homepage "image with text" block; titles and descriptions are paired by index.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ImageWithTextSection {
    #[serde(default)]
    pub title_variations: Vec<String>,
    #[serde(default)]
    pub description_variations: Vec<String>,
}

/// Collapsible Q&A block; the question is fixed, only the answer varies.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct QaSection {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer_variations: Vec<String>,
}

/// Pools of alternative copy attached to a template.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct MetaVariations {
    #[serde(default)]
    pub product_main_description: Vec<String>,
    #[serde(default)]
    pub image_with_text_sections: Vec<ImageWithTextSection>,
    #[serde(default)]
    pub collapsible_qa_sections: Vec<QaSection>,
    #[serde(default)]
    pub brandable_title_variations: Vec<String>,
}

impl MetaVariations {
    /// Empty placeholder holding a single blank entry in every required pool.
    ///
    /// Lets structural data be imported now and the copy be filled in later.
    pub fn placeholder() -> Self {
        Self {
            product_main_description: vec![String::new()],
            image_with_text_sections: vec![ImageWithTextSection {
                title_variations: vec![String::new()],
                description_variations: vec![String::new()],
            }],
            collapsible_qa_sections: vec![QaSection {
                question: PLACEHOLDER_QUESTION.to_string(),
                answer_variations: vec![String::new()],
            }],
            brandable_title_variations: vec![String::new()],
        }
    }

    /// Whether the main description pool holds at least one entry.
    pub fn has_copy(&self) -> bool {
        !self.product_main_description.is_empty()
    }
}

/// Stored product template belonging to a hub.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProductTemplate {
    pub id: i32,
    pub hub_id: i32,
    pub title: String,
    /// Business key used for lookups and import deduplication.
    pub handle: String,
    pub images: Vec<String>,
    pub variants: Vec<ProductVariant>,
    pub body_html: String,
    pub vendor: String,
    /// Product type name as entered by the user.
    pub product_type: String,
    /// Reference to a [`crate::domain::product_type::ProductType`].
    pub product_type_id: String,
    /// Comma-joined tag list.
    pub tags: String,
    pub meta_variations: MetaVariations,
    pub template_suffix: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Unvalidated template as received from a form or an import file.
///
/// Every field is optional on the wire so that the validator can report
/// all missing data instead of failing on the first absent key.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TemplateDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub product_type_id: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub meta_variations: Option<MetaVariations>,
    #[serde(default)]
    pub template_suffix: String,
}

impl TemplateDraft {
    /// Convert a validated draft into an insert payload for `hub_id`.
    ///
    /// A draft without meta variations receives the empty placeholder.
    pub fn into_new_template(self, hub_id: i32) -> NewProductTemplate {
        NewProductTemplate {
            hub_id,
            title: self.title,
            handle: self.handle,
            images: self.images,
            variants: self.variants,
            body_html: self.body_html,
            vendor: self.vendor,
            product_type: self.product_type,
            product_type_id: self.product_type_id,
            tags: self.tags,
            meta_variations: self
                .meta_variations
                .unwrap_or_else(MetaVariations::placeholder),
            template_suffix: self.template_suffix,
            updated_at: Utc::now().naive_utc(),
        }
    }

    /// Convert a validated draft into a full overwrite of an existing template.
    pub fn into_update(self) -> UpdateProductTemplate {
        UpdateProductTemplate {
            title: Some(self.title),
            images: Some(self.images),
            variants: Some(self.variants),
            body_html: Some(self.body_html),
            vendor: Some(self.vendor),
            product_type: Some(self.product_type),
            product_type_id: Some(self.product_type_id),
            tags: Some(self.tags),
            meta_variations: Some(
                self.meta_variations
                    .unwrap_or_else(MetaVariations::placeholder),
            ),
            template_suffix: Some(self.template_suffix),
            expected_updated_at: None,
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl From<ProductTemplate> for TemplateDraft {
    fn from(value: ProductTemplate) -> Self {
        Self {
            title: value.title,
            handle: value.handle,
            images: value.images,
            variants: value.variants,
            body_html: value.body_html,
            vendor: value.vendor,
            product_type: value.product_type,
            product_type_id: value.product_type_id,
            tags: value.tags,
            meta_variations: Some(value.meta_variations),
            template_suffix: value.template_suffix,
        }
    }
}

/// Payload required to insert a new template for a hub.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProductTemplate {
    pub hub_id: i32,
    pub title: String,
    pub handle: String,
    pub images: Vec<String>,
    pub variants: Vec<ProductVariant>,
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub product_type_id: String,
    pub tags: String,
    pub meta_variations: MetaVariations,
    pub template_suffix: String,
    pub updated_at: NaiveDateTime,
}

/// Partial update applied to the template identified by its handle.
///
/// `None` fields are left untouched. When `expected_updated_at` is set the
/// write only succeeds if the stored `updated_at` still matches it.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProductTemplate {
    pub title: Option<String>,
    pub images: Option<Vec<String>>,
    pub variants: Option<Vec<ProductVariant>>,
    pub body_html: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub product_type_id: Option<String>,
    pub tags: Option<String>,
    pub meta_variations: Option<MetaVariations>,
    pub template_suffix: Option<String>,
    pub expected_updated_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateProductTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateProductTemplate {
    /// Create a patch with no changes applied yet.
    pub fn new() -> Self {
        Self {
            title: None,
            images: None,
            variants: None,
            body_html: None,
            vendor: None,
            product_type: None,
            product_type_id: None,
            tags: None,
            meta_variations: None,
            template_suffix: None,
            expected_updated_at: None,
            updated_at: Utc::now().naive_utc(),
        }
    }

    /// Only apply the patch if the stored template was last updated at `updated_at`.
    pub fn expecting(mut self, updated_at: NaiveDateTime) -> Self {
        self.expected_updated_at = Some(updated_at);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn meta_variations(mut self, meta_variations: MetaVariations) -> Self {
        self.meta_variations = Some(meta_variations);
        self
    }

    /// Whether the patch would change any column besides `updated_at`.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.images.is_none()
            && self.variants.is_none()
            && self.body_html.is_none()
            && self.vendor.is_none()
            && self.product_type.is_none()
            && self.product_type_id.is_none()
            && self.tags.is_none()
            && self.meta_variations.is_none()
            && self.template_suffix.is_none()
    }
}

/// Ordering applied to template listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSort {
    /// Most recently updated first.
    #[default]
    Newest,
    /// Least recently updated first.
    Oldest,
    TitleAsc,
    TitleDesc,
}

/// Query definition used to list templates for a hub.
#[derive(Debug, Clone)]
pub struct TemplateListQuery {
    pub hub_id: i32,
    /// Case-insensitive substring matched against title, product type and vendor.
    pub search: Option<String>,
    /// Exact product type reference filter.
    pub product_type_id: Option<String>,
    pub sort: TemplateSort,
    pub pagination: Option<Pagination>,
}

impl TemplateListQuery {
    /// Construct a query that targets all templates belonging to `hub_id`.
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            search: None,
            product_type_id: None,
            sort: TemplateSort::default(),
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn product_type_id(mut self, product_type_id: impl Into<String>) -> Self {
        self.product_type_id = Some(product_type_id.into());
        self
    }

    pub fn sort(mut self, sort: TemplateSort) -> Self {
        self.sort = sort;
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
