//! Batch import, import preview and export of product templates.
//!
//! An import is decided in full before anything is written: the uploaded
//! drafts are reconciled against the hub's stored templates into an
//! [`ImportPlan`], and only a plan without issues is handed to the
//! [`ImportQueue`], which applies it one record at a time.

use std::collections::{HashMap, HashSet};

use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::Serialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::product_type::{ProductType, ProductTypeListQuery};
use crate::domain::template::{
    MetaVariations, NewProductTemplate, ProductTemplate, TemplateDraft, TemplateListQuery,
    TemplateSort, UpdateProductTemplate,
};
use crate::forms::templates::TemplateUpload;
use crate::repository::{ProductTypeReader, RepositoryError, TemplateReader, TemplateWriter};
use crate::services::validation::{ProductTypeCheck, ValidationOptions, validate_template};
use crate::services::{ServiceError, ServiceResult};

/// File name offered for downloads of [`export_templates`].
pub const EXPORT_FILE_NAME: &str = "product-templates.json";

/// Decodes an uploaded JSON array into drafts.
///
/// Every malformed element is reported; the file is rejected if any is.
pub fn parse_templates_json(bytes: &[u8]) -> Result<Vec<TemplateDraft>, Vec<String>> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|err| vec![format!("Invalid JSON: {err}")])?;

    let serde_json::Value::Array(items) = value else {
        return Err(vec![
            "Import file must contain a JSON array of templates".to_string(),
        ]);
    };

    let mut drafts = Vec::with_capacity(items.len());
    let mut errors = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<TemplateDraft>(item) {
            Ok(draft) => drafts.push(draft),
            Err(err) => errors.push(format!("Template {}: malformed record: {err}", index + 1)),
        }
    }

    if errors.is_empty() {
        Ok(drafts)
    } else {
        Err(errors)
    }
}

/// Decodes the optional meta file: a JSON object keyed by template handle.
pub fn parse_meta_variations_json(
    bytes: &[u8],
) -> Result<HashMap<String, MetaVariations>, String> {
    serde_json::from_slice(bytes).map_err(|err| format!("Invalid meta variations file: {err}"))
}

/// Product type assigned to imported templates that do not name one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultProductType {
    pub id: String,
    pub name: String,
}

impl From<&ProductType> for DefaultProductType {
    fn from(value: &ProductType) -> Self {
        Self {
            id: value.reference(),
            name: value.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub default_product_type: Option<DefaultProductType>,
    /// Import structural data only; meta variations become placeholders.
    pub skip_meta_validation: bool,
    /// Meta variations applied by handle when `skip_meta_validation` is set.
    pub meta_variations_by_handle: Option<HashMap<String, MetaVariations>>,
}

/// Single write decided by [`reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOp {
    Create(NewProductTemplate),
    /// Overwrite of the stored template with the same handle.
    Update {
        handle: String,
        changes: UpdateProductTemplate,
    },
}

impl ImportOp {
    pub fn handle(&self) -> &str {
        match self {
            ImportOp::Create(template) => &template.handle,
            ImportOp::Update { handle, .. } => handle,
        }
    }
}

/// Writes of one import, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPlan {
    pub ops: Vec<ImportOp>,
}

impl ImportPlan {
    pub fn to_create(&self) -> Vec<&NewProductTemplate> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                ImportOp::Create(template) => Some(template),
                ImportOp::Update { .. } => None,
            })
            .collect()
    }

    pub fn to_update(&self) -> Vec<(&str, &UpdateProductTemplate)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                ImportOp::Create(_) => None,
                ImportOp::Update { handle, changes } => Some((handle.as_str(), changes)),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Ready(ImportPlan),
    /// Some drafts lack a product type and no default was chosen.
    NeedsDefaultProductType { handles: Vec<String> },
    /// One line per failing draft: `Template N: issue, issue`.
    Invalid { errors: Vec<String> },
}

/// Decides which drafts create new templates and which overwrite stored ones.
///
/// Pure: nothing is written, and a batch with any issue yields no plan at all.
pub fn reconcile(
    hub_id: i32,
    candidates: Vec<TemplateDraft>,
    existing: &[ProductTemplate],
    options: ReconcileOptions,
) -> ReconcileOutcome {
    let ReconcileOptions {
        default_product_type,
        skip_meta_validation,
        meta_variations_by_handle,
    } = options;

    let mut candidates = candidates;

    if skip_meta_validation {
        for candidate in candidates.iter_mut() {
            candidate.meta_variations = Some(MetaVariations::placeholder());
        }
    }

    let default_product_type = default_product_type.filter(|default| !default.id.trim().is_empty());

    if default_product_type.is_none() {
        let handles: Vec<String> = candidates
            .iter()
            .filter(|candidate| candidate.product_type_id.trim().is_empty())
            .map(|candidate| candidate.handle.clone())
            .collect();
        if !handles.is_empty() {
            return ReconcileOutcome::NeedsDefaultProductType { handles };
        }
    }

    for candidate in candidates.iter_mut() {
        let own_id = candidate.product_type_id.trim().to_string();
        if !own_id.is_empty() {
            candidate.product_type_id = own_id;
            continue;
        }
        if let Some(default) = default_product_type.as_ref() {
            candidate.product_type_id = default.id.trim().to_string();
            if candidate.product_type.trim().is_empty() {
                candidate.product_type = default.name.clone();
            }
        }
    }

    if skip_meta_validation {
        if let Some(meta_by_handle) = meta_variations_by_handle.as_ref() {
            for candidate in candidates.iter_mut() {
                candidate.meta_variations = Some(
                    meta_by_handle
                        .get(&candidate.handle)
                        .cloned()
                        .unwrap_or_else(MetaVariations::placeholder),
                );
            }
        }
    }

    let validation = ValidationOptions::default()
        .skip_meta(skip_meta_validation)
        .check_product_type(ProductTypeCheck::Name);

    let mut errors = Vec::new();
    let mut seen_handles = HashSet::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let mut issues = validate_template(candidate, validation).errors;
        let handle = candidate.handle.as_str();
        if !handle.trim().is_empty() && !seen_handles.insert(handle) {
            issues.push(format!("Duplicate handle `{handle}` in import"));
        }
        if !issues.is_empty() {
            errors.push(format!("Template {}: {}", index + 1, issues.join(", ")));
        }
    }

    if !errors.is_empty() {
        return ReconcileOutcome::Invalid { errors };
    }

    let mut stored: HashMap<&str, &ProductTemplate> = HashMap::new();
    for template in existing {
        stored
            .entry(template.handle.as_str())
            .and_modify(|current| {
                if template.id < current.id {
                    *current = template;
                }
            })
            .or_insert(template);
    }

    let ops = candidates
        .into_iter()
        .map(|candidate| match stored.get(candidate.handle.as_str()) {
            Some(current) => ImportOp::Update {
                handle: candidate.handle.clone(),
                changes: candidate.into_update().expecting(current.updated_at),
            },
            None => ImportOp::Create(candidate.into_new_template(hub_id)),
        })
        .collect();

    ReconcileOutcome::Ready(ImportPlan { ops })
}

/// Number of templates written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub created: usize,
    pub updated: usize,
}

/// Applies an [`ImportPlan`] strictly in order.
///
/// The first failure stops the queue; earlier writes stay committed.
pub struct ImportQueue<'a, W: TemplateWriter + ?Sized> {
    writer: &'a W,
    hub_id: i32,
}

impl<'a, W: TemplateWriter + ?Sized> ImportQueue<'a, W> {
    pub fn new(writer: &'a W, hub_id: i32) -> Self {
        Self { writer, hub_id }
    }

    pub fn apply(&self, plan: ImportPlan) -> ServiceResult<ImportCounts> {
        let mut counts = ImportCounts::default();

        for (applied, op) in plan.ops.into_iter().enumerate() {
            let handle = op.handle().to_string();
            let result = match &op {
                ImportOp::Create(template) => self
                    .writer
                    .create_template(template)
                    .map(|_| counts.created += 1),
                ImportOp::Update { handle, changes } => self
                    .writer
                    .update_template_by_handle(handle, self.hub_id, changes)
                    .map(|_| counts.updated += 1),
            };

            if let Err(err) = result {
                log::error!(
                    "Import for hub {} stopped at `{handle}` after {applied} records: {err}",
                    self.hub_id
                );
                return Err(ServiceError::ImportInterrupted {
                    applied,
                    handle,
                    reason: err.to_string(),
                    conflict: matches!(err, RepositoryError::Conflict(_)),
                });
            }
        }

        Ok(counts)
    }
}

/// Result of a successful import.
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    /// Template list reloaded after the import.
    pub templates: Vec<ProductTemplate>,
}

/// Imports the uploaded templates for the user's hub.
pub fn import_templates<R>(
    repo: &R,
    user: &AuthenticatedUser,
    upload: TemplateUpload,
) -> ServiceResult<ImportSummary>
where
    R: TemplateReader + TemplateWriter + ProductTypeReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let drafts = parse_templates_json(&upload.templates).map_err(ServiceError::Validation)?;
    if drafts.is_empty() {
        return Err(ServiceError::Form("No templates to import".to_string()));
    }

    let default_product_type = match upload.default_product_type_id {
        Some(type_id) => {
            let product_type = repo
                .get_product_type_by_id(type_id, user.hub_id)
                .map_err(ServiceError::from)?
                .ok_or_else(|| ServiceError::Form(format!("Unknown product type {type_id}")))?;
            Some(DefaultProductType::from(&product_type))
        }
        None => None,
    };

    let meta_variations_by_handle = match (&upload.meta, upload.skip_meta_validation) {
        (Some(bytes), true) => Some(parse_meta_variations_json(bytes).map_err(ServiceError::Form)?),
        (Some(_), false) => {
            log::warn!("Ignoring meta variations file because meta validation is enabled");
            None
        }
        (None, _) => None,
    };

    let (_, existing) = repo
        .list_templates(TemplateListQuery::new(user.hub_id))
        .map_err(ServiceError::from)?;

    let options = ReconcileOptions {
        default_product_type,
        skip_meta_validation: upload.skip_meta_validation,
        meta_variations_by_handle,
    };

    let plan = match reconcile(user.hub_id, drafts, &existing, options) {
        ReconcileOutcome::Ready(plan) => plan,
        ReconcileOutcome::NeedsDefaultProductType { handles } => {
            return Err(ServiceError::MissingProductType(handles));
        }
        ReconcileOutcome::Invalid { errors } => return Err(ServiceError::Validation(errors)),
    };

    let counts = ImportQueue::new(repo, user.hub_id).apply(plan)?;

    let (_, templates) = repo
        .list_templates(TemplateListQuery::new(user.hub_id))
        .map_err(ServiceError::from)?;

    log::info!(
        "Imported templates for hub {}: {} created, {} updated",
        user.hub_id,
        counts.created,
        counts.updated
    );

    Ok(ImportSummary {
        created: counts.created,
        updated: counts.updated,
        templates,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewStatus {
    New,
    WillUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaStatus {
    Present,
    Missing,
    Skipped,
}

/// One row of the import preview table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRow {
    pub title: String,
    pub handle: String,
    pub product_type_name: String,
    pub status: PreviewStatus,
    pub issues: Vec<String>,
    pub meta: MetaStatus,
}

/// Describes what importing the upload would do, without writing anything.
pub fn preview_import<R>(
    repo: &R,
    user: &AuthenticatedUser,
    upload: TemplateUpload,
) -> ServiceResult<Vec<PreviewRow>>
where
    R: TemplateReader + ProductTypeReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let drafts = parse_templates_json(&upload.templates).map_err(ServiceError::Validation)?;

    let (_, existing) = repo
        .list_templates(TemplateListQuery::new(user.hub_id))
        .map_err(ServiceError::from)?;
    let (_, product_types) = repo
        .list_product_types(ProductTypeListQuery::new(user.hub_id))
        .map_err(ServiceError::from)?;

    Ok(build_preview(
        &drafts,
        &existing,
        &product_types,
        upload.skip_meta_validation,
    ))
}

fn build_preview(
    drafts: &[TemplateDraft],
    existing: &[ProductTemplate],
    product_types: &[ProductType],
    skip_meta_validation: bool,
) -> Vec<PreviewRow> {
    let stored_handles: HashSet<&str> = existing
        .iter()
        .map(|template| template.handle.as_str())
        .collect();
    let type_names: HashMap<String, &str> = product_types
        .iter()
        .map(|product_type| (product_type.reference(), product_type.name.as_str()))
        .collect();

    let validation = ValidationOptions::default()
        .skip_meta(true)
        .check_product_type(ProductTypeCheck::Id);

    drafts
        .iter()
        .map(|draft| {
            let meta = if skip_meta_validation {
                MetaStatus::Skipped
            } else if draft
                .meta_variations
                .as_ref()
                .is_some_and(MetaVariations::has_copy)
            {
                MetaStatus::Present
            } else {
                MetaStatus::Missing
            };

            PreviewRow {
                title: draft.title.clone(),
                handle: draft.handle.clone(),
                product_type_name: type_names
                    .get(draft.product_type_id.trim())
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| "Unknown Type".to_string()),
                status: if stored_handles.contains(draft.handle.as_str()) {
                    PreviewStatus::WillUpdate
                } else {
                    PreviewStatus::New
                },
                issues: validate_template(draft, validation).errors,
                meta,
            }
        })
        .collect()
}

/// Serializes every template of the hub in the format accepted by the importer.
pub fn export_templates<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<String>
where
    R: TemplateReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let (_, templates) = repo
        .list_templates(TemplateListQuery::new(user.hub_id).sort(TemplateSort::Oldest))
        .map_err(ServiceError::from)?;

    if templates.is_empty() {
        return Err(ServiceError::Form("No templates to export".to_string()));
    }

    let drafts: Vec<TemplateDraft> = templates.into_iter().map(TemplateDraft::from).collect();
    serde_json::to_string_pretty(&drafts).map_err(|err| ServiceError::Storage(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use chrono::{NaiveDate, NaiveDateTime};

    use crate::domain::template::{ImageWithTextSection, ProductVariant, QaSection};
    use crate::repository::mock::{MockProductTypeReader, MockTemplateReader, MockTemplateWriter};
    use crate::repository::RepositoryResult;

    fn datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    fn meta() -> MetaVariations {
        MetaVariations {
            product_main_description: vec!["Great mug".to_string()],
            image_with_text_sections: vec![ImageWithTextSection {
                title_variations: vec!["T1".to_string()],
                description_variations: vec!["D1".to_string()],
            }],
            collapsible_qa_sections: vec![QaSection {
                question: "Dishwasher safe?".to_string(),
                answer_variations: vec!["Yes".to_string()],
            }],
            brandable_title_variations: vec!["SuperMug".to_string()],
        }
    }

    fn draft(handle: &str) -> TemplateDraft {
        TemplateDraft {
            title: format!("Title {handle}"),
            handle: handle.to_string(),
            images: vec!["a.png".to_string()],
            variants: vec![ProductVariant::new("9.99", "SKU-1")],
            vendor: "Acme".to_string(),
            product_type: "Kitchen".to_string(),
            product_type_id: "3".to_string(),
            meta_variations: Some(meta()),
            ..TemplateDraft::default()
        }
    }

    fn stored(id: i32, handle: &str) -> ProductTemplate {
        let new_template = draft(handle).into_new_template(7);
        ProductTemplate {
            id,
            hub_id: new_template.hub_id,
            title: new_template.title,
            handle: new_template.handle,
            images: new_template.images,
            variants: new_template.variants,
            body_html: new_template.body_html,
            vendor: new_template.vendor,
            product_type: new_template.product_type,
            product_type_id: new_template.product_type_id,
            tags: new_template.tags,
            meta_variations: new_template.meta_variations,
            template_suffix: new_template.template_suffix,
            created_at: datetime(),
            updated_at: datetime(),
        }
    }

    fn default_type() -> DefaultProductType {
        DefaultProductType {
            id: "9".to_string(),
            name: "Posters".to_string(),
        }
    }

    fn ready(outcome: ReconcileOutcome) -> ImportPlan {
        match outcome {
            ReconcileOutcome::Ready(plan) => plan,
            other => panic!("expected a plan, got {other:?}"),
        }
    }

    #[test]
    fn parse_requires_json_array() {
        let errors = parse_templates_json(br#"{"handle": "mug"}"#).expect_err("not an array");

        assert_eq!(
            errors,
            vec!["Import file must contain a JSON array of templates"]
        );
    }

    #[test]
    fn parse_reports_malformed_records_by_position() {
        let errors = parse_templates_json(br#"[{"handle": "mug"}, {"images": "nope"}, 5]"#)
            .expect_err("malformed records");

        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("Template 2: malformed record:"));
        assert!(errors[1].starts_with("Template 3: malformed record:"));
    }

    #[test]
    fn parse_accepts_partial_records() {
        let drafts = parse_templates_json(br#"[{"handle": "mug", "variants": [{"sku": "A"}]}]"#)
            .expect("valid array");

        assert_eq!(drafts[0].handle, "mug");
        assert_eq!(drafts[0].variants[0].fulfillment_service, "manual");
        assert!(drafts[0].variants[0].requires_shipping);
        assert_eq!(drafts[0].meta_variations, None);
    }

    #[test]
    fn partitions_by_existing_handle() {
        let existing = vec![stored(1, "mug")];
        let candidates = vec![draft("mug"), draft("cup")];

        let plan = ready(reconcile(7, candidates, &existing, ReconcileOptions::default()));

        assert_eq!(plan.to_create().len(), 1);
        assert_eq!(plan.to_create()[0].handle, "cup");
        assert_eq!(plan.to_create()[0].hub_id, 7);
        let updates = plan.to_update();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "mug");
        assert_eq!(updates[0].1.expected_updated_at, Some(datetime()));
        assert_eq!(plan.ops[0].handle(), "mug");
        assert_eq!(plan.ops[1].handle(), "cup");
    }

    #[test]
    fn reimport_of_same_batch_only_updates() {
        let candidates = vec![draft("mug"), draft("cup")];
        let first = ready(reconcile(
            7,
            candidates.clone(),
            &[],
            ReconcileOptions::default(),
        ));
        assert_eq!(first.to_create().len(), 2);

        let existing = vec![stored(1, "mug"), stored(2, "cup")];
        let second = ready(reconcile(7, candidates, &existing, ReconcileOptions::default()));

        assert!(second.to_create().is_empty());
        assert_eq!(second.to_update().len(), 2);
    }

    #[test]
    fn missing_product_type_without_default_lists_handles() {
        let mut untyped = draft("cup");
        untyped.product_type_id = "  ".to_string();
        let candidates = vec![draft("mug"), untyped];

        let outcome = reconcile(7, candidates, &[], ReconcileOptions::default());

        assert_eq!(
            outcome,
            ReconcileOutcome::NeedsDefaultProductType {
                handles: vec!["cup".to_string()]
            }
        );
    }

    #[test]
    fn default_product_type_backfills_id_and_name() {
        let mut untyped = draft("cup");
        untyped.product_type_id = String::new();
        untyped.product_type = String::new();
        let options = ReconcileOptions {
            default_product_type: Some(default_type()),
            ..ReconcileOptions::default()
        };

        let plan = ready(reconcile(7, vec![untyped, draft("mug")], &[], options));

        let created = plan.to_create();
        assert_eq!(created[0].product_type_id, "9");
        assert_eq!(created[0].product_type, "Posters");
        assert_eq!(created[1].product_type_id, "3");
        assert_eq!(created[1].product_type, "Kitchen");
    }

    #[test]
    fn skip_meta_uses_placeholder_and_overlays_by_handle() {
        let mut with_meta = draft("mug");
        with_meta.meta_variations = None;
        let mut without_meta = draft("cup");
        without_meta.meta_variations = None;
        let overlay = HashMap::from([("mug".to_string(), meta())]);
        let options = ReconcileOptions {
            skip_meta_validation: true,
            meta_variations_by_handle: Some(overlay),
            ..ReconcileOptions::default()
        };

        let plan = ready(reconcile(7, vec![with_meta, without_meta], &[], options));

        let created = plan.to_create();
        assert_eq!(created[0].meta_variations, meta());
        assert_eq!(created[1].meta_variations, MetaVariations::placeholder());
    }

    #[test]
    fn skip_meta_replaces_supplied_meta_without_overlay() {
        let options = ReconcileOptions {
            skip_meta_validation: true,
            ..ReconcileOptions::default()
        };

        let plan = ready(reconcile(7, vec![draft("mug")], &[], options));

        assert_eq!(
            plan.to_create()[0].meta_variations,
            MetaVariations::placeholder()
        );
    }

    #[test]
    fn any_invalid_template_rejects_whole_batch() {
        let mut broken = draft("cup");
        broken.title = String::new();
        broken.variants.clear();

        let outcome = reconcile(7, vec![draft("mug"), broken], &[], ReconcileOptions::default());

        assert_eq!(
            outcome,
            ReconcileOutcome::Invalid {
                errors: vec![
                    "Template 2: Missing title, At least one variant is required".to_string()
                ]
            }
        );
    }

    #[test]
    fn duplicate_handles_in_batch_are_reported() {
        let outcome = reconcile(
            7,
            vec![draft("mug"), draft("cup"), draft("mug")],
            &[],
            ReconcileOptions::default(),
        );

        assert_eq!(
            outcome,
            ReconcileOutcome::Invalid {
                errors: vec!["Template 3: Duplicate handle `mug` in import".to_string()]
            }
        );
    }

    #[test]
    fn handles_differing_in_whitespace_are_distinct_keys() {
        let plan = ready(reconcile(
            7,
            vec![draft(" mug"), draft("mug")],
            &[stored(1, "mug")],
            ReconcileOptions::default(),
        ));

        assert_eq!(plan.to_create().len(), 1);
        assert_eq!(plan.to_create()[0].handle, " mug");
        assert_eq!(plan.to_update().len(), 1);
        assert_eq!(plan.to_update()[0].0, "mug");
    }

    #[test]
    fn duplicate_stored_handles_target_oldest_template() {
        let mut newer = stored(8, "mug");
        newer.updated_at = datetime() + chrono::Duration::days(1);
        let existing = vec![newer, stored(3, "mug")];

        let plan = ready(reconcile(7, vec![draft("mug")], &existing, ReconcileOptions::default()));

        assert_eq!(plan.to_update()[0].1.expected_updated_at, Some(datetime()));
    }

    fn created_from(new_template: &NewProductTemplate, id: i32) -> ProductTemplate {
        ProductTemplate {
            id,
            hub_id: new_template.hub_id,
            title: new_template.title.clone(),
            handle: new_template.handle.clone(),
            images: new_template.images.clone(),
            variants: new_template.variants.clone(),
            body_html: new_template.body_html.clone(),
            vendor: new_template.vendor.clone(),
            product_type: new_template.product_type.clone(),
            product_type_id: new_template.product_type_id.clone(),
            tags: new_template.tags.clone(),
            meta_variations: new_template.meta_variations.clone(),
            template_suffix: new_template.template_suffix.clone(),
            created_at: datetime(),
            updated_at: datetime(),
        }
    }

    #[test]
    fn queue_stops_at_first_failure() {
        let mut writer = MockTemplateWriter::new();
        let written = Arc::new(Mutex::new(Vec::<String>::new()));
        let log = written.clone();

        writer.expect_create_template().returning(move |new_template| {
            if new_template.handle == "cup" {
                return Err(RepositoryError::Database(
                    diesel::result::Error::QueryBuilderError("boom".into()),
                ));
            }
            if let Ok(mut guard) = log.lock() {
                guard.push(new_template.handle.clone());
            }
            Ok(created_from(new_template, 1))
        });

        let plan = ready(reconcile(
            7,
            vec![draft("mug"), draft("cup"), draft("bowl")],
            &[],
            ReconcileOptions::default(),
        ));

        let result = ImportQueue::new(&writer, 7).apply(plan);

        match result {
            Err(ServiceError::ImportInterrupted {
                applied,
                handle,
                reason,
                conflict,
            }) => {
                assert_eq!(applied, 1);
                assert_eq!(handle, "cup");
                assert!(reason.contains("boom"));
                assert!(!conflict);
            }
            other => panic!("expected interruption, got {other:?}"),
        }
        assert_eq!(
            *written.lock().expect("lock"),
            vec!["mug".to_string()]
        );
    }

    #[test]
    fn queue_reports_stale_update_as_conflict() {
        let mut writer = MockTemplateWriter::new();
        writer
            .expect_update_template_by_handle()
            .times(1)
            .returning(|_, _, _| {
                Err(RepositoryError::Conflict(
                    "template `mug` was modified concurrently".to_string(),
                ))
            });
        writer.expect_create_template().never();

        let plan = ready(reconcile(
            7,
            vec![draft("mug"), draft("cup")],
            &[stored(1, "mug")],
            ReconcileOptions::default(),
        ));

        let result = ImportQueue::new(&writer, 7).apply(plan);

        match result {
            Err(ServiceError::ImportInterrupted {
                applied,
                handle,
                reason,
                conflict,
            }) => {
                assert_eq!(applied, 0);
                assert_eq!(handle, "mug");
                assert!(reason.contains("modified concurrently"));
                assert!(conflict);
            }
            other => panic!("expected interruption, got {other:?}"),
        }
    }

    #[test]
    fn queue_counts_creates_and_updates() {
        let mut writer = MockTemplateWriter::new();
        writer
            .expect_create_template()
            .times(1)
            .returning(|new_template| Ok(created_from(new_template, 2)));
        writer
            .expect_update_template_by_handle()
            .times(1)
            .returning(|handle, _, _| {
                assert_eq!(handle, "mug");
                Ok(stored(1, "mug"))
            });

        let plan = ready(reconcile(
            7,
            vec![draft("mug"), draft("cup")],
            &[stored(1, "mug")],
            ReconcileOptions::default(),
        ));

        let counts = ImportQueue::new(&writer, 7).apply(plan).expect("applied");

        assert_eq!(
            counts,
            ImportCounts {
                created: 1,
                updated: 1
            }
        );
    }

    fn user_with_roles(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "user-1".to_string(),
            email: "user@example.com".to_string(),
            hub_id: 7,
            name: "Tester".to_string(),
            roles: roles.iter().map(|role| (*role).to_string()).collect(),
            exp: 0,
        }
    }

    struct FakeRepo {
        template_reader: MockTemplateReader,
        template_writer: MockTemplateWriter,
        product_type_reader: MockProductTypeReader,
    }

    impl FakeRepo {
        fn new() -> Self {
            Self {
                template_reader: MockTemplateReader::new(),
                template_writer: MockTemplateWriter::new(),
                product_type_reader: MockProductTypeReader::new(),
            }
        }
    }

    impl TemplateReader for FakeRepo {
        fn get_template_by_id(
            &self,
            id: i32,
            hub_id: i32,
        ) -> RepositoryResult<Option<ProductTemplate>> {
            self.template_reader.get_template_by_id(id, hub_id)
        }

        fn get_template_by_handle(
            &self,
            handle: &str,
            hub_id: i32,
        ) -> RepositoryResult<Option<ProductTemplate>> {
            self.template_reader.get_template_by_handle(handle, hub_id)
        }

        fn list_templates(
            &self,
            query: TemplateListQuery,
        ) -> RepositoryResult<(usize, Vec<ProductTemplate>)> {
            self.template_reader.list_templates(query)
        }
    }

    impl TemplateWriter for FakeRepo {
        fn create_template(
            &self,
            new_template: &NewProductTemplate,
        ) -> RepositoryResult<ProductTemplate> {
            self.template_writer.create_template(new_template)
        }

        fn update_template_by_handle(
            &self,
            handle: &str,
            hub_id: i32,
            updates: &UpdateProductTemplate,
        ) -> RepositoryResult<ProductTemplate> {
            self.template_writer
                .update_template_by_handle(handle, hub_id, updates)
        }

        fn delete_template(&self, template_id: i32, hub_id: i32) -> RepositoryResult<()> {
            self.template_writer.delete_template(template_id, hub_id)
        }
    }

    impl ProductTypeReader for FakeRepo {
        fn get_product_type_by_id(
            &self,
            id: i32,
            hub_id: i32,
        ) -> RepositoryResult<Option<ProductType>> {
            self.product_type_reader.get_product_type_by_id(id, hub_id)
        }

        fn list_product_types(
            &self,
            query: ProductTypeListQuery,
        ) -> RepositoryResult<(usize, Vec<ProductType>)> {
            self.product_type_reader.list_product_types(query)
        }
    }

    fn upload(templates: &[TemplateDraft]) -> TemplateUpload {
        TemplateUpload {
            templates: serde_json::to_vec(templates).expect("serializable drafts"),
            ..TemplateUpload::default()
        }
    }

    fn posters() -> ProductType {
        ProductType {
            id: 9,
            hub_id: 7,
            name: "Posters".to_string(),
            description: None,
            created_at: datetime(),
            updated_at: datetime(),
        }
    }

    #[test]
    fn import_requires_role() {
        let repo = FakeRepo::new();
        let user = user_with_roles(&["viewer"]);

        let result = import_templates(&repo, &user, upload(&[draft("mug")]));

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn import_without_default_type_writes_nothing() {
        let mut repo = FakeRepo::new();
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);
        let mut untyped = draft("cup");
        untyped.product_type_id = String::new();

        repo.template_reader
            .expect_list_templates()
            .times(1)
            .returning(|_| Ok((0, Vec::new())));
        repo.template_writer.expect_create_template().never();

        let result = import_templates(&repo, &user, upload(&[untyped]));

        match result {
            Err(ServiceError::MissingProductType(handles)) => assert_eq!(handles, vec!["cup"]),
            other => panic!("expected missing product type, got {other:?}"),
        }
    }

    #[test]
    fn import_with_unknown_default_type_is_rejected() {
        let mut repo = FakeRepo::new();
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        repo.product_type_reader
            .expect_get_product_type_by_id()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.template_writer.expect_create_template().never();

        let mut payload = upload(&[draft("mug")]);
        payload.default_product_type_id = Some(42);

        let result = import_templates(&repo, &user, payload);

        assert!(matches!(result, Err(ServiceError::Form(message)) if message.contains("42")));
    }

    #[test]
    fn import_applies_plan_and_reloads() {
        let mut repo = FakeRepo::new();
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);
        let mut untyped = draft("cup");
        untyped.product_type_id = String::new();

        repo.product_type_reader
            .expect_get_product_type_by_id()
            .times(1)
            .withf(|id, hub_id| *id == 9 && *hub_id == 7)
            .returning(|_, _| Ok(Some(posters())));

        let mut listed = 0;
        repo.template_reader
            .expect_list_templates()
            .times(2)
            .returning(move |_| {
                listed += 1;
                if listed == 1 {
                    Ok((1, vec![stored(1, "mug")]))
                } else {
                    Ok((2, vec![stored(1, "mug"), stored(2, "cup")]))
                }
            });
        repo.template_writer
            .expect_update_template_by_handle()
            .times(1)
            .returning(|_, _, _| Ok(stored(1, "mug")));
        repo.template_writer
            .expect_create_template()
            .times(1)
            .withf(|new_template| {
                assert_eq!(new_template.product_type_id, "9");
                true
            })
            .returning(|new_template| Ok(created_from(new_template, 2)));

        let mut payload = upload(&[draft("mug"), untyped]);
        payload.default_product_type_id = Some(9);

        let summary = import_templates(&repo, &user, payload).expect("import succeeds");

        assert_eq!(summary.created, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.templates.len(), 2);
    }

    #[test]
    fn import_rejects_empty_file() {
        let repo = FakeRepo::new();
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        let result = import_templates(&repo, &user, upload(&[]));

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn preview_reports_status_type_and_meta() {
        let mut unknown = draft("cup");
        unknown.product_type_id = "77".to_string();
        unknown.meta_variations = None;
        let mut known = draft("mug");
        known.product_type_id = "9".to_string();
        known.vendor = String::new();

        let rows = build_preview(&[known, unknown], &[stored(1, "mug")], &[posters()], false);

        assert_eq!(rows[0].status, PreviewStatus::WillUpdate);
        assert_eq!(rows[0].product_type_name, "Posters");
        assert_eq!(rows[0].issues, vec!["Missing vendor"]);
        assert_eq!(rows[0].meta, MetaStatus::Present);
        assert_eq!(rows[1].status, PreviewStatus::New);
        assert_eq!(rows[1].product_type_name, "Unknown Type");
        assert!(rows[1].issues.is_empty());
        assert_eq!(rows[1].meta, MetaStatus::Missing);
    }

    #[test]
    fn preview_marks_meta_as_skipped() {
        let rows = build_preview(&[draft("mug")], &[], &[], true);

        assert_eq!(rows[0].meta, MetaStatus::Skipped);
    }

    #[test]
    fn export_without_templates_fails() {
        let mut repo = FakeRepo::new();
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);
        repo.template_reader
            .expect_list_templates()
            .returning(|_| Ok((0, Vec::new())));

        let result = export_templates(&repo, &user);

        assert!(matches!(result, Err(ServiceError::Form(message)) if message == "No templates to export"));
    }

    #[test]
    fn export_output_can_be_imported_again() {
        let mut repo = FakeRepo::new();
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);
        repo.template_reader
            .expect_list_templates()
            .returning(|_| Ok((2, vec![stored(1, "mug"), stored(2, "cup")])));

        let json = export_templates(&repo, &user).expect("export succeeds");
        let drafts = parse_templates_json(json.as_bytes()).expect("exported JSON parses");

        assert!(json.contains('\n'));
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0], TemplateDraft::from(stored(1, "mug")));
    }
}
