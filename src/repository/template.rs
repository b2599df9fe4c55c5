use diesel::prelude::*;

use crate::{
    domain::template::{
        NewProductTemplate as DomainNewTemplate, ProductTemplate as DomainTemplate,
        TemplateListQuery, TemplateSort, UpdateProductTemplate as DomainUpdateTemplate,
    },
    models::template::{
        NewProductTemplate as DbNewTemplate, ProductTemplate as DbTemplate,
        UpdateProductTemplate as DbUpdateTemplate,
    },
    repository::{
        DieselRepository, RepositoryError, RepositoryResult, TemplateReader, TemplateWriter,
        page_window,
    },
};

impl TemplateReader for DieselRepository {
    fn get_template_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<DomainTemplate>> {
        use crate::schema::product_templates;

        let mut conn = self.conn()?;
        let template = product_templates::table
            .find(id)
            .filter(product_templates::hub_id.eq(hub_id))
            .first::<DbTemplate>(&mut conn)
            .optional()?;

        match template {
            Some(template) => Ok(Some(template.try_into()?)),
            None => Ok(None),
        }
    }

    fn get_template_by_handle(
        &self,
        handle: &str,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainTemplate>> {
        use crate::schema::product_templates;

        let mut conn = self.conn()?;
        let template = product_templates::table
            .filter(product_templates::hub_id.eq(hub_id))
            .filter(product_templates::handle.eq(handle))
            .order(product_templates::id.asc())
            .first::<DbTemplate>(&mut conn)
            .optional()?;

        match template {
            Some(template) => Ok(Some(template.try_into()?)),
            None => Ok(None),
        }
    }

    fn list_templates(
        &self,
        query: TemplateListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainTemplate>)> {
        use crate::schema::product_templates;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = product_templates::table
                .filter(product_templates::hub_id.eq(query.hub_id))
                .into_boxed::<diesel::sqlite::Sqlite>();

            // SQLite LIKE is case-insensitive for ASCII.
            if let Some(term) = query.search.as_ref() {
                let pattern = format!("%{term}%");
                items = items.filter(
                    product_templates::title
                        .like(pattern.clone())
                        .or(product_templates::product_type.like(pattern.clone()))
                        .or(product_templates::vendor.like(pattern)),
                );
            }

            if let Some(product_type_id) = query.product_type_id.as_ref() {
                items = items.filter(product_templates::product_type_id.eq(product_type_id));
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();

        items = match query.sort {
            TemplateSort::Newest => items.order((
                product_templates::updated_at.desc(),
                product_templates::id.desc(),
            )),
            TemplateSort::Oldest => items.order((
                product_templates::updated_at.asc(),
                product_templates::id.asc(),
            )),
            TemplateSort::TitleAsc => {
                items.order((product_templates::title.asc(), product_templates::id.asc()))
            }
            TemplateSort::TitleDesc => {
                items.order((product_templates::title.desc(), product_templates::id.desc()))
            }
        };

        if let Some(pagination) = &query.pagination {
            let (offset, limit) = page_window(pagination);
            items = items.offset(offset).limit(limit);
        }

        let db_templates = items.load::<DbTemplate>(&mut conn)?;

        let templates = db_templates
            .into_iter()
            .map(DomainTemplate::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total, templates))
    }
}

impl TemplateWriter for DieselRepository {
    fn create_template(&self, new_template: &DomainNewTemplate) -> RepositoryResult<DomainTemplate> {
        use crate::schema::product_templates;

        let mut conn = self.conn()?;
        let db_new = DbNewTemplate::try_from(new_template)?;

        let created = diesel::insert_into(product_templates::table)
            .values(&db_new)
            .get_result::<DbTemplate>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_template_by_handle(
        &self,
        handle: &str,
        hub_id: i32,
        updates: &DomainUpdateTemplate,
    ) -> RepositoryResult<DomainTemplate> {
        use crate::schema::product_templates;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateTemplate::try_from(updates)?;

        conn.transaction::<DomainTemplate, RepositoryError, _>(|conn| {
            let current = product_templates::table
                .filter(product_templates::hub_id.eq(hub_id))
                .filter(product_templates::handle.eq(handle))
                .order(product_templates::id.asc())
                .first::<DbTemplate>(conn)?;

            if let Some(expected) = updates.expected_updated_at {
                if current.updated_at != expected {
                    return Err(RepositoryError::Conflict(format!(
                        "template `{handle}` was changed at {}",
                        current.updated_at
                    )));
                }
            }

            // The version guard also catches writers that bypass the check above.
            let target = product_templates::table
                .filter(product_templates::id.eq(current.id))
                .filter(product_templates::updated_at.eq(current.updated_at));

            let updated = diesel::update(target)
                .set(&db_updates)
                .get_result::<DbTemplate>(conn)
                .optional()?;

            match updated {
                Some(row) => {
                    let template: DomainTemplate = row.try_into()?;
                    Ok(template)
                }
                None => Err(RepositoryError::Conflict(format!(
                    "template `{handle}` was changed during the update"
                ))),
            }
        })
    }

    fn delete_template(&self, template_id: i32, hub_id: i32) -> RepositoryResult<()> {
        use crate::schema::product_templates;

        let mut conn = self.conn()?;

        let target = product_templates::table
            .filter(product_templates::id.eq(template_id))
            .filter(product_templates::hub_id.eq(hub_id));

        let deleted = diesel::delete(target).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
