use diesel::prelude::*;

use crate::{
    domain::product_type::{
        NewProductType as DomainNewProductType, ProductType as DomainProductType,
        ProductTypeListQuery, UpdateProductType as DomainUpdateProductType,
    },
    models::product_type::{
        NewProductType as DbNewProductType, ProductType as DbProductType,
        UpdateProductType as DbUpdateProductType,
    },
    repository::{
        DieselRepository, ProductTypeReader, ProductTypeWriter, RepositoryError, RepositoryResult,
        page_window,
    },
};

impl ProductTypeReader for DieselRepository {
    fn get_product_type_by_id(
        &self,
        id: i32,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainProductType>> {
        use crate::schema::product_types;

        let mut conn = self.conn()?;
        let product_type = product_types::table
            .find(id)
            .filter(product_types::hub_id.eq(hub_id))
            .first::<DbProductType>(&mut conn)
            .optional()?;

        Ok(product_type.map(Into::into))
    }

    fn list_product_types(
        &self,
        query: ProductTypeListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainProductType>)> {
        use crate::schema::product_types;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = product_types::table
                .filter(product_types::hub_id.eq(query.hub_id))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(term) = query.search.as_ref() {
                items = items.filter(product_types::name.like(format!("%{term}%")));
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();

        if let Some(pagination) = &query.pagination {
            let (offset, limit) = page_window(pagination);
            items = items.offset(offset).limit(limit);
        }

        let db_types = items
            .order((product_types::name.asc(), product_types::id.asc()))
            .load::<DbProductType>(&mut conn)?;

        Ok((total, db_types.into_iter().map(Into::into).collect()))
    }
}

impl ProductTypeWriter for DieselRepository {
    fn create_product_type(
        &self,
        new_type: &DomainNewProductType,
    ) -> RepositoryResult<DomainProductType> {
        use crate::schema::product_types;

        let mut conn = self.conn()?;
        let db_new = DbNewProductType::from(new_type);

        let created = diesel::insert_into(product_types::table)
            .values(&db_new)
            .get_result::<DbProductType>(&mut conn)?;

        Ok(created.into())
    }

    fn update_product_type(
        &self,
        type_id: i32,
        hub_id: i32,
        updates: &DomainUpdateProductType,
    ) -> RepositoryResult<DomainProductType> {
        use crate::schema::product_types;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateProductType::from(updates);

        let target = product_types::table
            .filter(product_types::id.eq(type_id))
            .filter(product_types::hub_id.eq(hub_id));

        let updated = diesel::update(target)
            .set(&db_updates)
            .get_result::<DbProductType>(&mut conn)?;

        Ok(updated.into())
    }

    // Templates keep their `product_type_id`; no cascade.
    fn delete_product_type(&self, type_id: i32, hub_id: i32) -> RepositoryResult<()> {
        use crate::schema::product_types;

        let mut conn = self.conn()?;

        let target = product_types::table
            .filter(product_types::id.eq(type_id))
            .filter(product_types::hub_id.eq(hub_id));

        let deleted = diesel::delete(target).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
