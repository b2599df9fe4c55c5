use diesel::prelude::*;

use crate::{
    domain::generated_product::{
        GeneratedProduct as DomainGeneratedProduct, GeneratedProductListQuery,
        NewGeneratedProduct as DomainNewGeneratedProduct,
    },
    models::generated_product::{
        GeneratedProduct as DbGeneratedProduct, NewGeneratedProduct as DbNewGeneratedProduct,
    },
    repository::{
        DieselRepository, GeneratedProductReader, GeneratedProductWriter, RepositoryError,
        RepositoryResult, page_window,
    },
};

impl GeneratedProductReader for DieselRepository {
    fn get_generated_product_by_id(
        &self,
        id: &str,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainGeneratedProduct>> {
        use crate::schema::generated_products;

        let mut conn = self.conn()?;
        let product = generated_products::table
            .find(id)
            .filter(generated_products::hub_id.eq(hub_id))
            .first::<DbGeneratedProduct>(&mut conn)
            .optional()?;

        match product {
            Some(product) => Ok(Some(product.try_into()?)),
            None => Ok(None),
        }
    }

    fn list_generated_products(
        &self,
        query: GeneratedProductListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainGeneratedProduct>)> {
        use crate::schema::generated_products;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = generated_products::table
                .filter(generated_products::hub_id.eq(query.hub_id))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(template_id) = query.template_id {
                items = items.filter(generated_products::template_id.eq(template_id));
            }

            if let Some(product_type_id) = query.product_type_id.as_ref() {
                items = items.filter(generated_products::product_type_id.eq(product_type_id));
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder().order((
            generated_products::created_at.desc(),
            generated_products::id.desc(),
        ));

        if let Some(pagination) = &query.pagination {
            let (offset, limit) = page_window(pagination);
            items = items.offset(offset).limit(limit);
        }

        let products = items
            .load::<DbGeneratedProduct>(&mut conn)?
            .into_iter()
            .map(DomainGeneratedProduct::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total, products))
    }
}

impl GeneratedProductWriter for DieselRepository {
    fn create_generated_product(
        &self,
        new_product: &DomainNewGeneratedProduct,
    ) -> RepositoryResult<DomainGeneratedProduct> {
        use crate::schema::generated_products;

        let mut conn = self.conn()?;
        let db_new = DbNewGeneratedProduct::try_from(new_product)?;

        let created = diesel::insert_into(generated_products::table)
            .values(&db_new)
            .get_result::<DbGeneratedProduct>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn delete_generated_product(&self, id: &str, hub_id: i32) -> RepositoryResult<()> {
        use crate::schema::generated_products;

        let mut conn = self.conn()?;

        let target = generated_products::table
            .filter(generated_products::id.eq(id))
            .filter(generated_products::hub_id.eq(hub_id));

        let deleted = diesel::delete(target).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
