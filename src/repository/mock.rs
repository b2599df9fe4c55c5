use mockall::mock;

use super::{
    GeneratedProductReader, GeneratedProductWriter, ProductTypeReader, ProductTypeWriter,
    RepositoryResult, TemplateReader, TemplateWriter,
};
use crate::domain::{
    generated_product::{GeneratedProduct, GeneratedProductListQuery, NewGeneratedProduct},
    product_type::{NewProductType, ProductType, ProductTypeListQuery, UpdateProductType},
    template::{NewProductTemplate, ProductTemplate, TemplateListQuery, UpdateProductTemplate},
};

mock! {
    pub ProductTypeReader {}

    impl ProductTypeReader for ProductTypeReader {
        fn get_product_type_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<ProductType>>;
        fn list_product_types(&self, query: ProductTypeListQuery) -> RepositoryResult<(usize, Vec<ProductType>)>;
    }
}

mock! {
    pub ProductTypeWriter {}

    impl ProductTypeWriter for ProductTypeWriter {
        fn create_product_type(&self, new_type: &NewProductType) -> RepositoryResult<ProductType>;
        fn update_product_type(&self, type_id: i32, hub_id: i32, updates: &UpdateProductType) -> RepositoryResult<ProductType>;
        fn delete_product_type(&self, type_id: i32, hub_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub TemplateReader {}

    impl TemplateReader for TemplateReader {
        fn get_template_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<ProductTemplate>>;
        fn get_template_by_handle(&self, handle: &str, hub_id: i32) -> RepositoryResult<Option<ProductTemplate>>;
        fn list_templates(&self, query: TemplateListQuery) -> RepositoryResult<(usize, Vec<ProductTemplate>)>;
    }
}

mock! {
    pub TemplateWriter {}

    impl TemplateWriter for TemplateWriter {
        fn create_template(&self, new_template: &NewProductTemplate) -> RepositoryResult<ProductTemplate>;
        fn update_template_by_handle(&self, handle: &str, hub_id: i32, updates: &UpdateProductTemplate) -> RepositoryResult<ProductTemplate>;
        fn delete_template(&self, template_id: i32, hub_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub GeneratedProductReader {}

    impl GeneratedProductReader for GeneratedProductReader {
        fn get_generated_product_by_id(&self, id: &str, hub_id: i32) -> RepositoryResult<Option<GeneratedProduct>>;
        fn list_generated_products(&self, query: GeneratedProductListQuery) -> RepositoryResult<(usize, Vec<GeneratedProduct>)>;
    }
}

mock! {
    pub GeneratedProductWriter {}

    impl GeneratedProductWriter for GeneratedProductWriter {
        fn create_generated_product(&self, new_product: &NewGeneratedProduct) -> RepositoryResult<GeneratedProduct>;
        fn delete_generated_product(&self, id: &str, hub_id: i32) -> RepositoryResult<()>;
    }
}
