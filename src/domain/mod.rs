pub mod generated_product;
pub mod product_type;
pub mod template;
