pub mod category;
pub mod product;
pub mod product_type;
pub mod product_type_link;
