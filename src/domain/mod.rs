pub mod category;
pub mod image;
pub mod product;
pub mod product_type;
