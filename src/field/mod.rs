pub mod attribute_cache;
pub mod collector;
pub mod field_model;
pub mod normalize;
