pub mod fields;
pub mod payload;
