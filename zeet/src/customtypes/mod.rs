//! String-backed attribute types with their own validation and equality

pub mod json;
pub mod uuid;
