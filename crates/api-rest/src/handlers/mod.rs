pub(crate) mod collections;
pub mod domain;
pub mod queries;
