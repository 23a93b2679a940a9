// Domain keyword dictionaries: per-category keyword lists and their stems.

pub mod library;
pub mod stem;
pub mod store;
