pub mod error_mapper;
pub mod json_extractor;
