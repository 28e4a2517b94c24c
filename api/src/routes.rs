pub mod ask;
pub mod health;
pub mod index_route;
pub mod ingestion;
pub mod sync;
pub mod upload;
