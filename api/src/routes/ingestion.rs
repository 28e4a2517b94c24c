pub mod ingestion_status_route;
