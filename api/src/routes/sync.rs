pub mod sync_response;
pub mod sync_route;
pub mod sync_status_route;
