pub mod auth_button;
pub mod dashboard;
pub mod handlers;
pub mod header;
pub mod results;
pub mod review_queue;
pub mod upload_section;
pub mod utils;
