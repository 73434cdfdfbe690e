pub mod app_state;
pub mod extractors;
pub mod server_error;
