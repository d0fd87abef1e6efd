pub mod admin_api;
pub mod api;
pub mod proxy;
