pub mod account_service;
pub mod address_service;
pub mod auth_service;
pub mod category_service;
pub mod settings_service;
