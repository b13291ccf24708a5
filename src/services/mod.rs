pub mod admin_service;
pub mod auth_service;
pub mod basket_service;
pub mod catalog_service;
pub mod product_service;
pub mod review_service;
pub mod user_service;
