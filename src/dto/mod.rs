pub mod admin;
pub mod auth;
pub mod baskets;
pub mod catalogs;
pub mod products;
pub mod reviews;
pub mod users;
