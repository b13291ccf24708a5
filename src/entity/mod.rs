pub mod audit_logs;
pub mod baskets;
pub mod catalogs;
pub mod product_images;
pub mod product_reviews;
pub mod products;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use baskets::Entity as Baskets;
pub use catalogs::Entity as Catalogs;
pub use product_images::Entity as ProductImages;
pub use product_reviews::Entity as ProductReviews;
pub use products::Entity as Products;
pub use users::Entity as Users;
