use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{baskets, catalogs, product_images, product_reviews, products, users};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Catalog {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub preview: Option<String>,
    pub softdelete: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub cost: Decimal,
    pub quantity: i32,
    pub discount: i32,
    pub preview: Option<String>,
    pub softdelete: bool,
    pub catalog_id: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub image: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductReview {
    pub id: i32,
    pub product_id: i32,
    pub created_at: DateTime<Utc>,
    pub review: String,
    pub star: Decimal,
    pub reviewer_id: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Basket {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub product_id: i32,
    pub quantity: i32,
    pub discount: i32,
    pub cost: Decimal,
    pub session_key: String,
    pub user_id: i32,
    pub ordered: bool,
    pub softdelete: bool,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<catalogs::Model> for Catalog {
    fn from(model: catalogs::Model) -> Self {
        Self {
            id: model.id,
            created_at: model.created_at.with_timezone(&Utc),
            name: model.name,
            description: model.description,
            preview: model.preview,
            softdelete: model.softdelete,
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            created_at: model.created_at.with_timezone(&Utc),
            name: model.name,
            description: model.description,
            cost: model.cost,
            quantity: model.quantity,
            discount: model.discount,
            preview: model.preview,
            softdelete: model.softdelete,
            catalog_id: model.catalog_id,
        }
    }
}

impl From<product_reviews::Model> for ProductReview {
    fn from(model: product_reviews::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            created_at: model.created_at.with_timezone(&Utc),
            review: model.review,
            star: model.star,
            reviewer_id: model.reviewer_id,
        }
    }
}

impl From<baskets::Model> for Basket {
    fn from(model: baskets::Model) -> Self {
        Self {
            id: model.id,
            created_at: model.created_at.with_timezone(&Utc),
            product_id: model.product_id,
            quantity: model.quantity,
            discount: model.discount,
            cost: model.cost,
            session_key: model.session_key,
            user_id: model.user_id,
            ordered: model.ordered,
            softdelete: model.softdelete,
        }
    }
}

impl ProductImage {
    pub fn from_entity(model: product_images::Model, url: String) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            image: model.image,
            url,
        }
    }
}
