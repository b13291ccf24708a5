use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    display::AverageRating,
    dto::reviews::ReviewRow,
    error::AppResult,
    models::{Product, ProductImage},
    validation::{Errors, NAME_MAX_LEN},
};

pub const COST_DIGITS: u32 = 8;
pub const COST_PLACES: u32 = 2;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub catalog_id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[schema(value_type = String, example = "100.00")]
    pub cost: Decimal,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub discount: i32,
}

impl CreateProductRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Errors::new();
        errors.name("name", &self.name, NAME_MAX_LEN);
        errors.decimal("cost", self.cost, COST_DIGITS, COST_PLACES, false);
        errors.non_negative("quantity", self.quantity);
        errors.non_negative("discount", self.discount);
        errors.finish()
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub catalog_id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub cost: Option<Decimal>,
    pub quantity: Option<i32>,
    pub discount: Option<i32>,
    pub softdelete: Option<bool>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Errors::new();
        if let Some(name) = &self.name {
            errors.name("name", name, NAME_MAX_LEN);
        }
        if let Some(cost) = self.cost {
            errors.decimal("cost", cost, COST_DIGITS, COST_PLACES, false);
        }
        if let Some(quantity) = self.quantity {
            errors.non_negative("quantity", quantity);
        }
        if let Some(discount) = self.discount {
            errors.non_negative("discount", discount);
        }
        errors.finish()
    }
}

/// One row of the product list screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductRow {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub catalog_id: i32,
    pub catalog: String,
    pub name: String,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub cost: Decimal,
    pub description_short: String,
    pub discount: i32,
    pub get_stars: AverageRating,
    pub softdelete: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductRow>)]
    pub items: Vec<ProductRow>,
}

/// Product edit screen with its inline reviews and images.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub catalog: String,
    pub preview_url: Option<String>,
    pub rating: AverageRating,
    pub reviews: Vec<ReviewRow>,
    pub images: Vec<ProductImage>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductImageList {
    #[schema(value_type = Vec<ProductImage>)]
    pub items: Vec<ProductImage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn create_defaults_counts_to_zero() {
        let req: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "catalog_id": 1,
            "name": "Mug",
            "cost": "100.00"
        }))
        .unwrap();
        assert_eq!(req.quantity, 0);
        assert_eq!(req.discount, 0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_reports_all_bad_fields() {
        let req = CreateProductRequest {
            catalog_id: 1,
            name: String::new(),
            description: String::new(),
            cost: Decimal::new(-100, 2),
            quantity: -1,
            discount: 0,
        };
        match req.validate() {
            Err(AppError::Validation(fields)) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, ["name", "cost", "quantity"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_cost_fails_to_parse() {
        let parsed = serde_json::from_value::<CreateProductRequest>(serde_json::json!({
            "catalog_id": 1,
            "name": "Mug"
        }));
        assert!(parsed.is_err());
    }
}
