use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{Basket, Product},
    validation::{Errors, SESSION_KEY_MAX_LEN},
};

pub const COST_DIGITS: u32 = 10;
pub const COST_PLACES: u32 = 2;

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBasketRequest {
    pub product_id: i32,
    pub user_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub discount: i32,
    #[schema(value_type = String, example = "100.00")]
    pub cost: Decimal,
    #[serde(default)]
    pub session_key: String,
    #[serde(default)]
    pub ordered: bool,
}

impl CreateBasketRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Errors::new();
        errors.at_least_one("quantity", self.quantity);
        errors.non_negative("discount", self.discount);
        errors.decimal("cost", self.cost, COST_DIGITS, COST_PLACES, false);
        errors.max_len("session_key", &self.session_key, SESSION_KEY_MAX_LEN);
        errors.finish()
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBasketRequest {
    pub product_id: Option<i32>,
    pub user_id: Option<i32>,
    pub quantity: Option<i32>,
    pub discount: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub cost: Option<Decimal>,
    pub session_key: Option<String>,
    pub ordered: Option<bool>,
    pub softdelete: Option<bool>,
}

impl UpdateBasketRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Errors::new();
        if let Some(quantity) = self.quantity {
            errors.at_least_one("quantity", quantity);
        }
        if let Some(discount) = self.discount {
            errors.non_negative("discount", discount);
        }
        if let Some(cost) = self.cost {
            errors.decimal("cost", cost, COST_DIGITS, COST_PLACES, false);
        }
        if let Some(session_key) = &self.session_key {
            errors.max_len("session_key", session_key, SESSION_KEY_MAX_LEN);
        }
        errors.finish()
    }
}

/// One row of the basket list screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct BasketRow {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub product_id: i32,
    pub get_product: String,
    pub quantity: i32,
    pub discount: i32,
    #[schema(value_type = String)]
    pub cost: Decimal,
    pub user_id: i32,
    pub user: String,
    pub session_key: String,
    pub ordered: bool,
    pub softdelete: bool,
    /// Display label of the basket record.
    pub label: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct BasketList {
    #[schema(value_type = Vec<BasketRow>)]
    pub items: Vec<BasketRow>,
}

/// Line added by a signed-in shopper.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToBasketRequest {
    pub product_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BasketItemDto {
    pub basket: Basket,
    pub product: Product,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserBasketList {
    #[schema(value_type = Vec<BasketItemDto>)]
    pub items: Vec<BasketItemDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults() {
        let req: CreateBasketRequest = serde_json::from_value(serde_json::json!({
            "product_id": 1,
            "user_id": 1,
            "cost": "9.99"
        }))
        .unwrap();
        assert_eq!(req.quantity, 1);
        assert_eq!(req.discount, 0);
        assert!(!req.ordered);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn session_key_is_bounded() {
        let req = UpdateBasketRequest {
            session_key: Some("s".repeat(33)),
            quantity: Some(0),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
