use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, validation::Errors};

pub fn default_star() -> Decimal {
    Decimal::from(5)
}

fn check_star(errors: &mut Errors, star: Decimal) {
    errors.decimal("star", star, 5, 2, false);
    errors.range("star", star, Decimal::ZERO, default_star());
}

/// Review written from the product edit screen; the product comes from the path.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InlineReviewRequest {
    pub reviewer_id: i32,
    #[serde(default)]
    pub review: String,
    #[serde(default = "default_star")]
    #[schema(value_type = String, example = "5")]
    pub star: Decimal,
}

impl InlineReviewRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Errors::new();
        check_star(&mut errors, self.star);
        errors.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub product_id: i32,
    pub reviewer_id: i32,
    #[serde(default)]
    pub review: String,
    #[serde(default = "default_star")]
    #[schema(value_type = String, example = "5")]
    pub star: Decimal,
}

impl CreateReviewRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Errors::new();
        check_star(&mut errors, self.star);
        errors.finish()
    }
}

/// Partial review edit; omitted fields keep their stored values.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub reviewer_id: Option<i32>,
    pub review: Option<String>,
    #[schema(value_type = Option<String>)]
    pub star: Option<Decimal>,
}

impl UpdateReviewRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Errors::new();
        if let Some(star) = self.star {
            check_star(&mut errors, star);
        }
        errors.finish()
    }
}

/// One row of the review list screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewRow {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub product_id: i32,
    pub review_short: String,
    #[schema(value_type = String)]
    pub star: Decimal,
    pub reviewer_id: i32,
    pub reviewer: String,
    pub get_product: String,
    /// Display label of the review record.
    pub label: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ReviewList {
    #[schema(value_type = Vec<ReviewRow>)]
    pub items: Vec<ReviewRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_defaults_to_five() {
        let req: CreateReviewRequest = serde_json::from_value(serde_json::json!({
            "product_id": 1,
            "reviewer_id": 2
        }))
        .unwrap();
        assert_eq!(req.star, Decimal::from(5));
        assert_eq!(req.review, "");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn star_outside_scale_is_rejected() {
        let req = UpdateReviewRequest {
            star: Some(Decimal::from(6)),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        let req = UpdateReviewRequest {
            star: Some(Decimal::new(4125, 3)),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn omitted_fields_stay_unset_on_edit() {
        let req: UpdateReviewRequest =
            serde_json::from_value(serde_json::json!({ "review": "Chipped" })).unwrap();
        assert_eq!(req.review.as_deref(), Some("Chipped"));
        assert_eq!(req.star, None);
        assert_eq!(req.reviewer_id, None);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn reviewer_is_required() {
        let parsed = serde_json::from_value::<CreateReviewRequest>(serde_json::json!({
            "product_id": 1
        }));
        assert!(parsed.is_err());
    }
}
