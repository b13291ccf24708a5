//! Derived, read-only columns shown by the admin list and detail screens.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::{catalogs, product_reviews, products, users};

const SHORT_TEXT_LIMIT: usize = 48;
const SHORT_TEXT_KEEP: usize = 45;
const LABEL_TEXT_LIMIT: usize = 100;

pub const RATING_UNIT: &str = "stars";
pub const NO_REVIEWS: &str = "no reviews yet";

/// Shorten free text for a list column: kept as-is under 48 characters, otherwise the
/// first 45 characters and `...`.
pub fn short_text(text: &str) -> String {
    if text.chars().count() < SHORT_TEXT_LIMIT {
        return text.to_string();
    }
    let head: String = text.chars().take(SHORT_TEXT_KEEP).collect();
    format!("{head}...")
}

/// Average star rating of a product as shown in the admin.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AverageRating {
    /// Mean of all review stars rounded to one decimal place; `null` when there are no reviews.
    #[schema(value_type = Option<String>)]
    pub value: Option<Decimal>,
    pub display: String,
}

impl AverageRating {
    pub fn from_avg(avg: Option<Decimal>) -> Self {
        match avg {
            Some(avg) => {
                let value = avg.round_dp(1);
                Self {
                    value: Some(value),
                    display: format!("{value} {RATING_UNIT}"),
                }
            }
            None => Self {
                value: None,
                display: NO_REVIEWS.to_string(),
            },
        }
    }
}

pub fn catalog_label(catalog: &catalogs::Model) -> String {
    catalog.name.clone()
}

pub fn product_label(product: &products::Model) -> String {
    format!(
        "(id={}) {} (c={}, (q={}), (d={}))",
        product.id, product.name, product.cost, product.quantity, product.discount
    )
}

pub fn review_label(review: &product_reviews::Model, reviewer: &users::Model) -> String {
    let text = if review.review.chars().count() > LABEL_TEXT_LIMIT {
        let head: String = review.review.chars().take(LABEL_TEXT_LIMIT).collect();
        format!("{head}...")
    } else {
        review.review.clone()
    };
    format!("{text} - {} - star {}", user_label(reviewer), review.star)
}

pub fn basket_label(product: &products::Model) -> String {
    product.name.clone()
}

pub fn user_label(user: &users::Model) -> String {
    user.email.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn short_text_keeps_text_under_limit() {
        assert_eq!(short_text(""), "");
        let text = "a".repeat(47);
        assert_eq!(short_text(&text), text);
    }

    #[test]
    fn short_text_cuts_at_limit() {
        let text = "b".repeat(48);
        let short = short_text(&text);
        assert_eq!(short, format!("{}...", "b".repeat(45)));
        assert_eq!(short.chars().count(), 48);
    }

    #[test]
    fn short_text_counts_characters_not_bytes() {
        let text = "ж".repeat(47);
        assert_eq!(short_text(&text), text);
        let long = "ж".repeat(60);
        assert_eq!(short_text(&long), format!("{}...", "ж".repeat(45)));
    }

    #[test]
    fn rating_is_rounded_to_one_place() {
        let avg = (dec("4") + dec("5") + dec("5")) / dec("3");
        let rating = AverageRating::from_avg(Some(avg));
        assert_eq!(rating.value, Some(dec("4.7")));
        assert_eq!(rating.display, "4.7 stars");
    }

    #[test]
    fn rating_rounds_half_to_even() {
        assert_eq!(AverageRating::from_avg(Some(dec("4.25"))).value, Some(dec("4.2")));
        assert_eq!(AverageRating::from_avg(Some(dec("4.35"))).value, Some(dec("4.4")));
    }

    #[test]
    fn rating_without_reviews_is_a_defined_state() {
        let rating = AverageRating::from_avg(None);
        assert_eq!(rating.value, None);
        assert_eq!(rating.display, NO_REVIEWS);
    }

    #[test]
    fn product_label_lists_cost_quantity_discount() {
        let product = products::Model {
            id: 7,
            created_at: Utc::now().into(),
            name: "Mug".into(),
            description: String::new(),
            cost: dec("100.00"),
            quantity: 5,
            discount: 10,
            preview: None,
            softdelete: false,
            catalog_id: 1,
        };
        assert_eq!(product_label(&product), "(id=7) Mug (c=100.00, (q=5), (d=10))");
    }

    #[test]
    fn review_label_cuts_long_text() {
        let reviewer = users::Model {
            id: 1,
            email: "ann@example.com".into(),
            password_hash: String::new(),
            role: "user".into(),
            created_at: Utc::now().into(),
        };
        let review = product_reviews::Model {
            id: 1,
            product_id: 1,
            created_at: Utc::now().into(),
            review: "x".repeat(120),
            star: dec("4.50"),
            reviewer_id: 1,
        };
        let label = review_label(&review, &reviewer);
        assert_eq!(
            label,
            format!("{}... - ann@example.com - star 4.50", "x".repeat(100))
        );
    }
}
