//! Field checks shared by the admin forms. Each check appends to a list so that one request
//! reports every bad field at once.

use rust_decimal::Decimal;

use crate::error::{AppError, AppResult, FieldError};

pub const NAME_MAX_LEN: usize = 100;
pub const SESSION_KEY_MAX_LEN: usize = 32;

#[derive(Debug, Default)]
pub struct Errors(Vec<FieldError>);

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Required, non-blank, at most `max` characters.
    pub fn name(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.add(field, "this field is required");
        } else if value.chars().count() > max {
            self.add(field, format!("ensure this value has at most {max} characters"));
        }
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("ensure this value has at most {max} characters"));
        }
    }

    /// Fixed-point value fitting `NUMERIC(max_digits, places)`, optionally non-negative.
    pub fn decimal(
        &mut self,
        field: &str,
        value: Decimal,
        max_digits: u32,
        places: u32,
        allow_negative: bool,
    ) {
        if !allow_negative && value.is_sign_negative() && !value.is_zero() {
            self.add(field, "ensure this value is greater than or equal to 0");
            return;
        }
        let normalized = value.normalize();
        if normalized.scale() > places {
            self.add(
                field,
                format!("ensure that there are no more than {places} decimal places"),
            );
            return;
        }
        let limit = Decimal::from(10_i64.pow(max_digits - places));
        if value.abs() >= limit {
            self.add(
                field,
                format!(
                    "ensure that there are no more than {} digits before the decimal point",
                    max_digits - places
                ),
            );
        }
    }

    pub fn range(&mut self, field: &str, value: Decimal, min: Decimal, max: Decimal) {
        if value < min || value > max {
            self.add(field, format!("ensure this value is between {min} and {max}"));
        }
    }

    pub fn non_negative(&mut self, field: &str, value: i32) {
        if value < 0 {
            self.add(field, "ensure this value is greater than or equal to 0");
        }
    }

    pub fn at_least_one(&mut self, field: &str, value: i32) {
        if value < 1 {
            self.add(field, "ensure this value is greater than or equal to 1");
        }
    }

    pub fn finish(self) -> AppResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn fields(result: AppResult<()>) -> Vec<String> {
        match result {
            Ok(()) => vec![],
            Err(AppError::Validation(errors)) => errors.into_iter().map(|e| e.field).collect(),
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn names_are_required_and_bounded() {
        let mut errors = Errors::new();
        errors.name("name", "  ", NAME_MAX_LEN);
        errors.name("title", &"x".repeat(101), NAME_MAX_LEN);
        errors.name("ok", "Mugs", NAME_MAX_LEN);
        assert_eq!(fields(errors.finish()), vec!["name", "title"]);
    }

    #[test]
    fn cost_must_fit_numeric_8_2() {
        let check = |raw: &str| {
            let mut errors = Errors::new();
            errors.decimal("cost", Decimal::from_str(raw).unwrap(), 8, 2, false);
            fields(errors.finish())
        };
        assert!(check("100.00").is_empty());
        assert!(check("0").is_empty());
        assert!(check("999999.99").is_empty());
        assert!(check("12.50000").is_empty());
        assert_eq!(check("1000000"), vec!["cost"]);
        assert_eq!(check("1.001"), vec!["cost"]);
        assert_eq!(check("-1"), vec!["cost"]);
    }

    #[test]
    fn every_error_is_reported() {
        let mut errors = Errors::new();
        errors.non_negative("quantity", -1);
        errors.at_least_one("basket_quantity", 0);
        errors.max_len("session_key", &"k".repeat(33), SESSION_KEY_MAX_LEN);
        assert_eq!(
            fields(errors.finish()),
            vec!["quantity", "basket_quantity", "session_key"]
        );
    }
}
