use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, validation::Errors};

const EMAIL_MAX_LEN: usize = 254;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Lowercased, trimmed email used as the account key.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Errors::new();
        let email = self.normalized_email();
        if !email.contains('@') {
            errors.add("email", "enter a valid email address");
        }
        errors.max_len("email", &email, EMAIL_MAX_LEN);
        if self.password.is_empty() {
            errors.add("password", "this field is required");
        }
        errors.finish()
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// JWT payload; `sub` is the numeric user id.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn register_reports_every_bad_field() {
        let ok = RegisterRequest {
            email: " Ann@Example.com ".into(),
            password: "secret".into(),
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.normalized_email(), "ann@example.com");

        let bad = RegisterRequest {
            email: "ann".into(),
            password: String::new(),
        };
        match bad.validate() {
            Err(AppError::Validation(fields)) => assert_eq!(fields.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}
