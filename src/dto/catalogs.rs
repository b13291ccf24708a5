use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    validation::{Errors, NAME_MAX_LEN},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCatalogRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CreateCatalogRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Errors::new();
        errors.name("name", &self.name, NAME_MAX_LEN);
        errors.finish()
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCatalogRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub softdelete: Option<bool>,
}

impl UpdateCatalogRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Errors::new();
        if let Some(name) = &self.name {
            errors.name("name", name, NAME_MAX_LEN);
        }
        errors.finish()
    }
}

/// One row of the catalog list screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogRow {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub name: String,
    pub description_short: String,
    /// Preview URL, `null` when the catalog has no preview.
    pub image_show: Option<String>,
    pub softdelete: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CatalogList {
    #[schema(value_type = Vec<CatalogRow>)]
    pub items: Vec<CatalogRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_name() {
        let req: CreateCatalogRequest =
            serde_json::from_value(serde_json::json!({ "name": "" })).unwrap();
        assert!(req.validate().is_err());
        let req: CreateCatalogRequest =
            serde_json::from_value(serde_json::json!({ "name": "Mugs" })).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.description, "");
    }

    #[test]
    fn update_checks_only_given_fields() {
        assert!(UpdateCatalogRequest::default().validate().is_ok());
        let req = UpdateCatalogRequest {
            name: Some(" ".into()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
