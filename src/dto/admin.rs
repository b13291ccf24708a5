use serde::Serialize;
use utoipa::ToSchema;

use crate::admin::ModelAdmin;

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkActionResult {
    pub action: String,
    pub affected: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListEditResult {
    pub updated: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ModelAdminList {
    #[schema(value_type = Vec<ModelAdmin>)]
    pub items: Vec<ModelAdmin>,
}
