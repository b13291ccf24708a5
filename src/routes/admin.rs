use axum::{
    Json, Router,
    extract::Path,
    routing::get,
};

use crate::{
    admin::ModelAdmin,
    dto::admin::ModelAdminList,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::{baskets, catalogs, products, reviews, users},
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meta", get(list_meta))
        .route("/meta/{entity}", get(get_meta))
        .nest("/catalogs", catalogs::router())
        .nest("/products", products::router())
        .nest("/reviews", reviews::router())
        .nest("/baskets", baskets::router())
        .nest("/users", users::router())
}

#[utoipa::path(
    get,
    path = "/api/admin/meta",
    responses(
        (status = 200, description = "Admin screen descriptors", body = ApiResponse<ModelAdminList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_meta(user: AuthUser) -> AppResult<Json<ApiResponse<ModelAdminList>>> {
    let resp = admin_service::list_meta(&user)?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/meta/{entity}",
    params(("entity" = String, Path, description = "catalogs, products, reviews or baskets")),
    responses(
        (status = 200, description = "Descriptor of one admin screen", body = ApiResponse<ModelAdmin>),
        (status = 404, description = "Unknown entity"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_meta(
    user: AuthUser,
    Path(entity): Path<String>,
) -> AppResult<Json<ApiResponse<ModelAdmin>>> {
    let resp = admin_service::get_meta(&user, &entity)?;
    Ok(Json(resp))
}
