use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    routing::{get, patch, post, put},
};

use crate::{
    dto::{
        admin::{BulkActionResult, ListEditResult},
        catalogs::{CatalogList, CreateCatalogRequest, UpdateCatalogRequest},
    },
    entity::Catalogs,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Catalog,
    response::ApiResponse,
    routes::params::{AdminListQuery, BulkActionRequest, ListEditRequest, UploadQuery},
    services::{admin_service, catalog_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_catalogs).post(create_catalog))
        .route("/list_edit", patch(list_edit))
        .route("/actions/{action}", post(run_action))
        .route(
            "/{id}",
            get(get_catalog).put(update_catalog).delete(delete_catalog),
        )
        .route("/{id}/preview", put(upload_preview))
}

#[utoipa::path(
    get,
    path = "/api/admin/catalogs",
    params(AdminListQuery),
    responses(
        (status = 200, description = "Catalog list screen", body = ApiResponse<CatalogList>),
        (status = 400, description = "Unsupported filter"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogs"
)]
pub async fn list_catalogs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminListQuery>,
) -> AppResult<Json<ApiResponse<CatalogList>>> {
    let resp = catalog_service::list_catalogs(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/catalogs/{id}",
    params(("id" = i32, Path, description = "Catalog ID")),
    responses(
        (status = 200, description = "Get catalog", body = ApiResponse<Catalog>),
        (status = 404, description = "Catalog not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogs"
)]
pub async fn get_catalog(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Catalog>>> {
    let resp = catalog_service::get_catalog(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/catalogs",
    request_body = CreateCatalogRequest,
    responses(
        (status = 200, description = "Create catalog", body = ApiResponse<Catalog>),
        (status = 422, description = "Invalid fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogs"
)]
pub async fn create_catalog(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCatalogRequest>,
) -> AppResult<Json<ApiResponse<Catalog>>> {
    let resp = catalog_service::create_catalog(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/catalogs/{id}",
    params(("id" = i32, Path, description = "Catalog ID")),
    request_body = UpdateCatalogRequest,
    responses(
        (status = 200, description = "Updated catalog", body = ApiResponse<Catalog>),
        (status = 404, description = "Catalog not found"),
        (status = 422, description = "Invalid fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogs"
)]
pub async fn update_catalog(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCatalogRequest>,
) -> AppResult<Json<ApiResponse<Catalog>>> {
    let resp = catalog_service::update_catalog(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/catalogs/{id}",
    params(("id" = i32, Path, description = "Catalog ID")),
    responses(
        (status = 200, description = "Deleted catalog", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Catalog not found"),
        (status = 409, description = "Products still reference the catalog"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogs"
)]
pub async fn delete_catalog(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalog_service::delete_catalog(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/catalogs/{id}/preview",
    params(("id" = i32, Path, description = "Catalog ID"), UploadQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Preview stored", body = ApiResponse<Catalog>),
        (status = 404, description = "Catalog not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogs"
)]
pub async fn upload_preview(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Query(upload): Query<UploadQuery>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<Catalog>>> {
    let resp = catalog_service::upload_preview(&state, &user, id, &upload.filename, &body).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/catalogs/actions/{action}",
    params(("action" = String, Path, description = "mark_softdelete or mark_unsoftdelete")),
    request_body = BulkActionRequest,
    responses(
        (status = 200, description = "Action applied", body = ApiResponse<BulkActionResult>),
        (status = 404, description = "Unknown action"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogs"
)]
pub async fn run_action(
    State(state): State<AppState>,
    user: AuthUser,
    Path(action): Path<String>,
    Json(payload): Json<BulkActionRequest>,
) -> AppResult<Json<ApiResponse<BulkActionResult>>> {
    let resp =
        admin_service::run_action::<Catalogs>(&state, &user, &action, payload.ids).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/catalogs/list_edit",
    request_body = ListEditRequest,
    responses(
        (status = 200, description = "Soft-delete column saved", body = ApiResponse<ListEditResult>),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogs"
)]
pub async fn list_edit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ListEditRequest>,
) -> AppResult<Json<ApiResponse<ListEditResult>>> {
    let resp = admin_service::list_edit::<Catalogs>(&state, &user, payload.rows).await?;
    Ok(Json(resp))
}
