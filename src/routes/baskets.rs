use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};

use crate::{
    dto::{
        admin::{BulkActionResult, ListEditResult},
        baskets::{BasketList, CreateBasketRequest, UpdateBasketRequest},
    },
    entity::Baskets,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Basket,
    response::ApiResponse,
    routes::params::{AdminListQuery, BulkActionRequest, ListEditRequest},
    services::{admin_service, basket_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_baskets).post(create_basket))
        .route("/list_edit", patch(list_edit))
        .route("/actions/{action}", post(run_action))
        .route(
            "/{id}",
            get(get_basket).put(update_basket).delete(delete_basket),
        )
}

#[utoipa::path(
    get,
    path = "/api/admin/baskets",
    params(AdminListQuery),
    responses(
        (status = 200, description = "Basket list screen", body = ApiResponse<BasketList>),
        (status = 400, description = "Unsupported filter"),
    ),
    security(("bearer_auth" = [])),
    tag = "Baskets"
)]
pub async fn list_baskets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminListQuery>,
) -> AppResult<Json<ApiResponse<BasketList>>> {
    let resp = basket_service::list_baskets(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/baskets/{id}",
    params(("id" = i32, Path, description = "Basket row ID")),
    responses(
        (status = 200, description = "Get basket row", body = ApiResponse<Basket>),
        (status = 404, description = "Basket row not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Baskets"
)]
pub async fn get_basket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Basket>>> {
    let resp = basket_service::get_basket(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/baskets",
    request_body = CreateBasketRequest,
    responses(
        (status = 200, description = "Create basket row", body = ApiResponse<Basket>),
        (status = 404, description = "Product or user not found"),
        (status = 422, description = "Invalid fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Baskets"
)]
pub async fn create_basket(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBasketRequest>,
) -> AppResult<Json<ApiResponse<Basket>>> {
    let resp = basket_service::create_basket(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/baskets/{id}",
    params(("id" = i32, Path, description = "Basket row ID")),
    request_body = UpdateBasketRequest,
    responses(
        (status = 200, description = "Updated basket row", body = ApiResponse<Basket>),
        (status = 404, description = "Basket row not found"),
        (status = 422, description = "Invalid fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Baskets"
)]
pub async fn update_basket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBasketRequest>,
) -> AppResult<Json<ApiResponse<Basket>>> {
    let resp = basket_service::update_basket(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/baskets/{id}",
    params(("id" = i32, Path, description = "Basket row ID")),
    responses(
        (status = 200, description = "Deleted basket row", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Basket row not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Baskets"
)]
pub async fn delete_basket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = basket_service::delete_basket(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/baskets/actions/{action}",
    params(("action" = String, Path, description = "mark_softdelete or mark_unsoftdelete")),
    request_body = BulkActionRequest,
    responses(
        (status = 200, description = "Action applied", body = ApiResponse<BulkActionResult>),
        (status = 404, description = "Unknown action"),
    ),
    security(("bearer_auth" = [])),
    tag = "Baskets"
)]
pub async fn run_action(
    State(state): State<AppState>,
    user: AuthUser,
    Path(action): Path<String>,
    Json(payload): Json<BulkActionRequest>,
) -> AppResult<Json<ApiResponse<BulkActionResult>>> {
    let resp =
        admin_service::run_action::<Baskets>(&state, &user, &action, payload.ids).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/baskets/list_edit",
    request_body = ListEditRequest,
    responses(
        (status = 200, description = "Soft-delete column saved", body = ApiResponse<ListEditResult>),
    ),
    security(("bearer_auth" = [])),
    tag = "Baskets"
)]
pub async fn list_edit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ListEditRequest>,
) -> AppResult<Json<ApiResponse<ListEditResult>>> {
    let resp = admin_service::list_edit::<Baskets>(&state, &user, payload.rows).await?;
    Ok(Json(resp))
}
