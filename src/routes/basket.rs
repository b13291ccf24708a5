use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{delete, get},
};

use crate::{
    dto::baskets::{AddToBasketRequest, UserBasketList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Basket,
    response::ApiResponse,
    routes::params::Pagination,
    services::basket_service,
    state::AppState,
};

/// Anonymous session the basket row is attached to; generated when absent.
pub const SESSION_KEY_HEADER: &str = "x-session-key";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(basket_list).post(add_to_basket))
        .route("/{id}", delete(remove_from_basket))
}

#[utoipa::path(
    get,
    path = "/api/basket",
    params(Pagination),
    responses(
        (status = 200, description = "List basket rows of the current user", body = ApiResponse<UserBasketList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Basket"
)]
pub async fn basket_list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<UserBasketList>>> {
    let resp = basket_service::list_own(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/basket",
    params(("x-session-key" = Option<String>, Header, description = "Session key, at most 32 characters")),
    request_body = AddToBasketRequest,
    responses(
        (status = 200, description = "Product added to basket", body = ApiResponse<Basket>),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Invalid fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Basket"
)]
pub async fn add_to_basket(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    Json(payload): Json<AddToBasketRequest>,
) -> AppResult<Json<ApiResponse<Basket>>> {
    let session_key = headers
        .get(SESSION_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let resp = basket_service::add_own(&state, &user, session_key, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/basket/{id}",
    params(("id" = i32, Path, description = "Basket row ID")),
    responses(
        (status = 200, description = "Basket row removed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Basket row not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Basket"
)]
pub async fn remove_from_basket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = basket_service::remove_own(&state, &user, id).await?;
    Ok(Json(resp))
}
