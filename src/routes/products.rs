use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post, put},
};

use crate::{
    display::AverageRating,
    dto::{
        admin::{BulkActionResult, ListEditResult},
        products::{
            CreateProductRequest, ProductDetail, ProductImageList, ProductList,
            UpdateProductRequest,
        },
        reviews::{InlineReviewRequest, UpdateReviewRequest},
    },
    entity::Products,
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Product, ProductImage, ProductReview},
    response::ApiResponse,
    routes::params::{AdminListQuery, BulkActionRequest, ListEditRequest, UploadQuery},
    services::{admin_service, product_service, review_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/list_edit", patch(list_edit))
        .route("/actions/{action}", post(run_action))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/rating", get(get_rating))
        .route("/{id}/preview", put(upload_preview))
        .route("/{id}/images", get(list_images).post(add_image))
        .route("/{id}/images/{image_id}", delete(delete_image))
        .route("/{id}/reviews", post(add_review))
        .route(
            "/{id}/reviews/{review_id}",
            put(update_review).delete(delete_review),
        )
}

#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(AdminListQuery),
    responses(
        (status = 200, description = "Product list screen", body = ApiResponse<ProductList>),
        (status = 400, description = "Unsupported filter"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminListQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product with its reviews and images", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/{id}/rating",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Average star rating", body = ApiResponse<AverageRating>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn get_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<AverageRating>>> {
    let resp = product_service::get_rating(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Create product", body = ApiResponse<Product>),
        (status = 404, description = "Catalog not found"),
        (status = 422, description = "Invalid fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Invalid fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted product with its images and reviews", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Basket rows still reference the product"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}/preview",
    params(("id" = i32, Path, description = "Product ID"), UploadQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Preview stored", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn upload_preview(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Query(upload): Query<UploadQuery>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::upload_preview(&state, &user, id, &upload.filename, &body).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/{id}/images",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Gallery images", body = ApiResponse<ProductImageList>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_images(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<ProductImageList>>> {
    let resp = product_service::list_images(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products/{id}/images",
    params(("id" = i32, Path, description = "Product ID"), UploadQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Image stored", body = ApiResponse<ProductImage>),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Invalid file"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn add_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Query(upload): Query<UploadQuery>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<ProductImage>>> {
    let resp = product_service::add_image(&state, &user, id, &upload.filename, &body).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}/images/{image_id}",
    params(
        ("id" = i32, Path, description = "Product ID"),
        ("image_id" = i32, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "Image removed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Image not found on this product"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, image_id)): Path<(i32, i32)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_image(&state, &user, id, image_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products/{id}/reviews",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = InlineReviewRequest,
    responses(
        (status = 200, description = "Review added", body = ApiResponse<ProductReview>),
        (status = 404, description = "Product or reviewer not found"),
        (status = 422, description = "Invalid fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn add_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<InlineReviewRequest>,
) -> AppResult<Json<ApiResponse<ProductReview>>> {
    let resp = review_service::add_inline_review(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}/reviews/{review_id}",
    params(
        ("id" = i32, Path, description = "Product ID"),
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated, omitted fields unchanged", body = ApiResponse<ProductReview>),
        (status = 404, description = "Review not found on this product"),
        (status = 422, description = "Invalid fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, review_id)): Path<(i32, i32)>,
    Json(payload): Json<UpdateReviewRequest>,
) -> AppResult<Json<ApiResponse<ProductReview>>> {
    let resp = review_service::update_inline_review(&state, &user, id, review_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}/reviews/{review_id}",
    params(
        ("id" = i32, Path, description = "Product ID"),
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Review removed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Review not found on this product"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, review_id)): Path<(i32, i32)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = review_service::delete_inline_review(&state, &user, id, review_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products/actions/{action}",
    params(("action" = String, Path, description = "mark_softdelete or mark_unsoftdelete")),
    request_body = BulkActionRequest,
    responses(
        (status = 200, description = "Action applied", body = ApiResponse<BulkActionResult>),
        (status = 404, description = "Unknown action"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn run_action(
    State(state): State<AppState>,
    user: AuthUser,
    Path(action): Path<String>,
    Json(payload): Json<BulkActionRequest>,
) -> AppResult<Json<ApiResponse<BulkActionResult>>> {
    let resp =
        admin_service::run_action::<Products>(&state, &user, &action, payload.ids).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/products/list_edit",
    request_body = ListEditRequest,
    responses(
        (status = 200, description = "Soft-delete column saved", body = ApiResponse<ListEditResult>),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_edit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ListEditRequest>,
) -> AppResult<Json<ApiResponse<ListEditResult>>> {
    let resp = admin_service::list_edit::<Products>(&state, &user, payload.rows).await?;
    Ok(Json(resp))
}
