use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    admin::REVIEW_ADMIN,
    audit,
    display::{product_label, review_label, short_text, user_label},
    dto::reviews::{
        CreateReviewRequest, InlineReviewRequest, ReviewList, ReviewRow, UpdateReviewRequest,
    },
    entity::{
        product_reviews::{ActiveModel, Column, Entity as ProductReviews, Model as ReviewModel},
        products::{Column as ProductCol, Entity as Products, Model as ProductModel},
        users::{Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult, FieldError},
    middleware::auth::{AuthUser, ensure_admin},
    models::ProductReview,
    response::{ApiResponse, Meta},
    routes::params::AdminListQuery,
    services::{admin_service::check_filters, product_service::find_product},
    state::AppState,
};

pub async fn list_reviews(
    state: &AppState,
    user: &AuthUser,
    query: AdminListQuery,
) -> AppResult<ApiResponse<ReviewList>> {
    ensure_admin(user)?;
    check_filters(&REVIEW_ADMIN, &query)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.search() {
        condition = condition.add(Expr::col(Column::Review).ilike(format!("%{search}%")));
    }

    let finder = ProductReviews::find()
        .filter(condition)
        .order_by_asc(Column::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let reviews = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = review_rows(state, reviews).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

pub async fn get_review(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<ProductReview>> {
    ensure_admin(user)?;
    let review = find_review(state, id).await?;
    Ok(ApiResponse::success("Review", review.into(), None))
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<ProductReview>> {
    ensure_admin(user)?;
    payload.validate()?;
    ensure_product_exists(state, payload.product_id).await?;
    ensure_reviewer_exists(state, payload.reviewer_id).await?;

    let review = insert_review(
        state,
        user,
        payload.product_id,
        payload.reviewer_id,
        payload.review,
        payload.star,
    )
    .await?;
    Ok(ApiResponse::success(
        "Review created",
        review.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_review(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<ProductReview>> {
    ensure_admin(user)?;
    let existing = find_review(state, id).await?;
    let review = apply_update(state, user, existing, payload).await?;
    Ok(ApiResponse::success(
        "Updated",
        review.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let review = find_review(state, id).await?;
    remove_review(state, user, review).await
}

/// Inline review rows shown on the product edit screen.
pub async fn rows_for_product(state: &AppState, product_id: i32) -> AppResult<Vec<ReviewRow>> {
    let reviews = ProductReviews::find()
        .filter(Column::ProductId.eq(product_id))
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?;
    review_rows(state, reviews).await
}

pub async fn add_inline_review(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
    payload: InlineReviewRequest,
) -> AppResult<ApiResponse<ProductReview>> {
    ensure_admin(user)?;
    payload.validate()?;
    let product = find_product(state, product_id).await?;
    ensure_reviewer_exists(state, payload.reviewer_id).await?;

    let review = insert_review(
        state,
        user,
        product.id,
        payload.reviewer_id,
        payload.review,
        payload.star,
    )
    .await?;
    Ok(ApiResponse::success(
        "Review created",
        review.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_inline_review(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
    review_id: i32,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<ProductReview>> {
    ensure_admin(user)?;
    let existing = find_product_review(state, product_id, review_id).await?;
    let review = apply_update(state, user, existing, payload).await?;
    Ok(ApiResponse::success(
        "Updated",
        review.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_inline_review(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
    review_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let review = find_product_review(state, product_id, review_id).await?;
    remove_review(state, user, review).await
}

async fn insert_review(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
    reviewer_id: i32,
    text: String,
    star: rust_decimal::Decimal,
) -> AppResult<ReviewModel> {
    let review = ActiveModel {
        id: NotSet,
        product_id: Set(product_id),
        created_at: NotSet,
        review: Set(text),
        star: Set(star),
        reviewer_id: Set(reviewer_id),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(review_id = review.id, product_id, "review created");
    audit::record(
        &state.pool,
        user.user_id,
        "review_create",
        "product_reviews",
        serde_json::json!({ "review_id": review.id, "product_id": product_id }),
    )
    .await;
    Ok(review)
}

async fn apply_update(
    state: &AppState,
    user: &AuthUser,
    existing: ReviewModel,
    payload: UpdateReviewRequest,
) -> AppResult<ReviewModel> {
    payload.validate()?;
    if let Some(reviewer_id) = payload.reviewer_id {
        ensure_reviewer_exists(state, reviewer_id).await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(reviewer_id) = payload.reviewer_id {
        active.reviewer_id = Set(reviewer_id);
    }
    if let Some(review) = payload.review {
        active.review = Set(review);
    }
    if let Some(star) = payload.star {
        active.star = Set(star);
    }
    let review = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "review_update",
        "product_reviews",
        serde_json::json!({ "review_id": review.id }),
    )
    .await;
    Ok(review)
}

async fn remove_review(
    state: &AppState,
    user: &AuthUser,
    review: ReviewModel,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ProductReviews::delete_by_id(review.id)
        .exec(&state.orm)
        .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "review_delete",
        "product_reviews",
        serde_json::json!({ "review_id": review.id, "product_id": review.product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Resolve the reviewer and product labels for a page of reviews.
async fn review_rows(state: &AppState, reviews: Vec<ReviewModel>) -> AppResult<Vec<ReviewRow>> {
    let mut product_ids: Vec<i32> = reviews.iter().map(|r| r.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    let mut reviewer_ids: Vec<i32> = reviews.iter().map(|r| r.reviewer_id).collect();
    reviewer_ids.sort_unstable();
    reviewer_ids.dedup();

    let products: HashMap<i32, ProductModel> = Products::find()
        .filter(ProductCol::Id.is_in(product_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let reviewers: HashMap<i32, UserModel> = Users::find()
        .filter(UserCol::Id.is_in(reviewer_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(reviews
        .into_iter()
        .map(|review| ReviewRow {
            id: review.id,
            date: review.created_at.with_timezone(&chrono::Utc),
            product_id: review.product_id,
            star: review.star,
            reviewer_id: review.reviewer_id,
            reviewer: reviewers
                .get(&review.reviewer_id)
                .map(user_label)
                .unwrap_or_default(),
            get_product: products
                .get(&review.product_id)
                .map(product_label)
                .unwrap_or_default(),
            label: reviewers
                .get(&review.reviewer_id)
                .map(|reviewer| review_label(&review, reviewer))
                .unwrap_or_default(),
            review_short: short_text(&review.review),
        })
        .collect())
}

async fn find_review(state: &AppState, id: i32) -> AppResult<ReviewModel> {
    ProductReviews::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn find_product_review(
    state: &AppState,
    product_id: i32,
    review_id: i32,
) -> AppResult<ReviewModel> {
    ProductReviews::find_by_id(review_id)
        .filter(Column::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn ensure_product_exists(state: &AppState, product_id: i32) -> AppResult<()> {
    let exists = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .is_some();
    if exists {
        Ok(())
    } else {
        Err(AppError::Validation(vec![FieldError::new(
            "product_id",
            "select a valid product",
        )]))
    }
}

async fn ensure_reviewer_exists(state: &AppState, reviewer_id: i32) -> AppResult<()> {
    let exists = Users::find_by_id(reviewer_id)
        .one(&state.orm)
        .await?
        .is_some();
    if exists {
        Ok(())
    } else {
        Err(AppError::Validation(vec![FieldError::new(
            "reviewer_id",
            "select a valid user",
        )]))
    }
}
