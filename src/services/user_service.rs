use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
    sea_query::{Expr, extension::postgres::PgExpr},
};

use crate::{
    audit,
    dto::users::UserList,
    entity::{
        baskets::{Column as BasketCol, Entity as Baskets},
        product_reviews::{Column as ReviewCol, Entity as ProductReviews},
        users::{Column, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::AdminListQuery,
    state::AppState,
};

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: AdminListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.search() {
        condition = condition.add(Expr::col(Column::Email).ilike(format!("%{search}%")));
    }

    let finder = Users::find().filter(condition).order_by_asc(Column::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

/// Delete a user account. Refused while the user has authored reviews or owns basket rows.
pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if id == user.user_id {
        return Err(AppError::BadRequest("cannot delete your own account".into()));
    }

    let txn = state.orm.begin().await?;
    Users::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let reviews = ProductReviews::find()
        .filter(ReviewCol::ReviewerId.eq(id))
        .count(&txn)
        .await?;
    if reviews > 0 {
        tracing::info!(user_id = id, reviews, "user delete blocked");
        return Err(AppError::Protected("product_reviews.reviewer".into()));
    }
    let baskets = Baskets::find()
        .filter(BasketCol::UserId.eq(id))
        .count(&txn)
        .await?;
    if baskets > 0 {
        tracing::info!(user_id = id, baskets, "user delete blocked");
        return Err(AppError::Protected("baskets.user".into()));
    }

    Users::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "user_delete",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
