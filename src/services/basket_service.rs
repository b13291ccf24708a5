use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
    sea_query::{Expr, Query, extension::postgres::PgExpr},
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    admin::BASKET_ADMIN,
    audit,
    display::{basket_label, product_label, user_label},
    dto::baskets::{
        AddToBasketRequest, BasketItemDto, BasketList, BasketRow, COST_DIGITS, COST_PLACES,
        CreateBasketRequest, UpdateBasketRequest, UserBasketList,
    },
    entity::{
        baskets::{ActiveModel, Column, Entity as Baskets, Model as BasketModel},
        products::{Column as ProductCol, Entity as Products, Model as ProductModel},
        users::{Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult, FieldError},
    middleware::auth::{AuthUser, ensure_admin},
    models::Basket,
    response::{ApiResponse, Meta},
    routes::params::{AdminListQuery, Pagination},
    services::admin_service::check_filters,
    state::AppState,
    validation::{Errors, SESSION_KEY_MAX_LEN},
};

pub async fn list_baskets(
    state: &AppState,
    user: &AuthUser,
    query: AdminListQuery,
) -> AppResult<ApiResponse<BasketList>> {
    ensure_admin(user)?;
    check_filters(&BASKET_ADMIN, &query)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.search() {
        let users_matching = Query::select()
            .column(UserCol::Id)
            .from(Users)
            .and_where(Expr::col(UserCol::Email).ilike(format!("%{search}%")))
            .to_owned();
        condition = condition.add(Column::UserId.in_subquery(users_matching));
    }
    if let Some(softdelete) = query.softdelete {
        condition = condition.add(Column::Softdelete.eq(softdelete));
    }
    if let Some(date) = query.date {
        let (start, end) = date.bounds(chrono::Utc::now());
        condition = condition
            .add(Column::CreatedAt.gte(start))
            .add(Column::CreatedAt.lt(end));
    }
    if let Some(user_id) = query.user_id {
        condition = condition.add(Column::UserId.eq(user_id));
    }

    let finder = Baskets::find().filter(condition).order_by_asc(Column::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let baskets = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = basket_rows(state, baskets).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Baskets", BasketList { items }, Some(meta)))
}

pub async fn get_basket(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<Basket>> {
    ensure_admin(user)?;
    let basket = find_basket(state, id).await?;
    Ok(ApiResponse::success("Basket", basket.into(), None))
}

pub async fn create_basket(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBasketRequest,
) -> AppResult<ApiResponse<Basket>> {
    ensure_admin(user)?;
    payload.validate()?;
    find_product_for(state, payload.product_id).await?;
    ensure_user_exists(state, payload.user_id).await?;

    let basket = ActiveModel {
        id: NotSet,
        created_at: NotSet,
        product_id: Set(payload.product_id),
        quantity: Set(payload.quantity),
        discount: Set(payload.discount),
        cost: Set(payload.cost),
        session_key: Set(payload.session_key),
        user_id: Set(payload.user_id),
        ordered: Set(payload.ordered),
        softdelete: Set(false),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(basket_id = basket.id, user_id = basket.user_id, "basket row created");
    audit::record(
        &state.pool,
        user.user_id,
        "basket_create",
        "baskets",
        serde_json::json!({ "basket_id": basket.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Basket created",
        basket.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_basket(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateBasketRequest,
) -> AppResult<ApiResponse<Basket>> {
    ensure_admin(user)?;
    payload.validate()?;
    let existing = find_basket(state, id).await?;
    if let Some(product_id) = payload.product_id {
        find_product_for(state, product_id).await?;
    }
    if let Some(user_id) = payload.user_id {
        ensure_user_exists(state, user_id).await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(product_id) = payload.product_id {
        active.product_id = Set(product_id);
    }
    if let Some(user_id) = payload.user_id {
        active.user_id = Set(user_id);
    }
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(discount) = payload.discount {
        active.discount = Set(discount);
    }
    if let Some(cost) = payload.cost {
        active.cost = Set(cost);
    }
    if let Some(session_key) = payload.session_key {
        active.session_key = Set(session_key);
    }
    if let Some(ordered) = payload.ordered {
        active.ordered = Set(ordered);
    }
    if let Some(softdelete) = payload.softdelete {
        active.softdelete = Set(softdelete);
    }
    let basket = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "basket_update",
        "baskets",
        serde_json::json!({ "basket_id": basket.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        basket.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_basket(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Baskets::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "basket_delete",
        "baskets",
        serde_json::json!({ "basket_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Basket rows of the signed-in shopper, newest first.
pub async fn list_own(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserBasketList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Baskets::find()
        .filter(Column::UserId.eq(user.user_id))
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .find_also_related(Products)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .filter_map(|(basket, product)| {
            product.map(|product| BasketItemDto {
                basket: basket.into(),
                product: product.into(),
            })
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", UserBasketList { items }, Some(meta)))
}

/// Put a product in the shopper's basket. The line cost is the product cost times the
/// quantity; the product discount is copied as-is and not applied.
pub async fn add_own(
    state: &AppState,
    user: &AuthUser,
    session_key: Option<&str>,
    payload: AddToBasketRequest,
) -> AppResult<ApiResponse<Basket>> {
    let mut errors = Errors::new();
    errors.at_least_one("quantity", payload.quantity);
    let session_key = match session_key {
        Some(key) => {
            errors.max_len("session_key", key, SESSION_KEY_MAX_LEN);
            key.to_string()
        }
        None => Uuid::new_v4().simple().to_string(),
    };
    errors.finish()?;

    let product = find_product_for(state, payload.product_id).await?;
    let cost = line_cost(product.cost, payload.quantity);
    if cost >= Decimal::from(10_i64.pow(COST_DIGITS - COST_PLACES)) {
        return Err(AppError::Validation(vec![FieldError::new(
            "quantity",
            "line cost exceeds the basket limit",
        )]));
    }

    let basket = ActiveModel {
        id: NotSet,
        created_at: NotSet,
        product_id: Set(product.id),
        quantity: Set(payload.quantity),
        discount: Set(product.discount),
        cost: Set(cost),
        session_key: Set(session_key),
        user_id: Set(user.user_id),
        ordered: Set(false),
        softdelete: Set(false),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = audit::log_audit(
        &state.pool,
        Some(user.user_id),
        "basket_add",
        Some("baskets"),
        Some(serde_json::json!({ "product_id": product.id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("OK", basket.into(), None))
}

pub async fn remove_own(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Baskets::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = audit::log_audit(
        &state.pool,
        Some(user.user_id),
        "basket_remove",
        Some("baskets"),
        Some(serde_json::json!({ "basket_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from basket",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub fn line_cost(unit_cost: Decimal, quantity: i32) -> Decimal {
    (unit_cost * Decimal::from(quantity)).round_dp(2)
}

/// Resolve product and user labels for a page of basket rows. The product label comes from
/// each row's `product_id`.
async fn basket_rows(state: &AppState, baskets: Vec<BasketModel>) -> AppResult<Vec<BasketRow>> {
    let mut product_ids: Vec<i32> = baskets.iter().map(|b| b.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    let mut user_ids: Vec<i32> = baskets.iter().map(|b| b.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let products: HashMap<i32, ProductModel> = Products::find()
        .filter(ProductCol::Id.is_in(product_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let users: HashMap<i32, UserModel> = Users::find()
        .filter(UserCol::Id.is_in(user_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(baskets
        .into_iter()
        .map(|basket| BasketRow {
            id: basket.id,
            date: basket.created_at.with_timezone(&chrono::Utc),
            product_id: basket.product_id,
            get_product: products
                .get(&basket.product_id)
                .map(product_label)
                .unwrap_or_default(),
            quantity: basket.quantity,
            discount: basket.discount,
            cost: basket.cost,
            user_id: basket.user_id,
            user: users
                .get(&basket.user_id)
                .map(user_label)
                .unwrap_or_default(),
            label: products
                .get(&basket.product_id)
                .map(basket_label)
                .unwrap_or_default(),
            session_key: basket.session_key,
            ordered: basket.ordered,
            softdelete: basket.softdelete,
        })
        .collect())
}

async fn find_basket(state: &AppState, id: i32) -> AppResult<BasketModel> {
    Baskets::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn find_product_for(state: &AppState, product_id: i32) -> AppResult<ProductModel> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| {
            AppError::Validation(vec![FieldError::new("product_id", "select a valid product")])
        })
}

async fn ensure_user_exists(state: &AppState, user_id: i32) -> AppResult<()> {
    let exists = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .is_some();
    if exists {
        Ok(())
    } else {
        Err(AppError::Validation(vec![FieldError::new(
            "user_id",
            "select a valid user",
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn line_cost_multiplies_unit_cost() {
        let cost = line_cost(Decimal::from_str("19.99").unwrap(), 3);
        assert_eq!(cost, Decimal::from_str("59.97").unwrap());
        assert_eq!(cost.to_string(), "59.97");
    }
}
