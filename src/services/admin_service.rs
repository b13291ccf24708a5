use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, TransactionTrait, sea_query::Expr,
};

use crate::{
    admin::{self, BASKET_ADMIN, CATALOG_ADMIN, MARK_SOFTDELETE, MARK_UNSOFTDELETE, ModelAdmin, PRODUCT_ADMIN},
    audit,
    dto::admin::{BulkActionResult, ListEditResult, ModelAdminList},
    entity::{baskets, catalogs, products},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    routes::params::{AdminListQuery, ListEditRow},
    state::AppState,
};

/// Entities carrying the advisory `softdelete` flag.
pub trait SoftDelete: EntityTrait {
    const ADMIN: &'static ModelAdmin;

    fn id_column() -> Self::Column;
    fn softdelete_column() -> Self::Column;
}

impl SoftDelete for catalogs::Entity {
    const ADMIN: &'static ModelAdmin = &CATALOG_ADMIN;

    fn id_column() -> Self::Column {
        catalogs::Column::Id
    }

    fn softdelete_column() -> Self::Column {
        catalogs::Column::Softdelete
    }
}

impl SoftDelete for products::Entity {
    const ADMIN: &'static ModelAdmin = &PRODUCT_ADMIN;

    fn id_column() -> Self::Column {
        products::Column::Id
    }

    fn softdelete_column() -> Self::Column {
        products::Column::Softdelete
    }
}

impl SoftDelete for baskets::Entity {
    const ADMIN: &'static ModelAdmin = &BASKET_ADMIN;

    fn id_column() -> Self::Column {
        baskets::Column::Id
    }

    fn softdelete_column() -> Self::Column {
        baskets::Column::Softdelete
    }
}

pub fn list_meta(user: &AuthUser) -> AppResult<ApiResponse<ModelAdminList>> {
    ensure_admin(user)?;
    let items = admin::REGISTRY.to_vec();
    Ok(ApiResponse::success(
        "Admin models",
        ModelAdminList { items },
        Some(Meta::empty()),
    ))
}

pub fn get_meta(user: &AuthUser, name: &str) -> AppResult<ApiResponse<ModelAdmin>> {
    ensure_admin(user)?;
    let model_admin = admin::lookup(name).ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Admin model",
        *model_admin,
        Some(Meta::empty()),
    ))
}

/// Reject filters the entity's list screen does not offer.
pub fn check_filters(model_admin: &ModelAdmin, query: &AdminListQuery) -> AppResult<()> {
    let requested = [
        ("softdelete", query.softdelete.is_some()),
        ("date", query.date.is_some()),
        ("user", query.user_id.is_some()),
    ];
    for (field, present) in requested {
        if present && !model_admin.filters(field) {
            return Err(AppError::BadRequest(format!(
                "{} cannot be filtered by {field}",
                model_admin.name
            )));
        }
    }
    if query.search().is_some() && model_admin.search_fields.is_empty() {
        return Err(AppError::BadRequest(format!(
            "{} has no search fields",
            model_admin.name
        )));
    }
    Ok(())
}

/// Run a named bulk action over the selected rows.
pub async fn run_action<E>(
    state: &AppState,
    user: &AuthUser,
    action: &str,
    ids: Vec<i32>,
) -> AppResult<ApiResponse<BulkActionResult>>
where
    E: SoftDelete + 'static,
{
    ensure_admin(user)?;
    if !E::ADMIN.has_action(action) {
        return Err(AppError::NotFound);
    }
    let flag = if action == MARK_SOFTDELETE.name {
        true
    } else if action == MARK_UNSOFTDELETE.name {
        false
    } else {
        return Err(AppError::NotFound);
    };
    let affected = set_softdelete::<E>(state, user, ids, flag).await?;
    Ok(ApiResponse::success(
        "Action applied",
        BulkActionResult {
            action: action.to_string(),
            affected,
        },
        Some(Meta::empty()),
    ))
}

/// Set the flag on every selected row with a single `UPDATE ... WHERE id IN (...)`.
pub async fn set_softdelete<E>(
    state: &AppState,
    user: &AuthUser,
    ids: Vec<i32>,
    flag: bool,
) -> AppResult<u64>
where
    E: SoftDelete + 'static,
{
    ensure_admin(user)?;
    if ids.is_empty() {
        return Err(AppError::BadRequest("no rows selected".into()));
    }

    let result = E::update_many()
        .col_expr(E::softdelete_column(), Expr::value(flag))
        .filter(E::id_column().is_in(ids.clone()))
        .exec(&state.orm)
        .await?;

    tracing::info!(
        entity = E::ADMIN.name,
        flag,
        affected = result.rows_affected,
        "softdelete flag updated"
    );
    audit::record(
        &state.pool,
        user.user_id,
        if flag { "mark_softdelete" } else { "mark_unsoftdelete" },
        E::ADMIN.name,
        serde_json::json!({ "ids": ids }),
    )
    .await;

    Ok(result.rows_affected)
}

/// Save the list-editable `softdelete` column. Rows are grouped by target value and each group
/// is one set-based update, all inside one transaction.
pub async fn list_edit<E>(
    state: &AppState,
    user: &AuthUser,
    rows: Vec<ListEditRow>,
) -> AppResult<ApiResponse<ListEditResult>>
where
    E: SoftDelete + 'static,
{
    ensure_admin(user)?;
    if rows.is_empty() {
        return Err(AppError::BadRequest("no rows submitted".into()));
    }

    let (marked, unmarked): (Vec<_>, Vec<_>) = rows.iter().partition(|row| row.softdelete);
    let txn = state.orm.begin().await?;
    let mut updated = 0;
    for (flag, group) in [(true, marked), (false, unmarked)] {
        if group.is_empty() {
            continue;
        }
        let ids: Vec<i32> = group.iter().map(|row| row.id).collect();
        let result = E::update_many()
            .col_expr(E::softdelete_column(), Expr::value(flag))
            .filter(E::id_column().is_in(ids))
            .exec(&txn)
            .await?;
        updated += result.rows_affected;
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "list_edit",
        E::ADMIN.name,
        serde_json::json!({
            "rows": rows
                .iter()
                .map(|row| serde_json::json!({ "id": row.id, "softdelete": row.softdelete }))
                .collect::<Vec<_>>()
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Saved",
        ListEditResult { updated },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::REVIEW_ADMIN;
    use crate::routes::params::DateFilter;

    #[test]
    fn undeclared_filters_are_rejected() {
        let query = AdminListQuery {
            user_id: Some(1),
            ..Default::default()
        };
        assert!(check_filters(&BASKET_ADMIN, &query).is_ok());
        assert!(matches!(
            check_filters(&CATALOG_ADMIN, &query),
            Err(AppError::BadRequest(_))
        ));

        let query = AdminListQuery {
            softdelete: Some(true),
            date: Some(DateFilter::Today),
            ..Default::default()
        };
        assert!(check_filters(&PRODUCT_ADMIN, &query).is_ok());
        assert!(check_filters(&REVIEW_ADMIN, &query).is_err());
    }

    #[test]
    fn meta_requires_admin() {
        let user = AuthUser {
            user_id: 1,
            role: "user".into(),
        };
        assert!(matches!(list_meta(&user), Err(AppError::Forbidden)));
        let admin = AuthUser {
            user_id: 1,
            role: "admin".into(),
        };
        assert_eq!(list_meta(&admin).unwrap().data.unwrap().items.len(), 4);
        assert!(matches!(get_meta(&admin, "orders"), Err(AppError::NotFound)));
    }
}
