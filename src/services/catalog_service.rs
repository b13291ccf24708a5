use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
    sea_query::{Alias, Expr, extension::postgres::PgExpr},
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    admin::CATALOG_ADMIN,
    audit,
    display::short_text,
    dto::catalogs::{CatalogList, CatalogRow, CreateCatalogRequest, UpdateCatalogRequest},
    entity::{
        catalogs::{ActiveModel, Column, Entity as Catalogs, Model as CatalogModel},
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Catalog,
    response::{ApiResponse, Meta},
    routes::params::AdminListQuery,
    services::admin_service::check_filters,
    state::AppState,
    storage::{MediaStorage, catalog_image_path, sanitize_filename},
};

pub async fn list_catalogs(
    state: &AppState,
    user: &AuthUser,
    query: AdminListQuery,
) -> AppResult<ApiResponse<CatalogList>> {
    ensure_admin(user)?;
    check_filters(&CATALOG_ADMIN, &query)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.search() {
        let pattern = format!("%{search}%");
        condition = condition.add(
            Condition::any()
                .add(
                    Expr::expr(
                        Expr::col((Catalogs, Column::CreatedAt)).cast_as(Alias::new("TEXT")),
                    )
                    .ilike(pattern.clone()),
                )
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
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

    let finder = Catalogs::find().filter(condition).order_by_asc(Column::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| catalog_row(&state.media, model))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Catalogs", CatalogList { items }, Some(meta)))
}

pub async fn get_catalog(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<Catalog>> {
    ensure_admin(user)?;
    let catalog = find_catalog(state, id).await?;
    Ok(ApiResponse::success("Catalog", catalog.into(), None))
}

pub async fn create_catalog(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCatalogRequest,
) -> AppResult<ApiResponse<Catalog>> {
    ensure_admin(user)?;
    payload.validate()?;

    let catalog = ActiveModel {
        id: NotSet,
        created_at: NotSet,
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        preview: Set(None),
        softdelete: Set(false),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(catalog_id = catalog.id, "catalog created");
    audit::record(
        &state.pool,
        user.user_id,
        "catalog_create",
        "catalogs",
        serde_json::json!({ "catalog_id": catalog.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Catalog created",
        catalog.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_catalog(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateCatalogRequest,
) -> AppResult<ApiResponse<Catalog>> {
    ensure_admin(user)?;
    payload.validate()?;
    let existing = find_catalog(state, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(softdelete) = payload.softdelete {
        active.softdelete = Set(softdelete);
    }
    let catalog = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "catalog_update",
        "catalogs",
        serde_json::json!({ "catalog_id": catalog.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        catalog.into(),
        Some(Meta::empty()),
    ))
}

/// Delete a catalog. Refused while any product, soft-deleted or not, still points at it.
pub async fn delete_catalog(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let catalog = Catalogs::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let products = Products::find()
        .filter(ProductCol::CatalogId.eq(id))
        .count(&txn)
        .await?;
    if products > 0 {
        tracing::info!(catalog_id = id, products, "catalog delete blocked");
        return Err(AppError::Protected("products.catalog".into()));
    }

    Catalogs::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    if let Some(preview) = &catalog.preview {
        if let Err(err) = state.media.remove(preview).await {
            tracing::warn!(error = %err, preview = %preview, "failed to remove catalog preview");
        }
    }

    audit::record(
        &state.pool,
        user.user_id,
        "catalog_delete",
        "catalogs",
        serde_json::json!({ "catalog_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn upload_preview(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    filename: &str,
    bytes: &[u8],
) -> AppResult<ApiResponse<Catalog>> {
    ensure_admin(user)?;
    let filename = sanitize_filename(filename)?;
    let existing = find_catalog(state, id).await?;

    let path = state
        .media
        .save(&catalog_image_path(existing.id, &filename), bytes)
        .await?;
    let previous = existing.preview.clone();

    let mut active: ActiveModel = existing.into();
    active.preview = Set(Some(path.clone()));
    let catalog = active.update(&state.orm).await?;

    if let Some(previous) = previous.filter(|p| *p != path) {
        if let Err(err) = state.media.remove(&previous).await {
            tracing::warn!(error = %err, previous = %previous, "failed to remove old catalog preview");
        }
    }

    audit::record(
        &state.pool,
        user.user_id,
        "catalog_preview_upload",
        "catalogs",
        serde_json::json!({ "catalog_id": catalog.id, "path": path }),
    )
    .await;

    Ok(ApiResponse::success(
        "Preview uploaded",
        catalog.into(),
        Some(Meta::empty()),
    ))
}

async fn find_catalog(state: &AppState, id: i32) -> AppResult<CatalogModel> {
    Catalogs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

fn catalog_row(media: &MediaStorage, model: CatalogModel) -> CatalogRow {
    CatalogRow {
        id: model.id,
        date: model.created_at.with_timezone(&chrono::Utc),
        description_short: short_text(&model.description),
        image_show: model.preview.as_deref().map(|p| media.url(p)),
        name: model.name,
        softdelete: model.softdelete,
    }
}
