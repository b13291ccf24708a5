use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
    sea_query::{Alias, Expr, Query, extension::postgres::PgExpr},
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    admin::PRODUCT_ADMIN,
    audit,
    db::DbPool,
    display::{AverageRating, catalog_label, short_text},
    dto::products::{
        CreateProductRequest, ProductDetail, ProductImageList, ProductList, ProductRow,
        UpdateProductRequest,
    },
    entity::{
        baskets::{Column as BasketCol, Entity as Baskets},
        catalogs::{Column as CatalogCol, Entity as Catalogs, Model as CatalogModel},
        product_images::{
            ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages,
        },
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult, FieldError},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Product, ProductImage},
    response::{ApiResponse, Meta},
    routes::params::AdminListQuery,
    services::{admin_service::check_filters, review_service},
    state::AppState,
    storage::{product_image_path, sanitize_filename},
};

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: AdminListQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    check_filters(&PRODUCT_ADMIN, &query)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.search() {
        let pattern = format!("%{search}%");
        let catalogs_matching = Query::select()
            .column(CatalogCol::Id)
            .from(Catalogs)
            .and_where(Expr::col(CatalogCol::Name).ilike(pattern.clone()))
            .to_owned();
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Column::CatalogId.in_subquery(catalogs_matching))
                .add(
                    Expr::expr(Expr::col((Products, Column::Cost)).cast_as(Alias::new("TEXT")))
                        .ilike(pattern),
                ),
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

    let finder = Products::find().filter(condition).order_by_asc(Column::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let products = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let product_ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    let mut catalog_ids: Vec<i32> = products.iter().map(|p| p.catalog_id).collect();
    catalog_ids.sort_unstable();
    catalog_ids.dedup();

    let catalogs: HashMap<i32, CatalogModel> = Catalogs::find()
        .filter(CatalogCol::Id.is_in(catalog_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let ratings = average_ratings(&state.pool, &product_ids).await?;

    let items = products
        .into_iter()
        .map(|model| ProductRow {
            id: model.id,
            date: model.created_at.with_timezone(&chrono::Utc),
            catalog_id: model.catalog_id,
            catalog: catalogs
                .get(&model.catalog_id)
                .map(catalog_label)
                .unwrap_or_default(),
            quantity: model.quantity,
            cost: model.cost,
            description_short: short_text(&model.description),
            discount: model.discount,
            get_stars: AverageRating::from_avg(ratings.get(&model.id).copied()),
            softdelete: model.softdelete,
            name: model.name,
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;
    let product = find_product(state, id).await?;
    let catalog = Catalogs::find_by_id(product.catalog_id)
        .one(&state.orm)
        .await?
        .map(|c| catalog_label(&c))
        .unwrap_or_default();

    let rating = average_rating(&state.pool, product.id).await?;
    let reviews = review_service::rows_for_product(state, product.id).await?;
    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product.id))
        .order_by_asc(ImageCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|image| {
            let url = state.media.url(&image.image);
            ProductImage::from_entity(image, url)
        })
        .collect();

    let detail = ProductDetail {
        preview_url: product.preview.as_deref().map(|p| state.media.url(p)),
        product: product.into(),
        catalog,
        rating,
        reviews,
        images,
    };
    Ok(ApiResponse::success("Product", detail, None))
}

pub async fn get_rating(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<AverageRating>> {
    ensure_admin(user)?;
    let product = find_product(state, id).await?;
    let rating = average_rating(&state.pool, product.id).await?;
    Ok(ApiResponse::success("Rating", rating, Some(Meta::empty())))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;
    ensure_catalog_exists(state, payload.catalog_id).await?;

    let product = ActiveModel {
        id: NotSet,
        created_at: NotSet,
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        cost: Set(payload.cost),
        quantity: Set(payload.quantity),
        discount: Set(payload.discount),
        preview: Set(None),
        softdelete: Set(false),
        catalog_id: Set(payload.catalog_id),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(product_id = product.id, catalog_id = product.catalog_id, "product created");
    audit::record(
        &state.pool,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;
    let existing = find_product(state, id).await?;
    if let Some(catalog_id) = payload.catalog_id {
        ensure_catalog_exists(state, catalog_id).await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(catalog_id) = payload.catalog_id {
        active.catalog_id = Set(catalog_id);
    }
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(cost) = payload.cost {
        active.cost = Set(cost);
    }
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(discount) = payload.discount {
        active.discount = Set(discount);
    }
    if let Some(softdelete) = payload.softdelete {
        active.softdelete = Set(softdelete);
    }
    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        product.into(),
        Some(Meta::empty()),
    ))
}

/// Delete a product together with its images and reviews. Refused while basket rows
/// reference it; the catalog is never touched.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let baskets = Baskets::find()
        .filter(BasketCol::ProductId.eq(id))
        .count(&txn)
        .await?;
    if baskets > 0 {
        tracing::info!(product_id = id, baskets, "product delete blocked");
        return Err(AppError::Protected("baskets.product".into()));
    }

    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(id))
        .all(&txn)
        .await?;
    // Images and reviews go with the product through ON DELETE CASCADE.
    Products::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    let files = images
        .into_iter()
        .map(|image| image.image)
        .chain(product.preview);
    for file in files {
        if let Err(err) = state.media.remove(&file).await {
            tracing::warn!(error = %err, file = %file, "failed to remove product file");
        }
    }

    audit::record(
        &state.pool,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
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
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let filename = sanitize_filename(filename)?;
    let existing = find_product(state, id).await?;

    let path = state
        .media
        .save(&product_image_path(existing.id, &filename), bytes)
        .await?;
    let previous = existing.preview.clone();

    let mut active: ActiveModel = existing.into();
    active.preview = Set(Some(path.clone()));
    let product = active.update(&state.orm).await?;

    if let Some(previous) = previous.filter(|p| *p != path) {
        if let Err(err) = state.media.remove(&previous).await {
            tracing::warn!(error = %err, previous = %previous, "failed to remove old product preview");
        }
    }

    audit::record(
        &state.pool,
        user.user_id,
        "product_preview_upload",
        "products",
        serde_json::json!({ "product_id": product.id, "path": path }),
    )
    .await;

    Ok(ApiResponse::success(
        "Preview uploaded",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_images(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
) -> AppResult<ApiResponse<ProductImageList>> {
    ensure_admin(user)?;
    let product = find_product(state, product_id).await?;
    let items = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product.id))
        .order_by_asc(ImageCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|image| {
            let url = state.media.url(&image.image);
            ProductImage::from_entity(image, url)
        })
        .collect();
    Ok(ApiResponse::success(
        "Images",
        ProductImageList { items },
        Some(Meta::empty()),
    ))
}

pub async fn add_image(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
    filename: &str,
    bytes: &[u8],
) -> AppResult<ApiResponse<ProductImage>> {
    ensure_admin(user)?;
    let filename = sanitize_filename(filename)?;
    let product = find_product(state, product_id).await?;

    let path = state
        .media
        .save(&product_image_path(product.id, &filename), bytes)
        .await?;

    let image = ImageActive {
        id: NotSet,
        product_id: Set(product.id),
        image: Set(path),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_image_add",
        "product_images",
        serde_json::json!({ "product_id": product.id, "image_id": image.id }),
    )
    .await;

    let url = state.media.url(&image.image);
    Ok(ApiResponse::success(
        "Image added",
        ProductImage::from_entity(image, url),
        Some(Meta::empty()),
    ))
}

pub async fn delete_image(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
    image_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let image = ProductImages::find_by_id(image_id)
        .filter(ImageCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    ProductImages::delete_by_id(image.id).exec(&state.orm).await?;

    // Stored names are unique, so no other row points at this file.
    if let Err(err) = state.media.remove(&image.image).await {
        tracing::warn!(error = %err, file = %image.image, "failed to remove product image");
    }

    audit::record(
        &state.pool,
        user.user_id,
        "product_image_delete",
        "product_images",
        serde_json::json!({ "product_id": product_id, "image_id": image_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Mean star rating of one product, `None` inside the result when it has no reviews.
pub async fn average_rating(pool: &DbPool, product_id: i32) -> AppResult<AverageRating> {
    let (avg,): (Option<Decimal>,) =
        sqlx::query_as("SELECT AVG(star) FROM product_reviews WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(pool)
            .await?;
    Ok(AverageRating::from_avg(avg))
}

/// Mean star ratings for a page of products in one grouped query. Products without reviews
/// are absent from the map.
pub async fn average_ratings(
    pool: &DbPool,
    product_ids: &[i32],
) -> AppResult<HashMap<i32, Decimal>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, Option<Decimal>)> = sqlx::query_as(
        r#"
        SELECT product_id, AVG(star)
        FROM product_reviews
        WHERE product_id = ANY($1)
        GROUP BY product_id
        "#,
    )
    .bind(product_ids.to_vec())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, avg)| avg.map(|avg| (id, avg)))
        .collect())
}

pub(crate) async fn find_product(state: &AppState, id: i32) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn ensure_catalog_exists(state: &AppState, catalog_id: i32) -> AppResult<()> {
    let exists = Catalogs::find_by_id(catalog_id)
        .one(&state.orm)
        .await?
        .is_some();
    if exists {
        Ok(())
    } else {
        Err(AppError::Validation(vec![FieldError::new(
            "catalog_id",
            "select a valid catalog",
        )]))
    }
}
