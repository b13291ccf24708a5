#![allow(dead_code)]

use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use storefront::{
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{
        catalogs::ActiveModel as CatalogActive, products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    state::AppState,
    storage::MediaStorage,
};
use tempfile::TempDir;

pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            None
        }
    }
}

/// Fresh state over an emptied schema. The media directory lives as long as the `TempDir`.
pub async fn setup_state(database_url: &str) -> anyhow::Result<(AppState, TempDir)> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE baskets, product_reviews, product_images, products, catalogs, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let pool = create_pool(database_url).await?;
    let media_dir = tempfile::tempdir()?;
    let media = MediaStorage::new(media_dir.path(), "/media/");
    Ok((AppState { pool, orm, media }, media_dir))
}

pub async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: NotSet,
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

pub async fn create_catalog(state: &AppState, name: &str) -> anyhow::Result<i32> {
    let catalog = CatalogActive {
        id: NotSet,
        created_at: NotSet,
        name: Set(name.to_string()),
        description: Set(String::new()),
        preview: Set(None),
        softdelete: Set(false),
    }
    .insert(&state.orm)
    .await?;
    Ok(catalog.id)
}

pub async fn create_product(
    state: &AppState,
    catalog_id: i32,
    name: &str,
    cost: Decimal,
) -> anyhow::Result<i32> {
    let product = ProductActive {
        id: NotSet,
        created_at: NotSet,
        name: Set(name.to_string()),
        description: Set(String::new()),
        cost: Set(cost),
        quantity: Set(10),
        discount: Set(0),
        preview: Set(None),
        softdelete: Set(false),
        catalog_id: Set(catalog_id),
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}
