use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set,
};
use storefront::{
    config::AppConfig,
    db::{create_orm_conn, create_pool},
    entity::{
        Catalogs, Products, Users,
        catalogs::{ActiveModel as CatalogActive, Column as CatalogCol},
        products::{ActiveModel as ProductActive, Column as ProductCol},
        users::Column as UserCol,
    },
    services::auth_service::{ROLE_ADMIN, ROLE_USER, create_user},
    state::AppState,
    storage::MediaStorage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;
    let orm = create_orm_conn(&config.database_url).await?;
    let state = AppState {
        pool,
        orm,
        media: MediaStorage::new(&config.media_root, config.media_url.clone()),
    };

    let admin_id = ensure_user(&state, "admin@example.com", "admin123", ROLE_ADMIN).await?;
    let user_id = ensure_user(&state, "user@example.com", "user123", ROLE_USER).await?;

    let apparel = ensure_catalog(&state, "Apparel", "Things to wear").await?;
    let kitchen = ensure_catalog(&state, "Kitchen", "Mugs, cups and other tableware").await?;
    let products = [
        (apparel, "Axum Hoodie", "Warm hoodie for Rustaceans", Decimal::new(5500, 2), 50, 10),
        (apparel, "Ferris T-shirt", "Cotton shirt with a crab on it", Decimal::new(1999, 2), 120, 0),
        (kitchen, "Ferris Mug", "Coffee tastes better with Ferris", Decimal::new(1200, 2), 100, 5),
        (kitchen, "Borrow Checker Coaster", "Keeps references off the table", Decimal::new(450, 2), 200, 0),
    ];
    for (catalog_id, name, description, cost, quantity, discount) in products {
        ensure_product(&state, catalog_id, name, description, cost, quantity, discount).await?;
    }

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    state: &AppState,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<i32> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?
    {
        println!("User {email} already present (role={})", existing.role);
        return Ok(existing.id);
    }
    let user = create_user(state, email, password, role).await?;
    println!("Created user {email} (role={role})");
    Ok(user.id)
}

async fn ensure_catalog(state: &AppState, name: &str, description: &str) -> anyhow::Result<i32> {
    if let Some(existing) = Catalogs::find()
        .filter(CatalogCol::Name.eq(name))
        .one(&state.orm)
        .await?
    {
        return Ok(existing.id);
    }
    let catalog = CatalogActive {
        id: NotSet,
        created_at: NotSet,
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        preview: Set(None),
        softdelete: Set(false),
    }
    .insert(&state.orm)
    .await?;
    println!("Seeded catalog {name}");
    Ok(catalog.id)
}

async fn ensure_product(
    state: &AppState,
    catalog_id: i32,
    name: &str,
    description: &str,
    cost: Decimal,
    quantity: i32,
    discount: i32,
) -> anyhow::Result<()> {
    let exists = Products::find()
        .filter(ProductCol::Name.eq(name))
        .one(&state.orm)
        .await?
        .is_some();
    if exists {
        return Ok(());
    }
    ProductActive {
        id: NotSet,
        created_at: NotSet,
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        cost: Set(cost),
        quantity: Set(quantity),
        discount: Set(discount),
        preview: Set(None),
        softdelete: Set(false),
        catalog_id: Set(catalog_id),
    }
    .insert(&state.orm)
    .await?;
    println!("Seeded product {name}");
    Ok(())
}
