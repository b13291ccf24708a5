mod common;

use rust_decimal::Decimal;
use storefront::{
    dto::baskets::{AddToBasketRequest, UpdateBasketRequest},
    entity::Baskets,
    error::AppError,
    routes::params::{AdminListQuery, Pagination},
    services::{admin_service, basket_service, user_service},
};

// Shopper fills a basket; admin reviews it, filters by owner, and basket rows protect the user.
#[tokio::test]
async fn basket_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let (state, _media_dir) = common::setup_state(&database_url).await?;
    let admin = common::create_user(&state, "admin", "admin@example.com").await?;
    let alice = common::create_user(&state, "user", "alice@example.com").await?;
    let bob = common::create_user(&state, "user", "bob@example.com").await?;
    let catalog = common::create_catalog(&state, "Apparel").await?;
    let hoodie = common::create_product(&state, catalog, "Hoodie", Decimal::new(5500, 2)).await?;

    // Line cost is unit cost times quantity; the session key is generated when absent.
    let line = basket_service::add_own(
        &state,
        &alice,
        None,
        AddToBasketRequest {
            product_id: hoodie,
            quantity: 3,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(line.cost, Decimal::new(16500, 2));
    assert_eq!(line.session_key.len(), 32);
    assert!(!line.ordered);

    let keyed = basket_service::add_own(
        &state,
        &bob,
        Some("bob-session"),
        AddToBasketRequest {
            product_id: hoodie,
            quantity: 1,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(keyed.session_key, "bob-session");

    let zero = basket_service::add_own(
        &state,
        &bob,
        None,
        AddToBasketRequest {
            product_id: hoodie,
            quantity: 0,
        },
    )
    .await;
    assert!(matches!(zero, Err(AppError::Validation(_))));

    let own = basket_service::list_own(&state, &alice, Pagination::default())
        .await?
        .data
        .unwrap();
    assert_eq!(own.items.len(), 1);
    assert_eq!(own.items[0].product.id, hoodie);

    // Shoppers cannot touch rows of other users.
    let foreign = basket_service::remove_own(&state, &alice, keyed.id).await;
    assert!(matches!(foreign, Err(AppError::NotFound)));

    // Admin filters by owner and searches by email.
    let by_owner = basket_service::list_baskets(
        &state,
        &admin,
        AdminListQuery {
            user_id: Some(bob.user_id),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(by_owner.items.len(), 1);
    assert_eq!(by_owner.items[0].user, "bob@example.com");
    assert!(by_owner.items[0].get_product.starts_with(&format!("(id={hoodie}) Hoodie")));
    assert_eq!(by_owner.items[0].label, "Hoodie");

    let by_email = basket_service::list_baskets(
        &state,
        &admin,
        AdminListQuery {
            q: Some("ALICE".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(by_email.items.len(), 1);
    assert_eq!(by_email.items[0].id, line.id);

    let marked = basket_service::update_basket(
        &state,
        &admin,
        line.id,
        UpdateBasketRequest {
            ordered: Some(true),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert!(marked.ordered);

    let too_long = basket_service::update_basket(
        &state,
        &admin,
        line.id,
        UpdateBasketRequest {
            session_key: Some("k".repeat(33)),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(too_long, Err(AppError::Validation(_))));

    // Marked rows stay visible to the owner.
    admin_service::run_action::<Baskets>(&state, &admin, "mark_softdelete", vec![line.id]).await?;
    let own = basket_service::list_own(&state, &alice, Pagination::default())
        .await?
        .data
        .unwrap();
    assert_eq!(own.items.len(), 1);
    assert!(own.items[0].basket.softdelete);

    // Basket rows protect their owner until removed.
    let blocked = user_service::delete_user(&state, &admin, alice.user_id).await;
    assert!(matches!(blocked, Err(AppError::Protected(ref relation)) if relation == "baskets.user"));

    basket_service::remove_own(&state, &alice, line.id).await?;
    user_service::delete_user(&state, &admin, alice.user_id).await?;

    let own_account = user_service::delete_user(&state, &admin, admin.user_id).await;
    assert!(matches!(own_account, Err(AppError::BadRequest(_))));

    Ok(())
}
