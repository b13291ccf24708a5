mod common;

use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use storefront::{
    dto::catalogs::{CreateCatalogRequest, UpdateCatalogRequest},
    entity::{Catalogs, Products},
    error::AppError,
    routes::params::{AdminListQuery, ListEditRow},
    services::{admin_service, catalog_service, product_service},
};

// Catalog admin: create, search, preview upload, soft-delete actions and protected delete.
#[tokio::test]
async fn catalog_admin_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let (state, media_dir) = common::setup_state(&database_url).await?;
    let admin = common::create_user(&state, "admin", "admin@example.com").await?;
    let shopper = common::create_user(&state, "user", "user@example.com").await?;

    // Non-admins never reach the screens.
    let denied = catalog_service::list_catalogs(&state, &shopper, AdminListQuery::default()).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    // Validation failures write nothing.
    let invalid = catalog_service::create_catalog(
        &state,
        &admin,
        CreateCatalogRequest {
            name: "x".repeat(101),
            description: String::new(),
        },
    )
    .await;
    assert!(matches!(invalid, Err(AppError::Validation(_))));
    assert!(Catalogs::find().all(&state.orm).await?.is_empty());

    let books = catalog_service::create_catalog(
        &state,
        &admin,
        CreateCatalogRequest {
            name: "Books".into(),
            description: "Paper and ink".into(),
        },
    )
    .await?
    .data
    .unwrap();
    let empty = common::create_catalog(&state, "Empty shelf").await?;

    // Search is case-insensitive over name and description.
    let found = catalog_service::list_catalogs(
        &state,
        &admin,
        AdminListQuery {
            q: Some("INK".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].id, books.id);
    assert_eq!(found.items[0].image_show, None);
    for (q, expected) in [("shelf", vec![empty]), ("books", vec![books.id]), ("nowhere", vec![])] {
        let found = catalog_service::list_catalogs(
            &state,
            &admin,
            AdminListQuery {
                q: Some(q.into()),
                ..Default::default()
            },
        )
        .await?
        .data
        .unwrap();
        let ids: Vec<i32> = found.items.iter().map(|row| row.id).collect();
        assert_eq!(ids, expected, "search {q}");
    }

    // Preview upload lands at catalog/preview_{id}/{filename}.
    let with_preview =
        catalog_service::upload_preview(&state, &admin, books.id, "cover.png", b"png").await?;
    let preview = with_preview.data.unwrap().preview.unwrap();
    assert_eq!(preview, format!("catalog/preview_{}/cover.png", books.id));
    assert!(media_dir.path().join(&preview).exists());

    // Uploading the same name again keeps both files apart and drops the old one.
    let again = catalog_service::upload_preview(&state, &admin, books.id, "cover.png", b"png2")
        .await?
        .data
        .unwrap()
        .preview
        .unwrap();
    assert_ne!(again, preview);
    assert!(again.starts_with(&format!("catalog/preview_{}/cover_", books.id)));
    assert!(!media_dir.path().join(&preview).exists());
    assert_eq!(std::fs::read(media_dir.path().join(&again))?, b"png2");

    // Bulk actions are idempotent and never hide rows.
    for _ in 0..2 {
        let applied = admin_service::run_action::<Catalogs>(
            &state,
            &admin,
            "mark_softdelete",
            vec![books.id, empty],
        )
        .await?
        .data
        .unwrap();
        assert_eq!(applied.affected, 2);
    }
    let all = catalog_service::list_catalogs(&state, &admin, AdminListQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(all.items.len(), 2);
    assert!(all.items.iter().all(|row| row.softdelete));

    for _ in 0..2 {
        let applied = admin_service::run_action::<Catalogs>(
            &state,
            &admin,
            "mark_unsoftdelete",
            vec![books.id, empty],
        )
        .await?
        .data
        .unwrap();
        assert_eq!(applied.affected, 2);
    }
    let all = catalog_service::list_catalogs(&state, &admin, AdminListQuery::default())
        .await?
        .data
        .unwrap();
    assert!(all.items.iter().all(|row| !row.softdelete));

    let unknown =
        admin_service::run_action::<Catalogs>(&state, &admin, "publish", vec![books.id]).await;
    assert!(matches!(unknown, Err(AppError::NotFound)));
    let none_selected =
        admin_service::run_action::<Catalogs>(&state, &admin, "mark_softdelete", vec![]).await;
    assert!(matches!(none_selected, Err(AppError::BadRequest(_))));

    // The list-editable column saves mixed values in one submit.
    let edited = admin_service::list_edit::<Catalogs>(
        &state,
        &admin,
        vec![
            ListEditRow {
                id: books.id,
                softdelete: false,
            },
            ListEditRow {
                id: empty,
                softdelete: true,
            },
        ],
    )
    .await?
    .data
    .unwrap();
    assert_eq!(edited.updated, 2);
    let filtered = catalog_service::list_catalogs(
        &state,
        &admin,
        AdminListQuery {
            softdelete: Some(false),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(filtered.items.len(), 1);
    assert_eq!(filtered.items[0].id, books.id);

    // Unsupported filters are rejected instead of being applied elsewhere.
    let bad_filter = catalog_service::list_catalogs(
        &state,
        &admin,
        AdminListQuery {
            user_id: Some(admin.user_id),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(bad_filter, Err(AppError::BadRequest(_))));

    // A catalog with products is protected, even a soft-deleted one.
    let product = common::create_product(&state, books.id, "Rust Book", Decimal::new(3999, 2)).await?;
    let blocked = catalog_service::delete_catalog(&state, &admin, books.id).await;
    assert!(matches!(blocked, Err(AppError::Protected(ref relation)) if relation == "products.catalog"));
    assert!(Catalogs::find_by_id(books.id).one(&state.orm).await?.is_some());
    assert!(Products::find_by_id(product).one(&state.orm).await?.is_some());

    let renamed = catalog_service::update_catalog(
        &state,
        &admin,
        empty,
        UpdateCatalogRequest {
            name: Some("Clearance".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(renamed.name, "Clearance");

    catalog_service::delete_catalog(&state, &admin, empty).await?;
    assert!(Catalogs::find_by_id(empty).one(&state.orm).await?.is_none());
    let missing = catalog_service::get_catalog(&state, &admin, empty).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    // Once its product is gone the catalog deletes, taking its preview file along.
    product_service::delete_product(&state, &admin, product).await?;
    catalog_service::delete_catalog(&state, &admin, books.id).await?;
    assert!(Catalogs::find().all(&state.orm).await?.is_empty());
    assert!(!media_dir.path().join(&again).exists());

    Ok(())
}
