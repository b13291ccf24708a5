mod common;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use storefront::{
    dto::{
        baskets::CreateBasketRequest,
        products::{CreateProductRequest, UpdateProductRequest},
        reviews::{InlineReviewRequest, UpdateReviewRequest},
    },
    entity::{
        Catalogs, ProductImages, ProductReviews, Products, product_reviews::Column as ReviewCol,
    },
    error::AppError,
    routes::params::AdminListQuery,
    services::{basket_service, catalog_service, product_service, review_service, user_service},
};

// Product admin: inline reviews drive the rating, baskets protect the product, delete cascades.
#[tokio::test]
async fn product_admin_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let (state, media_dir) = common::setup_state(&database_url).await?;
    let admin = common::create_user(&state, "admin", "admin@example.com").await?;
    let reviewer = common::create_user(&state, "user", "reviewer@example.com").await?;
    let catalog = common::create_catalog(&state, "Kitchen").await?;

    let invalid = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            catalog_id: catalog,
            name: "Mug".into(),
            description: String::new(),
            cost: Decimal::new(-1, 0),
            quantity: 0,
            discount: 0,
        },
    )
    .await;
    assert!(matches!(invalid, Err(AppError::Validation(_))));

    let missing_catalog = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            catalog_id: catalog + 100,
            name: "Mug".into(),
            description: String::new(),
            cost: Decimal::new(1200, 2),
            quantity: 0,
            discount: 0,
        },
    )
    .await;
    assert!(missing_catalog.is_err());
    assert_eq!(Products::find().count(&state.orm).await?, 0);

    let mug = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            catalog_id: catalog,
            name: "Ferris Mug".into(),
            description: "Coffee tastes better with Ferris, the friendly crab of the Rust community".into(),
            cost: Decimal::new(1200, 2),
            quantity: 5,
            discount: 10,
        },
    )
    .await?
    .data
    .unwrap();

    // No reviews yet.
    let rating = product_service::get_rating(&state, &admin, mug.id).await?.data.unwrap();
    assert_eq!(rating.value, None);
    assert_eq!(rating.display, "no reviews yet");

    let mut review_ids = Vec::new();
    for star in [4, 5, 5] {
        let review = review_service::add_inline_review(
            &state,
            &admin,
            mug.id,
            InlineReviewRequest {
                reviewer_id: reviewer.user_id,
                review: "Solid mug".into(),
                star: Decimal::from(star),
            },
        )
        .await?
        .data
        .unwrap();
        review_ids.push(review.id);
    }
    let out_of_range = review_service::add_inline_review(
        &state,
        &admin,
        mug.id,
        InlineReviewRequest {
            reviewer_id: reviewer.user_id,
            review: String::new(),
            star: Decimal::new(55, 1),
        },
    )
    .await;
    assert!(matches!(out_of_range, Err(AppError::Validation(_))));

    let rating = product_service::get_rating(&state, &admin, mug.id).await?.data.unwrap();
    assert_eq!(rating.value, Some(Decimal::new(47, 1)));
    assert_eq!(rating.display, "4.7 stars");

    // Editing only the text of an inline review keeps its star.
    let edited = review_service::update_inline_review(
        &state,
        &admin,
        mug.id,
        review_ids[2],
        UpdateReviewRequest {
            review: Some("Solid mug, slightly chipped".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(edited.star, Decimal::from(5));
    assert_eq!(edited.review, "Solid mug, slightly chipped");
    let rating = product_service::get_rating(&state, &admin, mug.id).await?.data.unwrap();
    assert_eq!(rating.display, "4.7 stars");

    // A review is only reachable through its own product.
    let wrong_product = review_service::update_inline_review(
        &state,
        &admin,
        mug.id + 100,
        review_ids[0],
        UpdateReviewRequest::default(),
    )
    .await;
    assert!(matches!(wrong_product, Err(AppError::NotFound)));

    let rows = product_service::list_products(&state, &admin, AdminListQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(rows.items.len(), 1);
    let row = &rows.items[0];
    assert_eq!(row.catalog, "Kitchen");
    assert_eq!(row.get_stars.display, "4.7 stars");
    assert_eq!(row.description_short.chars().count(), 48);
    assert!(row.description_short.ends_with("..."));

    // Search reaches the product name, the catalog name and the cost.
    for q in ["ferris", "kitch", "12.00"] {
        let found = product_service::list_products(
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
        assert_eq!(found.items.len(), 1, "search {q}");
    }
    let no_match = product_service::list_products(
        &state,
        &admin,
        AdminListQuery {
            q: Some("teapot".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert!(no_match.items.is_empty());

    // The preview and a gallery image with the same name get separate files.
    let preview = product_service::upload_preview(&state, &admin, mug.id, "a.png", b"PREVIEW")
        .await?
        .data
        .unwrap()
        .preview
        .unwrap();
    assert_eq!(preview, format!("products/preview_{}/a.png", mug.id));
    let clash = product_service::add_image(&state, &admin, mug.id, "a.png", b"GALLERY")
        .await?
        .data
        .unwrap();
    assert_ne!(clash.image, preview);
    assert_eq!(std::fs::read(media_dir.path().join(&preview))?, b"PREVIEW");
    assert_eq!(std::fs::read(media_dir.path().join(&clash.image))?, b"GALLERY");

    product_service::delete_image(&state, &admin, mug.id, clash.id).await?;
    assert!(!media_dir.path().join(&clash.image).exists());
    assert!(media_dir.path().join(&preview).exists());

    // Replacing the preview removes the old file.
    let replaced = product_service::upload_preview(&state, &admin, mug.id, "b.png", b"NEW")
        .await?
        .data
        .unwrap()
        .preview
        .unwrap();
    assert_eq!(replaced, format!("products/preview_{}/b.png", mug.id));
    assert!(!media_dir.path().join(&preview).exists());
    assert!(media_dir.path().join(&replaced).exists());

    let image = product_service::add_image(&state, &admin, mug.id, "side.jpg", b"jpg")
        .await?
        .data
        .unwrap();
    assert_eq!(image.image, format!("products/preview_{}/side.jpg", mug.id));
    assert_eq!(image.url, format!("/media/products/preview_{}/side.jpg", mug.id));
    assert!(media_dir.path().join(&image.image).exists());

    let detail = product_service::get_product(&state, &admin, mug.id).await?.data.unwrap();
    assert_eq!(detail.reviews.len(), 3);
    assert_eq!(detail.images.len(), 1);
    assert_eq!(detail.catalog, "Kitchen");

    let review_rows = review_service::list_reviews(&state, &admin, AdminListQuery::default())
        .await?
        .data
        .unwrap();
    assert!(review_rows.items.iter().all(|r| r.get_product.starts_with(&format!("(id={})", mug.id))));
    assert!(review_rows.items.iter().all(|r| r.reviewer == "reviewer@example.com"));
    assert!(review_rows.items[0].label.starts_with("Solid mug - reviewer@example.com - star 4"));

    // Reviews written by a user protect that user.
    let blocked_user = user_service::delete_user(&state, &admin, reviewer.user_id).await;
    assert!(matches!(blocked_user, Err(AppError::Protected(ref relation)) if relation == "product_reviews.reviewer"));

    // A basket row protects the product.
    let basket = basket_service::create_basket(
        &state,
        &admin,
        CreateBasketRequest {
            product_id: mug.id,
            user_id: admin.user_id,
            quantity: 2,
            discount: 0,
            cost: Decimal::new(2400, 2),
            session_key: String::new(),
            ordered: false,
        },
    )
    .await?
    .data
    .unwrap();
    let blocked = product_service::delete_product(&state, &admin, mug.id).await;
    assert!(matches!(blocked, Err(AppError::Protected(ref relation)) if relation == "baskets.product"));
    assert_eq!(ProductReviews::find().count(&state.orm).await?, 3);

    // Updates keep the rating untouched.
    let updated = product_service::update_product(
        &state,
        &admin,
        mug.id,
        UpdateProductRequest {
            quantity: Some(0),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.quantity, 0);

    basket_service::delete_basket(&state, &admin, basket.id).await?;
    product_service::delete_product(&state, &admin, mug.id).await?;

    assert!(Products::find_by_id(mug.id).one(&state.orm).await?.is_none());
    assert_eq!(
        ProductReviews::find()
            .filter(ReviewCol::ProductId.eq(mug.id))
            .count(&state.orm)
            .await?,
        0
    );
    assert_eq!(ProductImages::find().count(&state.orm).await?, 0);
    assert!(!media_dir.path().join(&image.image).exists());
    assert!(!media_dir.path().join(&replaced).exists());
    assert!(Catalogs::find_by_id(catalog).one(&state.orm).await?.is_some());

    let gone = product_service::get_rating(&state, &admin, mug.id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));

    // With its reviews gone the reviewer can be removed.
    user_service::delete_user(&state, &admin, reviewer.user_id).await?;

    // The emptied catalog can go too.
    catalog_service::delete_catalog(&state, &admin, catalog).await?;
    assert!(Catalogs::find_by_id(catalog).one(&state.orm).await?.is_none());

    Ok(())
}
