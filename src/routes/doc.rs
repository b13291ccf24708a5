use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    admin::{AdminAction, Fieldset, ModelAdmin},
    display::AverageRating,
    dto::{
        admin::{BulkActionResult, ListEditResult, ModelAdminList},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        baskets::{
            AddToBasketRequest, BasketItemDto, BasketList, BasketRow, CreateBasketRequest,
            UpdateBasketRequest, UserBasketList,
        },
        catalogs::{CatalogList, CatalogRow, CreateCatalogRequest, UpdateCatalogRequest},
        products::{
            CreateProductRequest, ProductDetail, ProductImageList, ProductList, ProductRow,
            UpdateProductRequest,
        },
        reviews::{
            CreateReviewRequest, InlineReviewRequest, ReviewList, ReviewRow, UpdateReviewRequest,
        },
        users::UserList,
    },
    error::FieldError,
    models::{Basket, Catalog, Product, ProductImage, ProductReview, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, basket, baskets, catalogs, health, pages, params, products, reviews, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        pages::index,
        auth::login,
        auth::register,
        basket::basket_list,
        basket::add_to_basket,
        basket::remove_from_basket,
        admin::list_meta,
        admin::get_meta,
        catalogs::list_catalogs,
        catalogs::get_catalog,
        catalogs::create_catalog,
        catalogs::update_catalog,
        catalogs::delete_catalog,
        catalogs::upload_preview,
        catalogs::run_action,
        catalogs::list_edit,
        products::list_products,
        products::get_product,
        products::get_rating,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::upload_preview,
        products::list_images,
        products::add_image,
        products::delete_image,
        products::add_review,
        products::update_review,
        products::delete_review,
        products::run_action,
        products::list_edit,
        reviews::list_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        baskets::list_baskets,
        baskets::get_basket,
        baskets::create_basket,
        baskets::update_basket,
        baskets::delete_basket,
        baskets::run_action,
        baskets::list_edit,
        users::list_users,
        users::delete_user
    ),
    components(
        schemas(
            User,
            Catalog,
            Product,
            ProductImage,
            ProductReview,
            Basket,
            AverageRating,
            FieldError,
            AdminAction,
            Fieldset,
            ModelAdmin,
            ModelAdminList,
            BulkActionResult,
            ListEditResult,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateCatalogRequest,
            UpdateCatalogRequest,
            CatalogRow,
            CatalogList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductRow,
            ProductList,
            ProductDetail,
            ProductImageList,
            InlineReviewRequest,
            CreateReviewRequest,
            UpdateReviewRequest,
            ReviewRow,
            ReviewList,
            CreateBasketRequest,
            UpdateBasketRequest,
            BasketRow,
            BasketList,
            AddToBasketRequest,
            BasketItemDto,
            UserBasketList,
            UserList,
            params::Pagination,
            params::AdminListQuery,
            params::DateFilter,
            params::BulkActionRequest,
            params::ListEditRow,
            params::ListEditRequest,
            Meta,
            ApiResponse<Catalog>,
            ApiResponse<CatalogList>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<ReviewList>,
            ApiResponse<BasketList>,
            ApiResponse<UserBasketList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Pages", description = "Public pages"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Basket", description = "Basket of the signed-in user"),
        (name = "Admin", description = "Admin screen descriptors"),
        (name = "Catalogs", description = "Catalog administration"),
        (name = "Products", description = "Product administration with inline reviews and images"),
        (name = "Reviews", description = "Review administration"),
        (name = "Baskets", description = "Basket administration"),
        (name = "Users", description = "User administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_admin_screen_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/admin/catalogs",
            "/api/admin/products/{id}/reviews/{review_id}",
            "/api/admin/baskets/actions/{action}",
            "/api/admin/users/{id}",
            "/api/basket",
            "/",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
