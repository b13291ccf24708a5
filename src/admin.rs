//! Admin screen descriptors.
//!
//! Every administered entity is described by a static [`ModelAdmin`] table: which columns the
//! list screen shows, which of them link to the detail screen, which fields free-text search
//! and filters apply to, and which bulk actions are offered. The list services read the same
//! tables, so a field that is not declared here cannot be searched or filtered on.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct AdminAction {
    pub name: &'static str,
    pub description: &'static str,
}

pub const MARK_SOFTDELETE: AdminAction = AdminAction {
    name: "mark_softdelete",
    description: "Mark for deletion",
};

pub const MARK_UNSOFTDELETE: AdminAction = AdminAction {
    name: "mark_unsoftdelete",
    description: "Unmark for deletion",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Fieldset {
    pub title: &'static str,
    #[schema(value_type = Vec<String>)]
    pub fields: &'static [&'static str],
    pub description: Option<&'static str>,
    pub collapsed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ModelAdmin {
    pub name: &'static str,
    pub verbose_name: &'static str,
    #[schema(value_type = Vec<String>)]
    pub list_display: &'static [&'static str],
    #[schema(value_type = Vec<String>)]
    pub list_display_links: &'static [&'static str],
    #[schema(value_type = Vec<String>)]
    pub ordering: &'static [&'static str],
    #[schema(value_type = Vec<String>)]
    pub search_fields: &'static [&'static str],
    #[schema(value_type = Vec<String>)]
    pub list_filter: &'static [&'static str],
    #[schema(value_type = Vec<String>)]
    pub list_editable: &'static [&'static str],
    #[schema(value_type = Vec<AdminAction>)]
    pub actions: &'static [AdminAction],
    #[schema(value_type = Vec<Fieldset>)]
    pub fieldsets: &'static [Fieldset],
    #[schema(value_type = Vec<String>)]
    pub inlines: &'static [&'static str],
}

impl ModelAdmin {
    pub fn searches(&self, field: &str) -> bool {
        self.search_fields.contains(&field)
    }

    pub fn filters(&self, field: &str) -> bool {
        self.list_filter.contains(&field)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.iter().any(|action| action.name == name)
    }
}

const SOFTDELETE_ACTIONS: &[AdminAction] = &[MARK_SOFTDELETE, MARK_UNSOFTDELETE];

pub const CATALOG_ADMIN: ModelAdmin = ModelAdmin {
    name: "catalogs",
    verbose_name: "catalog",
    list_display: &["pk", "date", "name", "description_short", "image_show", "softdelete"],
    list_display_links: &["pk", "name", "description_short"],
    ordering: &["pk"],
    search_fields: &["date", "name", "description"],
    list_filter: &["softdelete", "date"],
    list_editable: &["softdelete"],
    actions: SOFTDELETE_ACTIONS,
    fieldsets: &[
        Fieldset {
            title: "Catalog options",
            fields: &["name", "description"],
            description: None,
            collapsed: false,
        },
        Fieldset {
            title: "Image",
            fields: &["preview"],
            description: None,
            collapsed: false,
        },
    ],
    inlines: &[],
};

pub const PRODUCT_ADMIN: ModelAdmin = ModelAdmin {
    name: "products",
    verbose_name: "product",
    list_display: &[
        "pk",
        "date",
        "catalog",
        "name",
        "quantity",
        "cost",
        "description_short",
        "discount",
        "get_stars",
        "softdelete",
    ],
    list_display_links: &["pk", "name", "description_short"],
    ordering: &["pk"],
    search_fields: &["name", "catalog", "cost"],
    list_filter: &["softdelete", "date"],
    list_editable: &["softdelete"],
    actions: SOFTDELETE_ACTIONS,
    fieldsets: &[
        Fieldset {
            title: "Product options",
            fields: &["name", "description", "catalog"],
            description: None,
            collapsed: false,
        },
        Fieldset {
            title: "Image",
            fields: &["preview"],
            description: None,
            collapsed: false,
        },
        Fieldset {
            title: "Price and stock",
            fields: &["cost", "discount", "quantity"],
            description: None,
            collapsed: false,
        },
        Fieldset {
            title: "Soft delete",
            fields: &["softdelete"],
            description: Some("Mark the product for deletion"),
            collapsed: true,
        },
    ],
    inlines: &["reviews", "images"],
};

pub const REVIEW_ADMIN: ModelAdmin = ModelAdmin {
    name: "reviews",
    verbose_name: "review",
    list_display: &["pk", "date", "review_short", "star", "reviewer", "get_product"],
    list_display_links: &["pk", "review_short"],
    ordering: &["pk"],
    search_fields: &["review"],
    list_filter: &[],
    list_editable: &[],
    actions: &[],
    fieldsets: &[],
    inlines: &[],
};

pub const BASKET_ADMIN: ModelAdmin = ModelAdmin {
    name: "baskets",
    verbose_name: "basket",
    list_display: &[
        "pk",
        "date",
        "get_product",
        "quantity",
        "discount",
        "cost",
        "user",
        "ordered",
        "softdelete",
    ],
    list_display_links: &["pk", "date", "get_product"],
    ordering: &["pk"],
    search_fields: &["user"],
    list_filter: &["softdelete", "date", "user"],
    list_editable: &["softdelete"],
    actions: SOFTDELETE_ACTIONS,
    fieldsets: &[],
    inlines: &[],
};

pub const REGISTRY: &[ModelAdmin] = &[CATALOG_ADMIN, PRODUCT_ADMIN, REVIEW_ADMIN, BASKET_ADMIN];

pub fn lookup(name: &str) -> Option<&'static ModelAdmin> {
    REGISTRY.iter().find(|admin| admin.name == name)
}
