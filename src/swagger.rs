use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::draw::SelectedPrize;
use crate::entities::{InventoryStatus, ItemStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::new);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::box_category::create_category,
        handlers::box_category::list_categories,
        handlers::box_category::get_category,
        handlers::box_category::update_category,
        handlers::box_category::delete_category,
        handlers::mystery_box::create_box,
        handlers::mystery_box::list_boxes,
        handlers::mystery_box::get_box,
        handlers::mystery_box::update_box,
        handlers::mystery_box::delete_box,
        handlers::mystery_box::spin_box,
        handlers::item::create_item,
        handlers::item::list_items,
        handlers::item::get_item,
        handlers::item::update_item,
        handlers::item::delete_item,
        handlers::game::submit_score,
        handlers::game::top_scores,
        handlers::subscription::subscribe,
        handlers::subscription::verify,
        handlers::subscription::list_subscriptions,
        handlers::subscription::list_all_subscriptions,
        handlers::subscription::send_email_to_all,
        handlers::subscription::send_email_to_specific,
        handlers::auth::sign_up,
        handlers::auth::login,
        handlers::auth::me,
        handlers::inventory::list_inventory,
        handlers::inventory::add_inventory_item,
        handlers::inventory::sell_inventory_item,
        handlers::inventory::delete_inventory_item,
    ),
    components(
        schemas(
            CreateBoxCategoryRequest,
            UpdateBoxCategoryRequest,
            BoxCategoryResponse,
            CreateBoxRequest,
            UpdateBoxRequest,
            BoxResponse,
            SpinResponse,
            SpinFinancials,
            SpinBox,
            SelectedPrize,
            CreateItemRequest,
            UpdateItemRequest,
            ItemResponse,
            ItemPageResponse,
            ItemStatus,
            PageMeta,
            SubmitScoreRequest,
            ScoreResponse,
            CreateSubscriptionRequest,
            SubscriptionResponse,
            VerifySubscriptionResponse,
            SubscriptionListResponse,
            SendBulkEmailRequest,
            SendToSpecificRequest,
            BulkEmailResponse,
            SignUpRequest,
            LoginRequest,
            UserResponse,
            AuthResponse,
            AddInventoryItemRequest,
            InventoryItemResponse,
            InventoryListResponse,
            SellInventoryItemResponse,
            InventoryStatus,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "box_category", description = "Box category API"),
        (name = "box", description = "Mystery box and spin API"),
        (name = "item", description = "Prize item API"),
        (name = "game", description = "Game leaderboard API"),
        (name = "subscription", description = "Email subscription API"),
        (name = "auth", description = "Sign-up and login API"),
        (name = "inventory", description = "Won prize inventory API"),
    ),
    info(
        title = "Mystery Box Backend API",
        version = "1.0.0",
        description = "Mystery box catalogue, prize draw and settlement REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_contains_spin_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/boxes/{id}/spin"));
        assert!(doc.paths.paths.contains_key("/items"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("ItemPageResponse"));
        assert!(doc.paths.paths.contains_key("/auth/login"));
        assert!(doc.paths.paths.contains_key("/inventory/{id}/sell"));
        assert!(doc.paths.paths.contains_key("/subscriptions/send-email-to-all"));
        assert!(components.schemas.contains_key("SellInventoryItemResponse"));
    }
}
