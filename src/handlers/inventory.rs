use crate::models::*;
use crate::services::InventoryService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use super::require_user_id;

#[utoipa::path(
    get,
    path = "/inventory",
    tag = "inventory",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户的背包", body = InventoryListResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_inventory(
    service: web::Data<InventoryService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list(user_id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/inventory",
    tag = "inventory",
    request_body = AddInventoryItemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已加入背包", body = InventoryItemResponse),
        (status = 400, description = "奖品已在背包中"),
        (status = 404, description = "奖品或盲盒不存在")
    )
)]
pub async fn add_inventory_item(
    service: web::Data<InventoryService>,
    req: HttpRequest,
    body: web::Json<AddInventoryItemRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.add(user_id, body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/inventory/{id}/sell",
    tag = "inventory",
    params(
        ("id" = i64, Path, description = "背包记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "出售成功，奖品价格已计入钱包", body = SellInventoryItemResponse),
        (status = 404, description = "记录不存在或已出售")
    )
)]
pub async fn sell_inventory_item(
    service: web::Data<InventoryService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.sell(user_id, path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/inventory/{id}",
    tag = "inventory",
    params(
        ("id" = i64, Path, description = "背包记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已删除"),
        (status = 404, description = "记录不存在")
    )
)]
pub async fn delete_inventory_item(
    service: web::Data<InventoryService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.delete(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Inventory item deleted successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn inventory_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/inventory")
            .route("", web::get().to(list_inventory))
            .route("", web::post().to(add_inventory_item))
            .route("/{id}/sell", web::put().to(sell_inventory_item))
            .route("/{id}", web::delete().to(delete_inventory_item)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::AuthMiddleware;
    use crate::utils::{JwtService, ROLE_USER};
    use actix_web::App;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    const SECRET: &str = "test-secret";

    #[actix_web::test]
    async fn test_inventory_requires_login() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(InventoryService::new(Arc::new(db))))
                .configure(inventory_config),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/inventory").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_delete_uses_token_subject() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let jwt = JwtService::new(SECRET);
        let token = jwt.generate_access_token("5", ROLE_USER, 3600).unwrap();
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt))
                .app_data(web::Data::new(InventoryService::new(Arc::new(db))))
                .configure(inventory_config),
        )
        .await;

        let req = actix_test::TestRequest::delete()
            .uri("/inventory/3")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
