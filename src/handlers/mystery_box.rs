use crate::models::*;
use crate::services::BoxService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use super::{current_user, require_admin, require_user_id};

#[utoipa::path(
    post,
    path = "/boxes",
    tag = "box",
    request_body = CreateBoxRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建盲盒成功", body = BoxResponse),
        (status = 400, description = "参数错误"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn create_box(
    service: web::Data<BoxService>,
    req: HttpRequest,
    body: web::Json<CreateBoxRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.create(body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/boxes",
    tag = "box",
    responses(
        (status = 200, description = "盲盒列表（附带奖品）", body = [BoxResponse])
    )
)]
pub async fn list_boxes(service: web::Data<BoxService>) -> Result<HttpResponse> {
    match service.list().await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/boxes/{id}",
    tag = "box",
    params(
        ("id" = i64, Path, description = "盲盒ID")
    ),
    responses(
        (status = 200, description = "盲盒详情", body = BoxResponse),
        (status = 404, description = "盲盒不存在")
    )
)]
pub async fn get_box(service: web::Data<BoxService>, path: web::Path<i64>) -> Result<HttpResponse> {
    match service.get(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/boxes/{id}",
    tag = "box",
    params(
        ("id" = i64, Path, description = "盲盒ID")
    ),
    request_body = UpdateBoxRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = BoxResponse),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "盲盒不存在")
    )
)]
pub async fn update_box(
    service: web::Data<BoxService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateBoxRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.update(path.into_inner(), body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/boxes/{id}",
    tag = "box",
    params(
        ("id" = i64, Path, description = "盲盒ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功（奖品一并删除）"),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "盲盒不存在")
    )
)]
pub async fn delete_box(
    service: web::Data<BoxService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Box deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/boxes/{id}/spin",
    tag = "box",
    params(
        ("id" = i64, Path, description = "盲盒ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "开盒成功，返回奖品与结算后的财务数据", body = SpinResponse),
        (status = 401, description = "未授权"),
        (status = 404, description = "盲盒不存在"),
        (status = 422, description = "盲盒没有可抽取的奖品"),
        (status = 500, description = "结算写入失败，未做任何修改")
    )
)]
/// 开盒：按权重抽取奖品并原子地更新盲盒财务数据
pub async fn spin_box(
    service: web::Data<BoxService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    // 登录用户抽中的奖品记入背包
    let user_id = match current_user(&req) {
        Some(_) => match require_user_id(&req) {
            Ok(id) => Some(id),
            Err(e) => return Ok(e.error_response()),
        },
        None => None,
    };
    match service.spin(path.into_inner(), user_id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn box_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/boxes")
            .route("", web::post().to(create_box))
            .route("", web::get().to(list_boxes))
            .route("/{id}", web::get().to(get_box))
            .route("/{id}", web::put().to(update_box))
            .route("/{id}", web::delete().to(delete_box))
            .route("/{id}/spin", web::post().to(spin_box)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::FixedSequence;
    use crate::entities::{ItemStatus, box_entity as boxes, item_entity as items};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use actix_web::App;
    use chrono::Utc;
    use sea_orm::prelude::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::Value;
    use std::sync::Arc;

    fn box_model() -> boxes::Model {
        boxes::Model {
            id: 1,
            title: "Football Box".into(),
            description: None,
            location: "Dubai".into(),
            price: Decimal::from(50),
            image_url: "img".into(),
            background_image: "bg".into(),
            is_active: true,
            order: 0,
            box_category_id: 1,
            purchased_count: 0,
            total_revenue: Decimal::ZERO,
            total_payout: Decimal::ZERO,
            exchangeable_payout: Decimal::ZERO,
            retained_profit_percentage: Decimal::ZERO,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    fn item() -> items::Model {
        items::Model {
            id: 7,
            box_id: 1,
            name: "Prize 3".into(),
            description: None,
            image_url: None,
            price: Decimal::from(20),
            percentage: 1.0,
            status: ItemStatus::Common,
            is_exchangeable: None,
            view_count: 0,
            click_count: 0,
            opened_count: 0,
            purchased_count: 0,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    #[actix_web::test]
    async fn test_spin_endpoint_returns_prize_and_financials() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![box_model()]])
            .append_query_results([vec![item()]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let service = BoxService::with_random(Arc::new(db), Arc::new(FixedSequence::new(vec![0.2])));

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(box_config),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/boxes/1/spin")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["prize"]["id"], 7);
        assert_eq!(body["data"]["prize"]["name"], "Prize 3");
        assert_eq!(body["data"]["box"]["title"], "Football Box");
        assert_eq!(body["data"]["box"]["price"], 50.0);
        assert_eq!(body["data"]["prize"]["price"], 20.0);

        // 客户端按驼峰键名读取数字金额
        let financials = &body["data"]["financials"];
        assert_eq!(financials["totalRevenue"], 50.0);
        assert_eq!(financials["totalPayout"], 20.0);
        assert_eq!(financials["exchangeablePayout"], 20.0);
        assert_eq!(financials["retainedProfit"], 0.0);
        assert_eq!(financials["netProfit"], 30.0);
        assert!(financials.get("total_revenue").is_none());
    }

    #[actix_web::test]
    async fn test_spin_missing_box_is_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<boxes::Model>::new()])
            .into_connection();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(BoxService::new(Arc::new(db))))
                .configure(box_config),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/boxes/9/spin")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_spin_rejects_non_numeric_subject() {
        use crate::middlewares::AuthMiddleware;
        use crate::utils::{JwtService, ROLE_USER};

        let jwt = JwtService::new("test-secret");
        let token = jwt.generate_access_token("guest", ROLE_USER, 3600).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt))
                .app_data(web::Data::new(BoxService::new(Arc::new(db))))
                .configure(box_config),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/boxes/1/spin")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_create_requires_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(BoxService::new(Arc::new(db))))
                .configure(box_config),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/boxes")
            .set_json(serde_json::json!({
                "title": "Box",
                "location": "Dubai",
                "price": "10",
                "image_url": "img",
                "background_image": "bg",
                "box_category_id": 1
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
