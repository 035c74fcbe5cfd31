use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use super::require_user_id;

#[utoipa::path(
    post,
    path = "/auth/sign-up",
    tag = "auth",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "注册成功，返回访问令牌", body = AuthResponse),
        (status = 400, description = "参数错误"),
        (status = 409, description = "邮箱已注册")
    )
)]
pub async fn sign_up(
    service: web::Data<AuthService>,
    body: web::Json<SignUpRequest>,
) -> Result<HttpResponse> {
    match service.sign_up(body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = AuthResponse),
        (status = 401, description = "邮箱或密码错误")
    )
)]
pub async fn login(
    service: web::Data<AuthService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match service.login(body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户信息", body = UserResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn me(service: web::Data<AuthService>, req: HttpRequest) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.profile(user_id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/sign-up", web::post().to(sign_up))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user_entity as users;
    use crate::middlewares::AuthMiddleware;
    use crate::utils::{JwtService, ROLE_USER};
    use actix_web::App;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::Utc;
    use sea_orm::prelude::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::Value;
    use std::sync::Arc;

    const SECRET: &str = "test-secret";

    fn user() -> users::Model {
        users::Model {
            id: 3,
            email: "jane@example.com".into(),
            username: "jane".into(),
            password_hash: bcrypt::hash("mystery123", 4).unwrap(),
            role: ROLE_USER.into(),
            balance: Decimal::ZERO,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    #[actix_web::test]
    async fn test_login_token_opens_protected_routes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user()]])
            .append_query_results([vec![user()]])
            .into_connection();
        let jwt = JwtService::new(SECRET);
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .app_data(web::Data::new(AuthService::new(Arc::new(db), jwt, 3600)))
                .service(web::scope("/api/v1").configure(auth_config)),
        )
        .await;

        // 登录接口无需令牌
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(serde_json::json!({ "email": "jane@example.com", "password": "mystery123" }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        let token = body["data"]["access_token"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["user"]["id"], 3);
        assert!(body["data"]["user"].get("password_hash").is_none());

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["email"], "jane@example.com");
    }

    #[actix_web::test]
    async fn test_login_with_bad_password_is_401() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user()]])
            .into_connection();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(AuthService::new(
                    Arc::new(db),
                    JwtService::new(SECRET),
                    3600,
                )))
                .configure(auth_config),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/auth/login")
            .set_json(serde_json::json!({ "email": "jane@example.com", "password": "wrong-pass1" }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
