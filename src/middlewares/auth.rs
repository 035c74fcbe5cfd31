use crate::error::AppError;
use crate::utils::{AuthUser, JwtService};
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    // 仅对只读请求 (GET) 公开
    read_only_prefixes: Vec<&'static str>,
    // (方法, 路径) 完全匹配
    method_paths: Vec<(Method, &'static str)>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec!["/swagger-ui", "/swagger-ui/", "/api-docs/openapi.json"],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/"],
            read_only_prefixes: vec![
                "/api/v1/box-categories",
                "/api/v1/boxes",
                "/api/v1/items",
            ],
            method_paths: vec![
                (Method::GET, "/api/v1/game/scores"),
                (Method::POST, "/api/v1/subscriptions"),
                (Method::GET, "/api/v1/subscriptions/verify"),
                (Method::POST, "/api/v1/auth/sign-up"),
                (Method::POST, "/api/v1/auth/login"),
            ],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }

        if self
            .prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
        {
            return true;
        }

        if method == Method::GET
            && self
                .read_only_prefixes
                .iter()
                .any(|&prefix| path == prefix || path.starts_with(&format!("{prefix}/")))
        {
            return true;
        }

        let path = path.trim_end_matches('/');
        self.method_paths
            .iter()
            .any(|(m, p)| m == method && *p == path)
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if self.public_paths.is_public(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match token {
            Some(token) => match self.jwt_service.verify_access_token(token) {
                Ok(claims) => {
                    // 将当前用户添加到请求扩展中
                    req.extensions_mut().insert(AuthUser::from(claims));
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(_) => {
                    let error = AppError::AuthError("Invalid access token".to_string());
                    Box::pin(async move { Err(error.into()) })
                }
            },
            None => {
                let error = AppError::AuthError("Missing access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{ROLE_ADMIN, ROLE_USER};
    use actix_web::test as actix_test;
    use actix_web::{App, HttpRequest, HttpResponse, web};

    const SECRET: &str = "test-secret";

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match req.extensions().get::<AuthUser>() {
            Some(user) => HttpResponse::Ok().body(format!("{}:{}", user.id, user.role)),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public(&Method::GET, "/swagger-ui/index.html"));
        assert!(paths.is_public(&Method::GET, "/api/v1/boxes"));
        assert!(paths.is_public(&Method::GET, "/api/v1/boxes/3"));
        assert!(paths.is_public(&Method::GET, "/api/v1/items"));
        assert!(paths.is_public(&Method::GET, "/api/v1/box-categories/1"));
        assert!(paths.is_public(&Method::GET, "/api/v1/game/scores"));
        assert!(paths.is_public(&Method::POST, "/api/v1/subscriptions"));
        assert!(paths.is_public(&Method::GET, "/api/v1/subscriptions/verify"));
        assert!(paths.is_public(&Method::POST, "/api/v1/auth/sign-up"));
        assert!(paths.is_public(&Method::POST, "/api/v1/auth/login"));

        assert!(!paths.is_public(&Method::POST, "/api/v1/boxes"));
        assert!(!paths.is_public(&Method::POST, "/api/v1/boxes/3/spin"));
        assert!(!paths.is_public(&Method::DELETE, "/api/v1/items/1"));
        assert!(!paths.is_public(&Method::POST, "/api/v1/game/scores"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/subscriptions"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/boxesx"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/auth/me"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/inventory"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/subscriptions/all"));
    }

    #[actix_web::test]
    async fn test_token_injects_auth_user() {
        let jwt = JwtService::new(SECRET);
        let token = jwt.generate_access_token("42", ROLE_ADMIN, 3600).unwrap();

        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .route("/api/v1/boxes/{id}/spin", web::post().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/boxes/1/spin")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, "42:admin");
    }

    #[actix_web::test]
    async fn test_public_route_without_token() {
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(JwtService::new(SECRET)))
                .route("/api/v1/boxes", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/v1/boxes").to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, "anonymous");
    }

    #[actix_web::test]
    async fn test_missing_or_invalid_token_is_rejected() {
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(JwtService::new(SECRET)))
                .route("/api/v1/boxes/{id}/spin", web::post().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/boxes/1/spin")
            .to_request();
        let resp = actix_test::try_call_service(&app, req).await;
        let err = resp.err().unwrap();
        assert_eq!(
            err.as_response_error().status_code(),
            actix_web::http::StatusCode::UNAUTHORIZED
        );

        let other = JwtService::new("other-secret")
            .generate_access_token("1", ROLE_USER, 3600)
            .unwrap();
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/boxes/1/spin")
            .insert_header(("Authorization", format!("Bearer {other}")))
            .to_request();
        assert!(actix_test::try_call_service(&app, req).await.is_err());
    }
}
