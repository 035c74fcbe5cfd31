pub mod auth;
pub mod box_category;
pub mod game;
pub mod inventory;
pub mod item;
pub mod mystery_box;
pub mod subscription;

pub use auth::auth_config;
pub use box_category::box_category_config;
pub use game::game_config;
pub use inventory::inventory_config;
pub use item::item_config;
pub use mystery_box::box_config;
pub use subscription::subscription_config;

use crate::error::{AppError, AppResult};
use crate::utils::AuthUser;
use actix_web::{HttpMessage, HttpRequest};

/// 从请求扩展中获取当前用户（中间件在鉴权后注入）
fn current_user(req: &HttpRequest) -> Option<AuthUser> {
    req.extensions().get::<AuthUser>().cloned()
}

/// 目录写操作与订阅列表仅限管理员
fn require_admin(req: &HttpRequest) -> AppResult<AuthUser> {
    match current_user(req) {
        Some(user) if user.is_admin() => Ok(user),
        Some(_) | None => Err(AppError::Forbidden),
    }
}

/// 当前登录用户的数字 ID
fn require_user_id(req: &HttpRequest) -> AppResult<i64> {
    let user = current_user(req)
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))?;
    user.id
        .parse()
        .map_err(|_| AppError::AuthError("Invalid user id in access token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_require_admin() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(require_admin(&req), Err(AppError::Forbidden)));

        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthUser {
            id: "1".into(),
            role: "user".into(),
        });
        assert!(matches!(require_admin(&req), Err(AppError::Forbidden)));

        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthUser {
            id: "2".into(),
            role: "admin".into(),
        });
        assert_eq!(require_admin(&req).unwrap().id, "2");
    }

    #[test]
    fn test_require_user_id() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(require_user_id(&req), Err(AppError::AuthError(_))));

        req.extensions_mut().insert(AuthUser {
            id: "abc".into(),
            role: "user".into(),
        });
        assert!(matches!(require_user_id(&req), Err(AppError::AuthError(_))));

        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthUser {
            id: "42".into(),
            role: "user".into(),
        });
        assert_eq!(require_user_id(&req).unwrap(), 42);
    }
}
