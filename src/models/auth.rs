use chrono::{DateTime, Utc};
use sea_orm::prelude::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::user_entity as users;

/// 邮箱注册
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SignUpRequest {
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "jane")]
    pub username: String,
    #[schema(example = "mystery123")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "mystery123")]
    pub password: String,
}

/// 用户信息（不含密码哈希）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: String,
    /// 钱包余额
    #[schema(value_type = String, example = "0")]
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for UserResponse {
    fn from(m: users::Model) -> Self {
        UserResponse {
            id: m.id,
            email: m.email,
            username: m.username,
            role: m.role,
            balance: m.balance,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 注册 / 登录成功后返回的令牌
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// 有效期（秒）
    pub expires_in: i64,
}
