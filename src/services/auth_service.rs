use crate::database::DbPool;
use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, SignUpRequest, UserResponse};
use crate::utils::{
    JwtService, ROLE_USER, hash_password, normalize_email, validate_email, validate_password,
    verify_password,
};
use chrono::Utc;
use sea_orm::prelude::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

#[derive(Clone)]
pub struct AuthService {
    pool: DbPool,
    jwt_service: JwtService,
    access_token_expires_in: i64,
}

impl AuthService {
    pub fn new(pool: DbPool, jwt_service: JwtService, access_token_expires_in: i64) -> Self {
        Self {
            pool,
            jwt_service,
            access_token_expires_in,
        }
    }

    /// 邮箱 + 密码注册，成功后直接签发访问令牌
    pub async fn sign_up(&self, request: SignUpRequest) -> AppResult<AuthResponse> {
        validate_email(request.email.trim())?;
        let email = normalize_email(&request.email);
        let username = request.username.trim().to_string();
        if username.is_empty() || username.len() > 255 {
            return Err(AppError::ValidationError(
                "Username length must be between 1 and 255 characters".to_string(),
            ));
        }
        validate_password(&request.password)?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let user = users::ActiveModel {
            email: Set(email),
            username: Set(username),
            password_hash: Set(password_hash),
            role: Set(ROLE_USER.to_string()),
            balance: Set(Decimal::ZERO),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("User registered: {} ({})", user.email, user.id);
        self.issue(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);

        // 用户不存在与密码错误返回同一提示
        let user = self
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid_credentials)?;
        if !verify_password(&request.password, &user.password_hash)? {
            log::warn!("Login failed for {email}");
            return Err(invalid_credentials());
        }

        self.issue(user)
    }

    /// 当前用户信息（含钱包余额）
    pub async fn profile(&self, user_id: i64) -> AppResult<UserResponse> {
        users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    fn issue(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(
            &user.id.to_string(),
            &user.role,
            self.access_token_expires_in,
        )?;

        Ok(AuthResponse {
            user: user.into(),
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expires_in,
        })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.pool.as_ref())
            .await?)
    }
}

fn invalid_credentials() -> AppError {
    AppError::AuthError("Invalid email or password".to_string())
}
