use crate::entities::subscription_entity as subscriptions;
use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::external::MailgunService;
use crate::models::{
    BulkEmailResponse, CreateSubscriptionRequest, PaginationParams, SendBulkEmailRequest,
    SendToSpecificRequest, SubscriptionListResponse, SubscriptionResponse,
    VerifySubscriptionResponse,
};
use crate::utils::{generate_verification_token, normalize_email, validate_email};
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 验证后多久发送邀请邮件
const FOLLOW_UP_DELAY_HOURS: i64 = 24;

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DbPool,
    mailgun: MailgunService,
}

impl SubscriptionService {
    pub fn new(pool: DbPool, mailgun: MailgunService) -> Self {
        Self { pool, mailgun }
    }

    /// 订阅并发送确认邮件
    pub async fn create(&self, request: CreateSubscriptionRequest) -> AppResult<SubscriptionResponse> {
        validate_email(request.email.trim())?;
        let email = normalize_email(&request.email);
        let username = request.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::ValidationError("Username is required".to_string()));
        }
        let referrer_email = match request.referrer_email.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => {
                validate_email(r)?;
                Some(normalize_email(r))
            }
            _ => None,
        };

        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already subscribed".to_string()));
        }

        let model = self.insert(&email, &username, referrer_email).await?;
        log::info!("Subscription created: {email}");
        self.send_confirmation(&model).await;
        Ok(model.into())
    }

    /// 邮箱尚未订阅时自动订阅（提交游戏分数时使用）
    pub async fn subscribe_if_absent(
        &self,
        email: &str,
        username: &str,
    ) -> AppResult<Option<SubscriptionResponse>> {
        let email = normalize_email(email);
        if self.find_by_email(&email).await?.is_some() {
            return Ok(None);
        }

        let model = self.insert(&email, username.trim(), None).await?;
        log::info!("Subscription created from game score: {email}");
        self.send_confirmation(&model).await;
        Ok(Some(model.into()))
    }

    /// 校验邮箱验证令牌
    ///
    /// 成功后清空令牌、记录验证时间，并给推荐人 +1 积分（同一事务内）。
    pub async fn verify(&self, token: &str) -> AppResult<VerifySubscriptionResponse> {
        let token = token.trim();
        if token.is_empty() {
            return Err(invalid_token());
        }

        let txn = self.pool.begin().await?;

        let subscription = subscriptions::Entity::find()
            .filter(subscriptions::Column::VerificationToken.eq(token))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(invalid_token)?;

        if subscription.verified {
            return Ok(VerifySubscriptionResponse {
                message: "Email already verified".to_string(),
                data: None,
            });
        }

        let now = Utc::now();
        let mut am = subscription.into_active_model();
        am.verified = Set(true);
        am.verification_token = Set(None);
        am.verified_at = Set(Some(now));
        am.updated_at = Set(Some(now));
        let updated = am.update(&txn).await?;

        let mut referrer_credited = false;
        if let Some(referrer) = &updated.referrer_email {
            let result = subscriptions::Entity::update_many()
                .col_expr(
                    subscriptions::Column::Points,
                    Expr::col(subscriptions::Column::Points).add(1),
                )
                .filter(subscriptions::Column::Email.eq(referrer.as_str()))
                .exec(&txn)
                .await?;
            if result.rows_affected > 0 {
                log::info!("Referrer {referrer} credited for {}", updated.email);
                referrer_credited = true;
            }
        }

        txn.commit().await?;

        log::info!("Subscription verified: {}", updated.email);
        self.send_verified_emails(&updated, referrer_credited).await;
        Ok(VerifySubscriptionResponse {
            message: "Email verified successfully".to_string(),
            data: Some(updated.into()),
        })
    }

    /// 订阅列表（按创建时间倒序）
    pub async fn list(&self, params: &PaginationParams) -> AppResult<SubscriptionListResponse> {
        let total = subscriptions::Entity::find().count(self.pool.as_ref()).await?;

        let models = subscriptions::Entity::find()
            .order_by_desc(subscriptions::Column::CreatedAt)
            .order_by_desc(subscriptions::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?;

        Ok(SubscriptionListResponse {
            total,
            data: models.into_iter().map(SubscriptionResponse::from).collect(),
        })
    }

    /// 全部订阅（不分页，按创建时间倒序）
    pub async fn list_all(&self) -> AppResult<Vec<SubscriptionResponse>> {
        let models = subscriptions::Entity::find()
            .order_by_desc(subscriptions::Column::CreatedAt)
            .order_by_desc(subscriptions::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        Ok(models.into_iter().map(SubscriptionResponse::from).collect())
    }

    /// 给所有订阅邮箱群发邮件
    pub async fn send_email_to_all(&self, request: &SendBulkEmailRequest) -> AppResult<BulkEmailResponse> {
        validate_email_content(&request.subject, &request.message)?;

        let recipients: Vec<String> = subscriptions::Entity::find()
            .order_by_asc(subscriptions::Column::Id)
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|s| s.email)
            .collect();

        if recipients.is_empty() {
            return Ok(BulkEmailResponse {
                message: "No subscribers found".to_string(),
                total: 0,
                sent: 0,
                failed: 0,
            });
        }

        let (sent, failed) = self
            .send_custom(&recipients, &request.subject, &request.message)
            .await;
        log::info!("Bulk email sent to {sent} subscribers, {failed} failed");
        Ok(BulkEmailResponse {
            message: "Emails sent to all subscribers".to_string(),
            total: recipients.len(),
            sent,
            failed,
        })
    }

    /// 给指定邮箱发送邮件（不要求已订阅）
    pub async fn send_email_to_specific(
        &self,
        request: &SendToSpecificRequest,
    ) -> AppResult<BulkEmailResponse> {
        validate_email_content(&request.subject, &request.message)?;

        let mut recipients: Vec<String> = Vec::with_capacity(request.emails.len());
        for email in &request.emails {
            validate_email(email.trim())?;
            let email = normalize_email(email);
            if !recipients.contains(&email) {
                recipients.push(email);
            }
        }

        if recipients.is_empty() {
            return Ok(BulkEmailResponse {
                message: "No emails provided".to_string(),
                total: 0,
                sent: 0,
                failed: 0,
            });
        }

        let (sent, failed) = self
            .send_custom(&recipients, &request.subject, &request.message)
            .await;
        Ok(BulkEmailResponse {
            message: "Emails sent to selected subscribers".to_string(),
            total: recipients.len(),
            sent,
            failed,
        })
    }

    /// 给验证超过 24 小时且未发送过邀请的订阅发送邀请邮件
    ///
    /// 单个订阅发送失败只记录日志，不影响其余订阅。返回成功发送的数量。
    pub async fn send_follow_ups(&self) -> AppResult<usize> {
        let cutoff = Utc::now() - Duration::hours(FOLLOW_UP_DELAY_HOURS);

        let pending = subscriptions::Entity::find()
            .filter(subscriptions::Column::Verified.eq(true))
            .filter(subscriptions::Column::FollowUpEmailSent.eq(false))
            .filter(subscriptions::Column::VerifiedAt.lte(cutoff))
            .order_by_asc(subscriptions::Column::Id)
            .all(self.pool.as_ref())
            .await?;

        let mut sent = 0;
        for subscription in pending {
            if let Err(e) = self
                .mailgun
                .send_invite_email(&subscription.email, &subscription.username)
                .await
            {
                log::error!(
                    "Failed to send follow-up email to {}: {e}",
                    subscription.email
                );
                continue;
            }

            subscriptions::Entity::update_many()
                .col_expr(subscriptions::Column::FollowUpEmailSent, Expr::value(true))
                .col_expr(subscriptions::Column::UpdatedAt, Expr::value(Some(Utc::now())))
                .filter(subscriptions::Column::Id.eq(subscription.id))
                .exec(self.pool.as_ref())
                .await?;
            sent += 1;
        }

        Ok(sent)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<subscriptions::Model>> {
        Ok(subscriptions::Entity::find()
            .filter(subscriptions::Column::Email.eq(email))
            .one(self.pool.as_ref())
            .await?)
    }

    async fn insert(
        &self,
        email: &str,
        username: &str,
        referrer_email: Option<String>,
    ) -> AppResult<subscriptions::Model> {
        let model = subscriptions::ActiveModel {
            email: Set(email.to_string()),
            username: Set(username.to_string()),
            verification_token: Set(Some(generate_verification_token())),
            verified: Set(false),
            verified_at: Set(None),
            referrer_email: Set(referrer_email),
            points: Set(0),
            follow_up_email_sent: Set(false),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;
        Ok(model)
    }

    // 逐个发送，失败只记录日志；返回 (成功数, 失败数)
    async fn send_custom(&self, recipients: &[String], subject: &str, html: &str) -> (usize, usize) {
        let mut sent = 0;
        let mut failed = 0;
        for email in recipients {
            match self.mailgun.send_custom_email(email, subject, html).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    log::error!("Failed to send email to {email}: {e}");
                    failed += 1;
                }
            }
        }
        (sent, failed)
    }

    /// 验证成功后：欢迎邮件，以及给推荐人的推荐成功邮件
    async fn send_verified_emails(&self, subscription: &subscriptions::Model, referrer_credited: bool) {
        if let Err(e) = self
            .mailgun
            .send_welcome_email(&subscription.email, &subscription.username)
            .await
        {
            log::error!("Failed to send welcome email to {}: {e}", subscription.email);
        }

        let Some(referrer_email) = subscription.referrer_email.as_deref() else {
            return;
        };
        if !referrer_credited {
            return;
        }
        match self.find_by_email(referrer_email).await {
            Ok(Some(referrer)) => {
                if let Err(e) = self
                    .mailgun
                    .send_referral_success_email(&referrer.email, &referrer.username, referrer.points)
                    .await
                {
                    log::error!("Failed to send referral email to {referrer_email}: {e}");
                }
            }
            Ok(None) => {}
            Err(e) => log::error!("Failed to load referrer {referrer_email}: {e}"),
        }
    }

    /// 邮件发送失败只记录日志
    async fn send_confirmation(&self, subscription: &subscriptions::Model) {
        let Some(token) = subscription.verification_token.as_deref() else {
            return;
        };
        if let Err(e) = self
            .mailgun
            .send_confirmation_email(&subscription.email, &subscription.username, token)
            .await
        {
            log::error!(
                "Failed to send confirmation email to {}: {e}",
                subscription.email
            );
        }
    }
}

fn validate_email_content(subject: &str, message: &str) -> AppResult<()> {
    if subject.trim().is_empty() {
        return Err(AppError::ValidationError("Subject is required".to_string()));
    }
    if message.trim().is_empty() {
        return Err(AppError::ValidationError("Message is required".to_string()));
    }
    Ok(())
}

fn invalid_token() -> AppError {
    AppError::Conflict("Invalid or expired verification token".to_string())
}
