use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::subscription_entity as subscriptions;

/// 订阅请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "jane")]
    pub username: String,
    /// 推荐人邮箱（验证后推荐人 +1 积分）
    #[schema(example = "friend@example.com")]
    pub referrer_email: Option<String>,
}

/// 邮箱验证参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerifySubscriptionQuery {
    pub token: String,
}

/// 订阅响应（不返回验证令牌）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub referrer_email: Option<String>,
    pub points: i64,
    pub follow_up_email_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl From<subscriptions::Model> for SubscriptionResponse {
    fn from(m: subscriptions::Model) -> Self {
        SubscriptionResponse {
            id: m.id,
            email: m.email,
            username: m.username,
            verified: m.verified,
            verified_at: m.verified_at,
            referrer_email: m.referrer_email,
            points: m.points,
            follow_up_email_sent: m.follow_up_email_sent,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 验证结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerifySubscriptionResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SubscriptionResponse>,
}

/// 订阅列表 (按创建时间倒序)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionListResponse {
    pub total: u64,
    pub data: Vec<SubscriptionResponse>,
}

/// 群发邮件请求（HTML 正文）
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SendBulkEmailRequest {
    #[schema(example = "Special Offer!")]
    pub subject: String,
    #[schema(example = "<h1>Hello</h1><p>Thanks for subscribing!</p>")]
    pub message: String,
}

/// 向指定邮箱发送邮件
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SendToSpecificRequest {
    #[schema(example = json!(["user1@example.com", "user2@example.com"]))]
    pub emails: Vec<String>,
    #[schema(example = "New Announcement!")]
    pub subject: String,
    #[schema(example = "<h1>Update</h1><p>We have some great news!</p>")]
    pub message: String,
}

/// 群发结果，单个收件人失败只计入 failed
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkEmailResponse {
    pub message: String,
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}
