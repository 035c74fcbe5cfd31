use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 邮件订阅
/// - verification_token: 验证后清空
/// - points: 推荐奖励积分（被推荐人完成验证 +1）
/// - follow_up_email_sent: 验证 24 小时后的邀请邮件是否已发送
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    pub username: String,
    pub verification_token: Option<String>,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub referrer_email: Option<String>,
    pub points: i64,
    pub follow_up_email_sent: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
