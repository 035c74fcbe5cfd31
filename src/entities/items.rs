use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::draw::is_exchangeable_name;

/// 奖品稀有度 / 热度
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "item_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[sea_orm(string_value = "MOST_WANTED")]
    MostWanted,
    #[sea_orm(string_value = "WANTED")]
    Wanted,
    #[sea_orm(string_value = "IN_DEMAND")]
    InDemand,
    #[sea_orm(string_value = "UNCOMMON")]
    Uncommon,
    #[sea_orm(string_value = "COMMON")]
    Common,
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::MostWanted => write!(f, "MOST_WANTED"),
            ItemStatus::Wanted => write!(f, "WANTED"),
            ItemStatus::InDemand => write!(f, "IN_DEMAND"),
            ItemStatus::Uncommon => write!(f, "UNCOMMON"),
            ItemStatus::Common => write!(f, "COMMON"),
        }
    }
}

/// 盒内奖品实体
/// - percentage: 抽奖权重（无需归一化，0 表示不参与抽奖）
/// - is_exchangeable: 是否可兑换现金；NULL 时沿用旧的名称规则
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub box_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Double")]
    pub percentage: f64,
    pub status: ItemStatus,
    pub is_exchangeable: Option<bool>,
    pub view_count: i64,
    pub click_count: i64,
    pub opened_count: i64,
    pub purchased_count: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 显式字段优先，未设置时按名称规则判断
    pub fn exchangeable(&self) -> bool {
        self.is_exchangeable
            .unwrap_or_else(|| is_exchangeable_name(&self.name))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
