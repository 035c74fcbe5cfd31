use chrono::{DateTime, Utc};
use sea_orm::prelude::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{ItemStatus, item_entity as items};

/// 创建奖品请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateItemRequest {
    #[schema(example = "Diamond Ring")]
    pub name: String,
    #[schema(example = "18k gold ring with diamonds")]
    pub description: Option<String>,
    #[schema(example = "https://example.com/images/diamond-ring.jpg")]
    pub image_url: Option<String>,
    /// 奖品价值 (默认 0)
    #[schema(value_type = Option<String>, example = "999.99")]
    pub price: Option<Decimal>,
    pub status: ItemStatus,
    /// 所属盲盒
    pub box_id: i64,
    /// 抽奖权重 (默认 0，即不参与抽奖)
    #[schema(example = 10.0)]
    pub percentage: Option<f64>,
    /// 是否可兑换现金；不填时按名称规则判断
    pub is_exchangeable: Option<bool>,
    pub view_count: Option<i64>,
    pub click_count: Option<i64>,
    pub opened_count: Option<i64>,
}

/// 更新奖品请求（仅更新提供的字段）
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub status: Option<ItemStatus>,
    pub box_id: Option<i64>,
    pub percentage: Option<f64>,
    pub is_exchangeable: Option<bool>,
    pub view_count: Option<i64>,
    pub click_count: Option<i64>,
    pub opened_count: Option<i64>,
}

/// 奖品列表查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemQuery {
    /// 页码 (默认 1)
    pub page: Option<u64>,
    /// 每页数量 (默认 10，最大 100)
    pub limit: Option<u64>,
    /// 排序字段: created_at / name / price / percentage / purchased_count
    pub sort_by: Option<String>,
    /// asc / desc (默认 desc)
    pub sort_order: Option<String>,
    /// 名称模糊匹配（不区分大小写）
    pub name: Option<String>,
    /// 描述模糊匹配（不区分大小写）
    pub description: Option<String>,
    pub status: Option<ItemStatus>,
    pub box_id: Option<i64>,
    /// 价格精确匹配（无法解析时忽略）
    pub price: Option<String>,
    /// 权重精确匹配（无法解析时忽略）
    pub percentage: Option<String>,
}

/// 排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSortField {
    CreatedAt,
    Name,
    Price,
    Percentage,
    PurchasedCount,
}

impl std::str::FromStr for ItemSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" | "createdAt" => Ok(ItemSortField::CreatedAt),
            "name" => Ok(ItemSortField::Name),
            "price" => Ok(ItemSortField::Price),
            "percentage" => Ok(ItemSortField::Percentage),
            "purchased_count" | "purchasedCount" => Ok(ItemSortField::PurchasedCount),
            other => Err(format!("Unsupported sort field: {other}")),
        }
    }
}

/// 奖品响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemResponse {
    pub id: i64,
    pub box_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub percentage: f64,
    pub status: ItemStatus,
    /// 最终是否可兑换（显式字段或名称规则）
    pub is_exchangeable: bool,
    pub view_count: i64,
    pub click_count: i64,
    pub opened_count: i64,
    pub purchased_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<items::Model> for ItemResponse {
    fn from(m: items::Model) -> Self {
        let is_exchangeable = m.exchangeable();
        ItemResponse {
            id: m.id,
            box_id: m.box_id,
            name: m.name,
            description: m.description,
            image_url: m.image_url,
            price: m.price,
            percentage: m.percentage,
            status: m.status,
            is_exchangeable,
            view_count: m.view_count,
            click_count: m.click_count,
            opened_count: m.opened_count,
            purchased_count: m.purchased_count,
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
        }
    }
}
