use chrono::{DateTime, Utc};
use sea_orm::prelude::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{
    InventoryStatus, ItemStatus, box_entity as boxes, inventory_entity as inventory,
    item_entity as items,
};

/// 手动加入背包
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AddInventoryItemRequest {
    pub item_id: i64,
    pub box_id: i64,
    /// 默认 KEPT
    pub status: Option<InventoryStatus>,
}

/// 背包中的奖品
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryItemResponse {
    pub id: i64,
    pub user_id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub item_image: Option<String>,
    #[schema(value_type = String, example = "75")]
    pub item_price: Decimal,
    pub item_tier: ItemStatus,
    pub item_odds: f64,
    pub box_id: i64,
    pub box_title: String,
    pub status: InventoryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItemResponse {
    pub fn new(entry: inventory::Model, item: &items::Model, box_model: &boxes::Model) -> Self {
        InventoryItemResponse {
            id: entry.id,
            user_id: entry.user_id,
            item_id: entry.item_id,
            item_name: item.name.clone(),
            item_image: item.image_url.clone(),
            item_price: item.price,
            item_tier: item.status,
            item_odds: item.percentage,
            box_id: entry.box_id,
            box_title: box_model.title.clone(),
            status: entry.status,
            created_at: entry.created_at.unwrap_or_else(Utc::now),
            updated_at: entry.updated_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryListResponse {
    pub items: Vec<InventoryItemResponse>,
}

/// 出售结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SellInventoryItemResponse {
    pub message: String,
    pub id: i64,
    pub item_name: String,
    #[schema(value_type = String, example = "75")]
    pub item_price: Decimal,
    /// 出售后的钱包余额
    #[schema(value_type = String, example = "75")]
    pub balance: Decimal,
}
