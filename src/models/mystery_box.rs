use chrono::{DateTime, Utc};
use sea_orm::prelude::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::draw::{SelectedPrize, Settlement};
use crate::entities::box_entity as boxes;
use crate::utils::money::serialize_as_number;

use super::ItemResponse;

/// 创建盲盒请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateBoxRequest {
    #[schema(example = "Football Box")]
    pub title: String,
    #[schema(example = "Includes a football, jersey, and other sport accessories.")]
    pub description: Option<String>,
    #[schema(example = "Dubai")]
    pub location: String,
    /// 单次开盒票价
    #[schema(value_type = String, example = "149.99")]
    pub price: Decimal,
    #[schema(example = "https://example.com/football-box.jpg")]
    pub image_url: String,
    #[schema(example = "linear-gradient(to bottom, rgba(0,0,0,0.4), rgba(0,0,0,0))")]
    pub background_image: String,
    pub box_category_id: i64,
    /// 是否上架 (默认 true)
    pub is_active: Option<bool>,
    /// 展示顺序 (默认 0)
    pub order: Option<i32>,
    /// 可兑换奖品中平台保留比例 0 ~ 1 (默认 0)
    #[schema(value_type = Option<String>, example = "0.1")]
    pub retained_profit_percentage: Option<Decimal>,
}

/// 更新盲盒请求（累计财务字段不可修改）
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateBoxRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub background_image: Option<String>,
    pub box_category_id: Option<i64>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub retained_profit_percentage: Option<Decimal>,
}

/// 盲盒响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BoxResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub image_url: String,
    pub background_image: String,
    pub is_active: bool,
    pub order: i32,
    pub box_category_id: i64,
    pub purchased_count: i64,
    #[schema(value_type = String)]
    pub total_revenue: Decimal,
    #[schema(value_type = String)]
    pub total_payout: Decimal,
    #[schema(value_type = String)]
    pub exchangeable_payout: Decimal,
    #[schema(value_type = String)]
    pub retained_profit_percentage: Decimal,
    /// 列表/详情接口附带奖品
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<boxes::Model> for BoxResponse {
    fn from(m: boxes::Model) -> Self {
        BoxResponse {
            id: m.id,
            title: m.title,
            description: m.description,
            location: m.location,
            price: m.price,
            image_url: m.image_url,
            background_image: m.background_image,
            is_active: m.is_active,
            order: m.order,
            box_category_id: m.box_category_id,
            purchased_count: m.purchased_count,
            total_revenue: m.total_revenue,
            total_payout: m.total_payout,
            exchangeable_payout: m.exchangeable_payout,
            retained_profit_percentage: m.retained_profit_percentage,
            items: None,
            item_count: None,
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
        }
    }
}

impl BoxResponse {
    pub fn with_items(mut self, items: Vec<ItemResponse>) -> Self {
        self.item_count = Some(items.len() as u64);
        self.items = Some(items);
        self
    }
}

/// 抽奖后的财务快照
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpinFinancials {
    #[serde(serialize_with = "serialize_as_number")]
    #[schema(value_type = f64, example = 1050)]
    pub total_revenue: Decimal,
    #[serde(serialize_with = "serialize_as_number")]
    #[schema(value_type = f64, example = 475)]
    pub total_payout: Decimal,
    #[serde(serialize_with = "serialize_as_number")]
    #[schema(value_type = f64, example = 375)]
    pub exchangeable_payout: Decimal,
    #[serde(serialize_with = "serialize_as_number")]
    #[schema(value_type = f64, example = 37.5)]
    pub retained_profit: Decimal,
    #[serde(serialize_with = "serialize_as_number")]
    #[schema(value_type = f64, example = 612.5)]
    pub net_profit: Decimal,
}

impl From<&Settlement> for SpinFinancials {
    fn from(s: &Settlement) -> Self {
        SpinFinancials {
            total_revenue: s.total_revenue,
            total_payout: s.total_payout,
            exchangeable_payout: s.exchangeable_payout,
            retained_profit: s.retained_profit,
            net_profit: s.net_profit,
        }
    }
}

/// 抽奖响应中的盲盒信息
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpinBox {
    pub id: i64,
    pub title: String,
    #[serde(serialize_with = "serialize_as_number")]
    #[schema(value_type = f64, example = 50)]
    pub price: Decimal,
}

/// 抽奖（Spin）响应
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpinResponse {
    /// 抽中的奖品
    pub prize: SelectedPrize,
    /// 结算后的财务数据
    pub financials: SpinFinancials,
    #[serde(rename = "box")]
    pub box_info: SpinBox,
    /// 已登录时奖品放入背包后的记录 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_item_id: Option<i64>,
}
