use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 盲盒实体
/// 累计字段说明:
/// - purchased_count: 已开盒次数
/// - total_revenue: 累计收取的票价
/// - total_payout: 累计发出的奖品价值
/// - exchangeable_payout: 其中可兑换现金的奖品价值
/// - retained_profit_percentage: 可兑换奖品中平台保留的比例 (0.1 = 10%)
///
/// 以上累计字段只在抽奖事务中以增量方式修改，CRUD 接口不可写。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "boxes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    /// 单次开盒票价
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub price: Decimal,
    pub image_url: String,
    pub background_image: String,
    pub is_active: bool,
    pub order: i32,
    pub box_category_id: i64,
    pub purchased_count: i64,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub total_revenue: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub total_payout: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub exchangeable_payout: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub retained_profit_percentage: Decimal,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
