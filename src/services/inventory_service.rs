use crate::database::DbPool;
use crate::entities::{
    InventoryStatus, box_entity as boxes, inventory_entity as inventory, item_entity as items,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AddInventoryItemRequest, InventoryItemResponse, InventoryListResponse,
    SellInventoryItemResponse,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

/// 用户背包：抽中的奖品可以保留或按奖品价格出售到钱包
#[derive(Clone)]
pub struct InventoryService {
    pool: DbPool,
}

impl InventoryService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 背包列表（最新在前）
    pub async fn list(&self, user_id: i64) -> AppResult<InventoryListResponse> {
        let entries = inventory::Entity::find()
            .filter(inventory::Column::UserId.eq(user_id))
            .order_by_desc(inventory::Column::CreatedAt)
            .order_by_desc(inventory::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        if entries.is_empty() {
            return Ok(InventoryListResponse { items: Vec::new() });
        }

        let item_ids: Vec<i64> = entries.iter().map(|e| e.item_id).collect();
        let box_ids: Vec<i64> = entries.iter().map(|e| e.box_id).collect();

        let item_map: HashMap<i64, items::Model> = items::Entity::find()
            .filter(items::Column::Id.is_in(item_ids))
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();
        let box_map: HashMap<i64, boxes::Model> = boxes::Entity::find()
            .filter(boxes::Column::Id.is_in(box_ids))
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        // 外键级联删除，缺失的奖品或盲盒只会出现在并发删除时
        let items = entries
            .into_iter()
            .filter_map(|entry| {
                let item = item_map.get(&entry.item_id)?;
                let box_model = box_map.get(&entry.box_id)?;
                Some(InventoryItemResponse::new(entry, item, box_model))
            })
            .collect();

        Ok(InventoryListResponse { items })
    }

    /// 手动加入背包，同一奖品只能保留一份
    pub async fn add(
        &self,
        user_id: i64,
        request: AddInventoryItemRequest,
    ) -> AppResult<InventoryItemResponse> {
        let item = items::Entity::find_by_id(request.item_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;
        let box_model = boxes::Entity::find_by_id(request.box_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Box not found".to_string()))?;
        if item.box_id != box_model.id {
            return Err(AppError::ValidationError(
                "Item does not belong to this box".to_string(),
            ));
        }

        let status = request.status.unwrap_or(InventoryStatus::Kept);
        if status == InventoryStatus::Kept {
            let existing = inventory::Entity::find()
                .filter(inventory::Column::UserId.eq(user_id))
                .filter(inventory::Column::ItemId.eq(item.id))
                .filter(inventory::Column::Status.eq(InventoryStatus::Kept))
                .one(self.pool.as_ref())
                .await?;
            if existing.is_some() {
                return Err(AppError::ValidationError(
                    "Item already exists in inventory".to_string(),
                ));
            }
        }

        let entry = inventory::ActiveModel {
            user_id: Set(user_id),
            item_id: Set(item.id),
            box_id: Set(box_model.id),
            status: Set(status),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        Ok(InventoryItemResponse::new(entry, &item, &box_model))
    }

    /// 出售：状态改为 SOLD，奖品价格加到钱包余额（同一事务）
    pub async fn sell(&self, user_id: i64, id: i64) -> AppResult<SellInventoryItemResponse> {
        let txn = self.pool.begin().await?;

        let entry = inventory::Entity::find_by_id(id)
            .filter(inventory::Column::UserId.eq(user_id))
            .filter(inventory::Column::Status.eq(InventoryStatus::Kept))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Inventory item not found or already sold".to_string())
            })?;

        let item = items::Entity::find_by_id(entry.item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

        let now = Utc::now();
        let mut am = entry.into_active_model();
        am.status = Set(InventoryStatus::Sold);
        am.updated_at = Set(Some(now));
        let sold = am.update(&txn).await?;

        let wallet = users::Entity::update_many()
            .col_expr(
                users::Column::Balance,
                Expr::col(users::Column::Balance).add(item.price),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(users::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;
        if wallet.rows_affected != 1 {
            return Err(AppError::DatabaseError(DbErr::RecordNotUpdated));
        }

        let user = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        txn.commit().await?;

        log::info!(
            "Inventory item {} sold by user {user_id} for {}",
            sold.id,
            item.price
        );
        Ok(SellInventoryItemResponse {
            message: format!("Item sold for ${}", item.price.normalize()),
            id: sold.id,
            item_name: item.name,
            item_price: item.price,
            balance: user.balance,
        })
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> AppResult<()> {
        let result = inventory::Entity::delete_many()
            .filter(inventory::Column::Id.eq(id))
            .filter(inventory::Column::UserId.eq(user_id))
            .exec(self.pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Inventory item not found".to_string()));
        }
        Ok(())
    }
}
