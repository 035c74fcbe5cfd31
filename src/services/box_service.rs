use crate::draw::{Candidate, LedgerState, RandomSource, ThreadRandom, select_prize, settle};
use crate::entities::{
    InventoryStatus, box_category_entity as categories, box_entity as boxes,
    inventory_entity as inventory, item_entity as items,
};
use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    BoxResponse, CreateBoxRequest, ItemResponse, SpinBox, SpinFinancials, SpinResponse,
    UpdateBoxRequest,
};
use chrono::Utc;
use sea_orm::prelude::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct BoxService {
    pool: DbPool,
    random: Arc<dyn RandomSource>,
}

impl BoxService {
    pub fn new(pool: DbPool) -> Self {
        Self::with_random(pool, Arc::new(ThreadRandom))
    }

    /// 指定随机源（测试中使用固定序列）
    pub fn with_random(pool: DbPool, random: Arc<dyn RandomSource>) -> Self {
        Self { pool, random }
    }

    /// 创建盲盒，累计字段从 0 开始
    pub async fn create(&self, request: CreateBoxRequest) -> AppResult<BoxResponse> {
        let title = validate_title(&request.title)?;
        validate_price(request.price)?;
        let retained = request.retained_profit_percentage.unwrap_or(Decimal::ZERO);
        validate_retained_percentage(retained)?;
        self.ensure_category(request.box_category_id).await?;

        let model = boxes::ActiveModel {
            title: Set(title),
            description: Set(request.description),
            location: Set(request.location),
            price: Set(request.price),
            image_url: Set(request.image_url),
            background_image: Set(request.background_image),
            is_active: Set(request.is_active.unwrap_or(true)),
            order: Set(request.order.unwrap_or(0)),
            box_category_id: Set(request.box_category_id),
            purchased_count: Set(0),
            total_revenue: Set(Decimal::ZERO),
            total_payout: Set(Decimal::ZERO),
            exchangeable_payout: Set(Decimal::ZERO),
            retained_profit_percentage: Set(retained),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Box created: {} ({})", model.title, model.id);
        Ok(BoxResponse::from(model).with_items(Vec::new()))
    }

    /// 盲盒列表（按 order 升序，附带奖品与数量）
    pub async fn list(&self) -> AppResult<Vec<BoxResponse>> {
        let box_list = boxes::Entity::find()
            .order_by_asc(boxes::Column::Order)
            .order_by_asc(boxes::Column::Id)
            .all(self.pool.as_ref())
            .await?;

        let ids: Vec<i64> = box_list.iter().map(|b| b.id).collect();
        let mut grouped: HashMap<i64, Vec<ItemResponse>> = HashMap::new();
        if !ids.is_empty() {
            let item_list = items::Entity::find()
                .filter(items::Column::BoxId.is_in(ids))
                .order_by_asc(items::Column::Id)
                .all(self.pool.as_ref())
                .await?;
            for item in item_list {
                grouped
                    .entry(item.box_id)
                    .or_default()
                    .push(ItemResponse::from(item));
            }
        }

        Ok(box_list
            .into_iter()
            .map(|b| {
                let item_list = grouped.remove(&b.id).unwrap_or_default();
                BoxResponse::from(b).with_items(item_list)
            })
            .collect())
    }

    /// 获取单个盲盒（附带奖品）
    pub async fn get(&self, id: i64) -> AppResult<BoxResponse> {
        let model = self.find_model(id).await?;
        let item_list = items::Entity::find()
            .filter(items::Column::BoxId.eq(id))
            .order_by_asc(items::Column::Id)
            .all(self.pool.as_ref())
            .await?;

        Ok(BoxResponse::from(model)
            .with_items(item_list.into_iter().map(ItemResponse::from).collect()))
    }

    /// 更新盲盒（仅更新提供的字段，累计字段不可改）
    pub async fn update(&self, id: i64, request: UpdateBoxRequest) -> AppResult<BoxResponse> {
        let mut am = self.find_model(id).await?.into_active_model();

        if let Some(title) = &request.title {
            am.title = Set(validate_title(title)?);
        }
        if let Some(description) = request.description {
            am.description = Set(Some(description));
        }
        if let Some(location) = request.location {
            am.location = Set(location);
        }
        if let Some(price) = request.price {
            validate_price(price)?;
            am.price = Set(price);
        }
        if let Some(image_url) = request.image_url {
            am.image_url = Set(image_url);
        }
        if let Some(background_image) = request.background_image {
            am.background_image = Set(background_image);
        }
        if let Some(category_id) = request.box_category_id {
            self.ensure_category(category_id).await?;
            am.box_category_id = Set(category_id);
        }
        if let Some(is_active) = request.is_active {
            am.is_active = Set(is_active);
        }
        if let Some(order) = request.order {
            am.order = Set(order);
        }
        if let Some(retained) = request.retained_profit_percentage {
            validate_retained_percentage(retained)?;
            am.retained_profit_percentage = Set(retained);
        }
        am.updated_at = Set(Some(Utc::now()));

        let updated = am.update(self.pool.as_ref()).await?;
        Ok(updated.into())
    }

    /// 删除盲盒（奖品由外键级联删除）
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = boxes::Entity::delete_by_id(id).exec(self.pool.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Box not found".to_string()));
        }
        log::info!("Box deleted: {id}");
        Ok(())
    }

    /// 开盒 (Spin)
    ///
    /// 逻辑:
    /// 1. 事务内锁定盲盒行 (SELECT ... FOR UPDATE)
    /// 2. 读取奖品（按 id 升序，保证累计分布顺序稳定）
    /// 3. 按权重抽取奖品
    /// 4. 基于锁定时的累计值结算
    /// 5. 以增量方式更新奖品与盲盒计数 (col = col + delta)
    /// 6. 已登录玩家：奖品以 KEPT 状态放入背包
    /// 7. 提交事务并返回奖品、财务快照与盲盒信息
    ///
    /// 任一步骤失败事务回滚，不会留下部分更新；重试会重新抽奖。
    pub async fn spin(&self, box_id: i64, user_id: Option<i64>) -> AppResult<SpinResponse> {
        let txn = self.pool.begin().await?;

        let locked_box = boxes::Entity::find_by_id(box_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Box not found".to_string()))?;

        let item_list = items::Entity::find()
            .filter(items::Column::BoxId.eq(box_id))
            .order_by_asc(items::Column::Id)
            .all(&txn)
            .await?;

        if item_list.is_empty() {
            return Err(AppError::InvalidState("Box has no items".to_string()));
        }

        let candidates: Vec<Candidate> = item_list.iter().map(Candidate::from).collect();
        let prize = select_prize(&candidates, self.random.as_ref())?;

        let exchangeable = item_list
            .iter()
            .find(|i| i.id == prize.id)
            .map(|i| i.exchangeable())
            .unwrap_or(false);

        let settlement = settle(
            &LedgerState::from(&locked_box),
            locked_box.price,
            prize.price,
            exchangeable,
        );

        let now = Utc::now();

        let item_update = items::Entity::update_many()
            .col_expr(
                items::Column::PurchasedCount,
                Expr::col(items::Column::PurchasedCount).add(1),
            )
            .col_expr(items::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(items::Column::Id.eq(prize.id))
            .exec(&txn)
            .await?;
        if item_update.rows_affected != 1 {
            return Err(AppError::DatabaseError(DbErr::RecordNotUpdated));
        }

        let box_update = boxes::Entity::update_many()
            .col_expr(
                boxes::Column::PurchasedCount,
                Expr::col(boxes::Column::PurchasedCount).add(1),
            )
            .col_expr(
                boxes::Column::TotalRevenue,
                Expr::col(boxes::Column::TotalRevenue).add(settlement.revenue_delta),
            )
            .col_expr(
                boxes::Column::TotalPayout,
                Expr::col(boxes::Column::TotalPayout).add(settlement.payout_delta),
            )
            .col_expr(
                boxes::Column::ExchangeablePayout,
                Expr::col(boxes::Column::ExchangeablePayout).add(settlement.exchangeable_delta),
            )
            .col_expr(boxes::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(boxes::Column::Id.eq(box_id))
            .exec(&txn)
            .await?;
        if box_update.rows_affected != 1 {
            return Err(AppError::DatabaseError(DbErr::RecordNotUpdated));
        }

        let inventory_item_id = match user_id {
            Some(user_id) => {
                let entry = inventory::ActiveModel {
                    user_id: Set(user_id),
                    item_id: Set(prize.id),
                    box_id: Set(box_id),
                    status: Set(InventoryStatus::Kept),
                    created_at: Set(Some(now)),
                    updated_at: Set(Some(now)),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                Some(entry.id)
            }
            None => None,
        };

        txn.commit().await?;

        log::info!(
            "Box {} spun: prize {} ({}), revenue {}, payout {}, net profit {}",
            box_id,
            prize.id,
            prize.name,
            settlement.total_revenue,
            settlement.total_payout,
            settlement.net_profit
        );

        Ok(SpinResponse {
            financials: SpinFinancials::from(&settlement),
            box_info: SpinBox {
                id: locked_box.id,
                title: locked_box.title,
                price: locked_box.price,
            },
            prize,
            inventory_item_id,
        })
    }

    async fn find_model(&self, id: i64) -> AppResult<boxes::Model> {
        boxes::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Box not found".to_string()))
    }

    async fn ensure_category(&self, category_id: i64) -> AppResult<()> {
        categories::Entity::find_by_id(category_id)
            .one(self.pool.as_ref())
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::ValidationError("Box category does not exist".to_string()))
    }
}

fn validate_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() || title.len() > 255 {
        return Err(AppError::ValidationError(
            "Box title length must be between 1 and 255 characters".to_string(),
        ));
    }
    Ok(title.to_string())
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if price < Decimal::ZERO {
        return Err(AppError::ValidationError(
            "Box price must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_retained_percentage(value: Decimal) -> AppResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(AppError::ValidationError(
            "Retained profit percentage must be between 0 and 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::FixedSequence;
    use crate::entities::ItemStatus;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn box_model() -> boxes::Model {
        boxes::Model {
            id: 1,
            title: "Football Box".into(),
            description: None,
            location: "Dubai".into(),
            price: dec("50"),
            image_url: "https://example.com/box.jpg".into(),
            background_image: "none".into(),
            is_active: true,
            order: 0,
            box_category_id: 1,
            purchased_count: 20,
            total_revenue: dec("1000"),
            total_payout: dec("400"),
            exchangeable_payout: dec("300"),
            retained_profit_percentage: dec("0.1"),
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    fn item(id: i64, name: &str, price: &str, weight: f64) -> items::Model {
        items::Model {
            id,
            box_id: 1,
            name: name.into(),
            description: None,
            image_url: None,
            price: dec(price),
            percentage: weight,
            status: ItemStatus::Common,
            is_exchangeable: None,
            view_count: 0,
            click_count: 0,
            opened_count: 0,
            purchased_count: 0,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    fn updated() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn service(db: DatabaseConnection, draws: Vec<f64>) -> BoxService {
        BoxService::with_random(Arc::new(db), Arc::new(FixedSequence::new(draws)))
    }

    #[tokio::test]
    async fn test_spin_settles_selected_prize() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![box_model()]])
            .append_query_results([vec![
                item(10, "Prize 18", "500", 10.0),
                item(11, "Prize 17", "75", 90.0),
            ]])
            .append_exec_results([updated(), updated()])
            .into_connection();

        // r = 0.5 * 100 = 50 -> 第二个奖品 (阈值 100)
        let result = service(db, vec![0.5]).spin(1, None).await.unwrap();

        assert_eq!(result.prize.id, 11);
        assert_eq!(result.prize.name, "Prize 17");
        assert_eq!(result.prize.price, dec("75"));
        assert_eq!(result.prize.threshold, 100.0);

        assert_eq!(result.financials.total_revenue, dec("1050"));
        assert_eq!(result.financials.total_payout, dec("475"));
        assert_eq!(result.financials.exchangeable_payout, dec("375"));
        assert_eq!(result.financials.retained_profit, dec("37.5"));
        assert_eq!(result.financials.net_profit, dec("612.5"));

        assert_eq!(result.box_info.id, 1);
        assert_eq!(result.box_info.title, "Football Box");
        assert_eq!(result.box_info.price, dec("50"));
    }

    #[tokio::test]
    async fn test_spin_records_prize_in_player_inventory() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![box_model()]])
            .append_query_results([vec![item(11, "Prize 17", "75", 1.0)]])
            .append_exec_results([updated(), updated()])
            .append_query_results([vec![inventory::Model {
                id: 31,
                user_id: 5,
                item_id: 11,
                box_id: 1,
                status: InventoryStatus::Kept,
                created_at: Some(Utc::now()),
                updated_at: Some(Utc::now()),
            }]])
            .into_connection();

        let result = service(db, vec![0.5]).spin(1, Some(5)).await.unwrap();
        assert_eq!(result.prize.id, 11);
        assert_eq!(result.inventory_item_id, Some(31));
    }

    #[tokio::test]
    async fn test_spin_fails_when_inventory_insert_fails() {
        // 背包写入没有结果 -> 整个事务失败
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![box_model()]])
            .append_query_results([vec![item(11, "Prize 17", "75", 1.0)]])
            .append_exec_results([updated(), updated()])
            .into_connection();

        let err = service(db, vec![0.5]).spin(1, Some(5)).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_spin_explicit_flag_overrides_name_rule() {
        let mut prize = item(11, "Prize 5", "75", 1.0);
        prize.is_exchangeable = Some(false);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![box_model()]])
            .append_query_results([vec![prize]])
            .append_exec_results([updated(), updated()])
            .into_connection();

        let result = service(db, vec![0.3]).spin(1, None).await.unwrap();
        assert_eq!(result.financials.exchangeable_payout, dec("300"));
        assert_eq!(result.financials.retained_profit, dec("30"));
    }

    #[tokio::test]
    async fn test_spin_missing_box() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<boxes::Model>::new()])
            .into_connection();

        let err = service(db, vec![0.5]).spin(99, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_spin_box_without_items_writes_nothing() {
        // 未追加任何 exec 结果：若发生写入，Mock 会返回数据库错误而非 InvalidState
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![box_model()]])
            .append_query_results([Vec::<items::Model>::new()])
            .into_connection();

        let err = service(db, vec![0.5]).spin(1, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_spin_zero_weight_box_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![box_model()]])
            .append_query_results([vec![
                item(10, "Prize 1", "10", 0.0),
                item(11, "Prize 2", "20", 0.0),
            ]])
            .into_connection();

        let err = service(db, vec![0.5]).spin(1, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_spin_fails_when_box_row_not_updated() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![box_model()]])
            .append_query_results([vec![item(10, "Prize 1", "10", 1.0)]])
            .append_exec_results([
                updated(),
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let err = service(db, vec![0.5]).spin(1, None).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::DatabaseError(DbErr::RecordNotUpdated)
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_retained_percentage() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = BoxService::new(Arc::new(db));
        let err = svc
            .create(CreateBoxRequest {
                title: "Box".into(),
                description: None,
                location: "Dubai".into(),
                price: dec("10"),
                image_url: "img".into(),
                background_image: "bg".into(),
                box_category_id: 1,
                is_active: None,
                order: None,
                retained_profit_percentage: Some(dec("1.5")),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_price() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = BoxService::new(Arc::new(db));
        let err = svc
            .create(CreateBoxRequest {
                title: "Box".into(),
                description: None,
                location: "Dubai".into(),
                price: dec("-1"),
                image_url: "img".into(),
                background_image: "bg".into(),
                box_category_id: 1,
                is_active: None,
                order: None,
                retained_profit_percentage: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_get_groups_items() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![box_model()]])
            .append_query_results([vec![
                item(10, "Prize 1", "10", 1.0),
                item(11, "Prize 30", "20", 1.0),
            ]])
            .into_connection();

        let resp = BoxService::new(Arc::new(db)).get(1).await.unwrap();
        assert_eq!(resp.item_count, Some(2));
        let list = resp.items.unwrap();
        assert!(list[0].is_exchangeable);
        assert!(!list[1].is_exchangeable);
    }

    #[tokio::test]
    async fn test_delete_missing_box() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        assert!(matches!(
            BoxService::new(Arc::new(db)).delete(5).await,
            Err(AppError::NotFound(_))
        ));
    }

    /// 并发开盒不丢失更新，需要真实 PostgreSQL:
    /// TEST_DATABASE_URL=postgres://... cargo test concurrent_spins -- --ignored
    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn test_concurrent_spins_on_same_box() {
        use migration::{Migrator, MigratorTrait};
        use sea_orm::Database;

        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
        let db = Arc::new(Database::connect(&url).await.unwrap());
        Migrator::up(db.as_ref(), None).await.unwrap();

        let category = categories::ActiveModel {
            name: Set("Concurrency".into()),
            order: Set(0),
            ..Default::default()
        }
        .insert(db.as_ref())
        .await
        .unwrap();

        let svc = BoxService::new(db.clone());
        let created = svc
            .create(CreateBoxRequest {
                title: "Concurrent Box".into(),
                description: None,
                location: "Test".into(),
                price: dec("50"),
                image_url: "img".into(),
                background_image: "bg".into(),
                box_category_id: category.id,
                is_active: None,
                order: None,
                retained_profit_percentage: None,
            })
            .await
            .unwrap();

        items::ActiveModel {
            box_id: Set(created.id),
            name: Set("Nothing".into()),
            price: Set(Decimal::ZERO),
            percentage: Set(1.0),
            status: Set(ItemStatus::Common),
            view_count: Set(0),
            click_count: Set(0),
            opened_count: Set(0),
            purchased_count: Set(0),
            ..Default::default()
        }
        .insert(db.as_ref())
        .await
        .unwrap();

        let (a, b) = tokio::join!(svc.spin(created.id, None), svc.spin(created.id, None));
        a.unwrap();
        b.unwrap();

        let after = boxes::Entity::find_by_id(created.id)
            .one(db.as_ref())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.total_revenue, dec("100"));
        assert_eq!(after.purchased_count, 2);

        boxes::Entity::delete_by_id(created.id).exec(db.as_ref()).await.unwrap();
        categories::Entity::delete_by_id(category.id)
            .exec(db.as_ref())
            .await
            .unwrap();
    }
}
