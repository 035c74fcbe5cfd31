use crate::entities::{box_entity as boxes, item_entity as items};
use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateItemRequest, ItemPageResponse, ItemQuery, ItemResponse, ItemSortField,
    PaginatedResponse, PaginationParams, UpdateItemRequest,
};
use chrono::Utc;
use sea_orm::prelude::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct ItemService {
    pool: DbPool,
}

impl ItemService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 创建奖品
    pub async fn create(&self, request: CreateItemRequest) -> AppResult<ItemResponse> {
        let name = validate_name(&request.name)?;
        let price = request.price.unwrap_or(Decimal::ZERO);
        validate_price(price)?;
        let percentage = request.percentage.unwrap_or(0.0);
        validate_weight(percentage)?;
        self.ensure_box(request.box_id).await?;

        let model = items::ActiveModel {
            box_id: Set(request.box_id),
            name: Set(name),
            description: Set(request.description),
            image_url: Set(request.image_url),
            price: Set(price),
            percentage: Set(percentage),
            status: Set(request.status),
            is_exchangeable: Set(request.is_exchangeable),
            view_count: Set(request.view_count.unwrap_or(0)),
            click_count: Set(request.click_count.unwrap_or(0)),
            opened_count: Set(request.opened_count.unwrap_or(0)),
            purchased_count: Set(0),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!(
            "Item created: {} ({}) in box {}",
            model.name,
            model.id,
            model.box_id
        );
        Ok(model.into())
    }

    /// 分页查询奖品
    pub async fn list(&self, query: &ItemQuery) -> AppResult<ItemPageResponse> {
        let params = PaginationParams::new(query.page, query.limit);

        let sort_field = match query.sort_by.as_deref() {
            Some(s) => s
                .parse::<ItemSortField>()
                .map_err(AppError::ValidationError)?,
            None => ItemSortField::CreatedAt,
        };
        let sort_order = parse_sort_order(query.sort_order.as_deref())?;

        let condition = build_condition(query);

        let total = items::Entity::find()
            .filter(condition.clone())
            .count(self.pool.as_ref())
            .await?;

        let models = items::Entity::find()
            .filter(condition)
            .order_by(sort_column(sort_field), sort_order.clone())
            .order_by(items::Column::Id, sort_order)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?;

        let data: Vec<ItemResponse> = models.into_iter().map(ItemResponse::from).collect();
        Ok(PaginatedResponse::new(data, &params, total))
    }

    pub async fn get(&self, id: i64) -> AppResult<ItemResponse> {
        Ok(self.find_model(id).await?.into())
    }

    /// 更新奖品（仅更新提供的字段）
    pub async fn update(&self, id: i64, request: UpdateItemRequest) -> AppResult<ItemResponse> {
        let mut am = self.find_model(id).await?.into_active_model();

        if let Some(name) = &request.name {
            am.name = Set(validate_name(name)?);
        }
        if let Some(description) = request.description {
            am.description = Set(Some(description));
        }
        if let Some(image_url) = request.image_url {
            am.image_url = Set(Some(image_url));
        }
        if let Some(price) = request.price {
            validate_price(price)?;
            am.price = Set(price);
        }
        if let Some(status) = request.status {
            am.status = Set(status);
        }
        if let Some(box_id) = request.box_id {
            self.ensure_box(box_id).await?;
            am.box_id = Set(box_id);
        }
        if let Some(percentage) = request.percentage {
            validate_weight(percentage)?;
            am.percentage = Set(percentage);
        }
        if let Some(flag) = request.is_exchangeable {
            am.is_exchangeable = Set(Some(flag));
        }
        if let Some(v) = request.view_count {
            am.view_count = Set(v);
        }
        if let Some(v) = request.click_count {
            am.click_count = Set(v);
        }
        if let Some(v) = request.opened_count {
            am.opened_count = Set(v);
        }
        am.updated_at = Set(Some(Utc::now()));

        let updated = am.update(self.pool.as_ref()).await?;
        Ok(updated.into())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = items::Entity::delete_by_id(id).exec(self.pool.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Item not found".to_string()));
        }
        log::info!("Item deleted: {id}");
        Ok(())
    }

    async fn find_model(&self, id: i64) -> AppResult<items::Model> {
        items::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }

    async fn ensure_box(&self, box_id: i64) -> AppResult<()> {
        boxes::Entity::find_by_id(box_id)
            .one(self.pool.as_ref())
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::ValidationError("Box does not exist".to_string()))
    }
}

fn sort_column(field: ItemSortField) -> items::Column {
    match field {
        ItemSortField::CreatedAt => items::Column::CreatedAt,
        ItemSortField::Name => items::Column::Name,
        ItemSortField::Price => items::Column::Price,
        ItemSortField::Percentage => items::Column::Percentage,
        ItemSortField::PurchasedCount => items::Column::PurchasedCount,
    }
}

fn parse_sort_order(value: Option<&str>) -> AppResult<Order> {
    match value.map(|v| v.to_ascii_lowercase()) {
        None => Ok(Order::Desc),
        Some(v) if v == "desc" => Ok(Order::Desc),
        Some(v) if v == "asc" => Ok(Order::Asc),
        Some(v) => Err(AppError::ValidationError(format!(
            "Unsupported sort order: {v}"
        ))),
    }
}

/// 过滤条件：名称/描述不区分大小写模糊匹配，其余精确匹配
fn build_condition(query: &ItemQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(name) = query.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Expr::expr(Func::lower(Expr::col(items::Column::Name)))
                .like(format!("%{}%", name.to_lowercase())),
        );
    }
    if let Some(description) = query
        .description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        condition = condition.add(
            Expr::expr(Func::lower(Expr::col(items::Column::Description)))
                .like(format!("%{}%", description.to_lowercase())),
        );
    }
    if let Some(status) = query.status {
        condition = condition.add(items::Column::Status.eq(status));
    }
    if let Some(box_id) = query.box_id {
        condition = condition.add(items::Column::BoxId.eq(box_id));
    }
    // 数值无法解析时忽略该过滤条件
    if let Some(price) = query
        .price
        .as_deref()
        .and_then(|p| p.trim().parse::<Decimal>().ok())
    {
        condition = condition.add(items::Column::Price.eq(price));
    }
    if let Some(percentage) = query
        .percentage
        .as_deref()
        .and_then(|p| p.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite())
    {
        condition = condition.add(items::Column::Percentage.eq(percentage));
    }

    condition
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() || name.len() > 255 {
        return Err(AppError::ValidationError(
            "Item name length must be between 1 and 255 characters".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if price < Decimal::ZERO {
        return Err(AppError::ValidationError(
            "Item price must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_weight(weight: f64) -> AppResult<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(AppError::ValidationError(
            "Item percentage must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::entities::ItemStatus;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};
    use std::collections::BTreeMap;

    fn item(id: i64, name: &str) -> items::Model {
        items::Model {
            id,
            box_id: 1,
            name: name.into(),
            description: Some("gold".into()),
            image_url: None,
            price: Decimal::from(10),
            percentage: 5.0,
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

    fn count_row(n: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(n)))])
    }

    fn condition_sql(query: &ItemQuery) -> String {
        items::Entity::find()
            .filter(build_condition(query))
            .build(DatabaseBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_sort_order_parsing() {
        assert!(matches!(parse_sort_order(None), Ok(Order::Desc)));
        assert!(matches!(parse_sort_order(Some("ASC")), Ok(Order::Asc)));
        assert!(matches!(parse_sort_order(Some("desc")), Ok(Order::Desc)));
        assert!(parse_sort_order(Some("up")).is_err());
    }

    #[test]
    fn test_name_filter_is_case_insensitive() {
        let sql = condition_sql(&ItemQuery {
            name: Some("Ring".into()),
            ..Default::default()
        });
        assert!(sql.contains(r#"LOWER("name") LIKE '%ring%'"#), "{sql}");
    }

    #[test]
    fn test_unparsable_numeric_filters_are_ignored() {
        let sql = condition_sql(&ItemQuery {
            price: Some("abc".into()),
            percentage: Some("n/a".into()),
            ..Default::default()
        });
        assert!(!sql.contains("WHERE"), "{sql}");

        let sql = condition_sql(&ItemQuery {
            price: Some("12.5".into()),
            box_id: Some(3),
            ..Default::default()
        });
        assert!(sql.contains(r#""price" = 12.5"#), "{sql}");
        assert!(sql.contains(r#""box_id" = 3"#), "{sql}");
    }

    #[tokio::test]
    async fn test_list_returns_page_meta() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(25)]])
            .append_query_results([vec![item(1, "Prize 3"), item(2, "Prize 40")]])
            .into_connection();

        let page = ItemService::new(Arc::new(db))
            .list(&ItemQuery {
                page: Some(3),
                limit: Some(10),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.meta.total, 25);
        assert_eq!(page.meta.page, 3);
        assert_eq!(page.meta.limit, 10);
        assert_eq!(page.meta.total_pages, 3);
        assert!(page.data[0].is_exchangeable);
        assert!(!page.data[1].is_exchangeable);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_sort_field() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = ItemService::new(Arc::new(db))
            .list(&ItemQuery {
                sort_by: Some("weight".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_weight() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = ItemService::new(Arc::new(db))
            .create(CreateItemRequest {
                name: "Prize 1".into(),
                description: None,
                image_url: None,
                price: None,
                status: ItemStatus::Common,
                box_id: 1,
                percentage: Some(-2.0),
                is_exchangeable: None,
                view_count: None,
                click_count: None,
                opened_count: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_get_missing_item() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<items::Model>::new()])
            .into_connection();
        assert!(matches!(
            ItemService::new(Arc::new(db)).get(7).await,
            Err(AppError::NotFound(_))
        ));
    }
}
