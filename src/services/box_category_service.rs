use crate::entities::{box_category_entity as categories, box_entity as boxes};
use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    BoxCategoryResponse, BoxResponse, CreateBoxCategoryRequest, UpdateBoxCategoryRequest,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

#[derive(Clone)]
pub struct BoxCategoryService {
    pool: DbPool,
}

impl BoxCategoryService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 创建分类
    pub async fn create(&self, request: CreateBoxCategoryRequest) -> AppResult<BoxCategoryResponse> {
        let name = validate_name(&request.name)?;

        let model = categories::ActiveModel {
            name: Set(name),
            description: Set(request.description),
            photo: Set(request.photo),
            order: Set(request.order.unwrap_or(0)),
            color: Set(request.color),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Box category created: {} ({})", model.name, model.id);
        Ok(model.into())
    }

    /// 分类列表（按 order 升序，附带盲盒）
    pub async fn list(&self) -> AppResult<Vec<BoxCategoryResponse>> {
        let list = categories::Entity::find()
            .order_by_asc(categories::Column::Order)
            .order_by_asc(categories::Column::Id)
            .all(self.pool.as_ref())
            .await?;

        let ids: Vec<i64> = list.iter().map(|c| c.id).collect();
        let mut grouped: HashMap<i64, Vec<BoxResponse>> = HashMap::new();
        if !ids.is_empty() {
            let box_list = boxes::Entity::find()
                .filter(boxes::Column::BoxCategoryId.is_in(ids))
                .order_by_asc(boxes::Column::Order)
                .order_by_asc(boxes::Column::Id)
                .all(self.pool.as_ref())
                .await?;
            for b in box_list {
                grouped
                    .entry(b.box_category_id)
                    .or_default()
                    .push(BoxResponse::from(b));
            }
        }

        Ok(list
            .into_iter()
            .map(|c| {
                let boxes = grouped.remove(&c.id).unwrap_or_default();
                BoxCategoryResponse::from(c).with_boxes(boxes)
            })
            .collect())
    }

    /// 获取单个分类（附带盲盒）
    pub async fn get(&self, id: i64) -> AppResult<BoxCategoryResponse> {
        let category = self.find_model(id).await?;
        let box_list = boxes::Entity::find()
            .filter(boxes::Column::BoxCategoryId.eq(id))
            .order_by_asc(boxes::Column::Order)
            .order_by_asc(boxes::Column::Id)
            .all(self.pool.as_ref())
            .await?;

        Ok(BoxCategoryResponse::from(category)
            .with_boxes(box_list.into_iter().map(BoxResponse::from).collect()))
    }

    /// 更新分类（仅更新提供的字段）
    pub async fn update(
        &self,
        id: i64,
        request: UpdateBoxCategoryRequest,
    ) -> AppResult<BoxCategoryResponse> {
        let mut am = self.find_model(id).await?.into_active_model();

        if let Some(name) = &request.name {
            am.name = Set(validate_name(name)?);
        }
        if let Some(description) = request.description {
            am.description = Set(Some(description));
        }
        if let Some(photo) = request.photo {
            am.photo = Set(Some(photo));
        }
        if let Some(order) = request.order {
            am.order = Set(order);
        }
        if let Some(color) = request.color {
            am.color = Set(Some(color));
        }
        am.updated_at = Set(Some(Utc::now()));

        let updated = am.update(self.pool.as_ref()).await?;
        Ok(updated.into())
    }

    /// 删除分类，仍有盲盒引用时拒绝
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let category = self.find_model(id).await?;

        let box_count = boxes::Entity::find()
            .filter(boxes::Column::BoxCategoryId.eq(id))
            .count(self.pool.as_ref())
            .await?;
        if box_count > 0 {
            return Err(AppError::InvalidState(format!(
                "Category still has {box_count} boxes"
            )));
        }

        categories::Entity::delete_by_id(category.id)
            .exec(self.pool.as_ref())
            .await?;
        log::info!("Box category deleted: {id}");
        Ok(())
    }

    async fn find_model(&self, id: i64) -> AppResult<categories::Model> {
        categories::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Box category not found".to_string()))
    }
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() || name.len() > 255 {
        return Err(AppError::ValidationError(
            "Category name length must be between 1 and 255 characters".to_string(),
        ));
    }
    Ok(name.to_string())
}
