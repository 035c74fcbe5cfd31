use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::box_category_entity as categories;

use super::BoxResponse;

/// 创建分类请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateBoxCategoryRequest {
    #[schema(example = "Sport Boxes")]
    pub name: String,
    #[schema(example = "A collection of sport-related mystery boxes.")]
    pub description: Option<String>,
    #[schema(example = "https://example.com/sport-category.jpg")]
    pub photo: Option<String>,
    /// 展示顺序 (默认 0)
    #[schema(example = 1)]
    pub order: Option<i32>,
    #[schema(example = "#ff6600")]
    pub color: Option<String>,
}

/// 更新分类请求（仅更新提供的字段）
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateBoxCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub photo: Option<String>,
    pub order: Option<i32>,
    pub color: Option<String>,
}

/// 分类响应（附带其下的盲盒）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BoxCategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub photo: Option<String>,
    pub order: i32,
    pub color: Option<String>,
    pub boxes: Vec<BoxResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<categories::Model> for BoxCategoryResponse {
    fn from(m: categories::Model) -> Self {
        BoxCategoryResponse {
            id: m.id,
            name: m.name,
            description: m.description,
            photo: m.photo,
            order: m.order,
            color: m.color,
            boxes: Vec::new(),
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
        }
    }
}

impl BoxCategoryResponse {
    pub fn with_boxes(mut self, boxes: Vec<BoxResponse>) -> Self {
        self.boxes = boxes;
        self
    }
}
