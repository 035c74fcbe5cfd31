use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::score_entity as scores;

/// 提交分数请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SubmitScoreRequest {
    #[schema(example = "player1")]
    pub name: String,
    #[schema(example = "player1@example.com")]
    pub email: String,
    #[schema(example = 4200)]
    pub score: i64,
}

/// 排行榜查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopScoresQuery {
    /// 返回条数 (默认 10，最大 100)
    pub limit: Option<u64>,
}

/// 分数响应（不返回邮箱）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreResponse {
    pub id: i64,
    pub name: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

impl From<scores::Model> for ScoreResponse {
    fn from(m: scores::Model) -> Self {
        ScoreResponse {
            id: m.id,
            name: m.name,
            score: m.score,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}
