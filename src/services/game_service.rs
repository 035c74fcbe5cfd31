use crate::entities::score_entity as scores;
use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ScoreResponse, SubmitScoreRequest, TopScoresQuery};
use crate::models::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::utils::{normalize_email, validate_email};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, QuerySelect, Set};

use super::SubscriptionService;

#[derive(Clone)]
pub struct GameService {
    pool: DbPool,
    subscriptions: SubscriptionService,
}

impl GameService {
    pub fn new(pool: DbPool, subscriptions: SubscriptionService) -> Self {
        Self {
            pool,
            subscriptions,
        }
    }

    /// 保存分数，邮箱未订阅时自动订阅
    pub async fn submit_score(&self, request: SubmitScoreRequest) -> AppResult<ScoreResponse> {
        let name = request.name.trim().to_string();
        if name.is_empty() || name.len() > 255 {
            return Err(AppError::ValidationError(
                "Name length must be between 1 and 255 characters".to_string(),
            ));
        }
        validate_email(request.email.trim())?;
        if request.score < 0 {
            return Err(AppError::ValidationError(
                "Score must not be negative".to_string(),
            ));
        }
        let email = normalize_email(&request.email);

        let model = scores::ActiveModel {
            name: Set(name.clone()),
            email: Set(email.clone()),
            score: Set(request.score),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Score saved: {} -> {}", name, model.score);

        // 自动订阅失败不影响分数保存
        if let Err(e) = self.subscriptions.subscribe_if_absent(&email, &name).await {
            log::error!("Auto subscription failed for {email}: {e}");
        }

        Ok(model.into())
    }

    /// 排行榜（分数降序）
    pub async fn top_scores(&self, query: &TopScoresQuery) -> AppResult<Vec<ScoreResponse>> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);

        let list = scores::Entity::find()
            .order_by_desc(scores::Column::Score)
            .order_by_asc(scores::Column::CreatedAt)
            .limit(limit)
            .all(self.pool.as_ref())
            .await?;

        Ok(list.into_iter().map(ScoreResponse::from).collect())
    }
}
