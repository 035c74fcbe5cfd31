use crate::models::*;
use crate::services::GameService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/game/scores",
    tag = "game",
    request_body = SubmitScoreRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "分数已保存", body = ScoreResponse),
        (status = 400, description = "参数错误"),
        (status = 401, description = "未授权")
    )
)]
/// 提交游戏分数；邮箱未订阅时自动订阅并发送确认邮件
pub async fn submit_score(
    service: web::Data<GameService>,
    body: web::Json<SubmitScoreRequest>,
) -> Result<HttpResponse> {
    match service.submit_score(body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            data,
            "Score saved successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/game/scores",
    tag = "game",
    params(TopScoresQuery),
    responses(
        (status = 200, description = "排行榜", body = [ScoreResponse])
    )
)]
pub async fn top_scores(
    service: web::Data<GameService>,
    query: web::Query<TopScoresQuery>,
) -> Result<HttpResponse> {
    match service.top_scores(&query).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn game_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/game")
            .route("/scores", web::post().to(submit_score))
            .route("/scores", web::get().to(top_scores)),
    );
}
