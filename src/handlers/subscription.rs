use crate::models::*;
use crate::services::SubscriptionService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use super::require_admin;

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscription",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 200, description = "订阅成功，已发送确认邮件", body = SubscriptionResponse),
        (status = 400, description = "参数错误"),
        (status = 409, description = "邮箱已订阅")
    )
)]
pub async fn subscribe(
    service: web::Data<SubscriptionService>,
    body: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    match service.create(body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/verify",
    tag = "subscription",
    params(VerifySubscriptionQuery),
    responses(
        (status = 200, description = "验证结果", body = VerifySubscriptionResponse),
        (status = 409, description = "令牌无效或已过期")
    )
)]
pub async fn verify(
    service: web::Data<SubscriptionService>,
    query: web::Query<VerifySubscriptionQuery>,
) -> Result<HttpResponse> {
    match service.verify(&query.token).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscription",
    params(
        ("page" = Option<u64>, Query, description = "页码 (默认 1)"),
        ("limit" = Option<u64>, Query, description = "每页数量 (默认 10，最大 100)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订阅列表", body = SubscriptionListResponse),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn list_subscriptions(
    service: web::Data<SubscriptionService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.list(&query).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/all",
    tag = "subscription",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部订阅（不分页）", body = [SubscriptionResponse]),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn list_all_subscriptions(
    service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.list_all().await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscriptions/send-email-to-all",
    tag = "subscription",
    request_body = SendBulkEmailRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "群发完成，返回发送统计", body = BulkEmailResponse),
        (status = 400, description = "主题或正文为空"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn send_email_to_all(
    service: web::Data<SubscriptionService>,
    req: HttpRequest,
    body: web::Json<SendBulkEmailRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.send_email_to_all(&body).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscriptions/send-email-to-specific",
    tag = "subscription",
    request_body = SendToSpecificRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "发送完成，返回发送统计", body = BulkEmailResponse),
        (status = 400, description = "邮箱格式错误或主题、正文为空"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn send_email_to_specific(
    service: web::Data<SubscriptionService>,
    req: HttpRequest,
    body: web::Json<SendToSpecificRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.send_email_to_specific(&body).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::post().to(subscribe))
            .route("", web::get().to(list_subscriptions))
            .route("/all", web::get().to(list_all_subscriptions))
            .route("/verify", web::get().to(verify))
            .route("/send-email-to-all", web::post().to(send_email_to_all))
            .route("/send-email-to-specific", web::post().to(send_email_to_specific)),
    );
}
