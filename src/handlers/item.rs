use crate::models::*;
use crate::services::ItemService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use super::require_admin;

#[utoipa::path(
    post,
    path = "/items",
    tag = "item",
    request_body = CreateItemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建奖品成功", body = ItemResponse),
        (status = 400, description = "参数错误"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn create_item(
    service: web::Data<ItemService>,
    req: HttpRequest,
    body: web::Json<CreateItemRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.create(body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/items",
    tag = "item",
    params(ItemQuery),
    responses(
        (status = 200, description = "奖品分页列表", body = ItemPageResponse),
        (status = 400, description = "排序参数错误")
    )
)]
/// 奖品列表：支持分页、排序以及按名称/描述/状态/盲盒/价格/权重过滤
pub async fn list_items(
    service: web::Data<ItemService>,
    query: web::Query<ItemQuery>,
) -> Result<HttpResponse> {
    match service.list(&query).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "item",
    params(
        ("id" = i64, Path, description = "奖品ID")
    ),
    responses(
        (status = 200, description = "奖品详情", body = ItemResponse),
        (status = 404, description = "奖品不存在")
    )
)]
pub async fn get_item(service: web::Data<ItemService>, path: web::Path<i64>) -> Result<HttpResponse> {
    match service.get(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "item",
    params(
        ("id" = i64, Path, description = "奖品ID")
    ),
    request_body = UpdateItemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = ItemResponse),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "奖品不存在")
    )
)]
pub async fn update_item(
    service: web::Data<ItemService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateItemRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.update(path.into_inner(), body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "item",
    params(
        ("id" = i64, Path, description = "奖品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "奖品不存在")
    )
)]
pub async fn delete_item(
    service: web::Data<ItemService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Item deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn item_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/items")
            .route("", web::post().to(create_item))
            .route("", web::get().to(list_items))
            .route("/{id}", web::get().to(get_item))
            .route("/{id}", web::put().to(update_item))
            .route("/{id}", web::delete().to(delete_item)),
    );
}
