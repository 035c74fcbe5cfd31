use crate::models::*;
use crate::services::BoxCategoryService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use super::require_admin;

#[utoipa::path(
    post,
    path = "/box-categories",
    tag = "box_category",
    request_body = CreateBoxCategoryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建分类成功", body = BoxCategoryResponse),
        (status = 400, description = "参数错误"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn create_category(
    service: web::Data<BoxCategoryService>,
    req: HttpRequest,
    body: web::Json<CreateBoxCategoryRequest>,
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
    path = "/box-categories",
    tag = "box_category",
    responses(
        (status = 200, description = "分类列表（附带盲盒）", body = [BoxCategoryResponse])
    )
)]
pub async fn list_categories(service: web::Data<BoxCategoryService>) -> Result<HttpResponse> {
    match service.list().await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/box-categories/{id}",
    tag = "box_category",
    params(
        ("id" = i64, Path, description = "分类ID")
    ),
    responses(
        (status = 200, description = "分类详情", body = BoxCategoryResponse),
        (status = 404, description = "分类不存在")
    )
)]
pub async fn get_category(
    service: web::Data<BoxCategoryService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/box-categories/{id}",
    tag = "box_category",
    params(
        ("id" = i64, Path, description = "分类ID")
    ),
    request_body = UpdateBoxCategoryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = BoxCategoryResponse),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "分类不存在")
    )
)]
pub async fn update_category(
    service: web::Data<BoxCategoryService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateBoxCategoryRequest>,
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
    path = "/box-categories/{id}",
    tag = "box_category",
    params(
        ("id" = i64, Path, description = "分类ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "分类不存在"),
        (status = 422, description = "分类下仍有盲盒")
    )
)]
pub async fn delete_category(
    service: web::Data<BoxCategoryService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Box category deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn box_category_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/box-categories")
            .route("", web::post().to(create_category))
            .route("", web::get().to(list_categories))
            .route("/{id}", web::get().to(get_category))
            .route("/{id}", web::put().to(update_category))
            .route("/{id}", web::delete().to(delete_category)),
    );
}
