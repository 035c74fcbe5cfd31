use actix_cors::Cors;

/// 允许配置的前端来源；`*` 或空值时放开所有来源（本地开发）
pub fn create_cors(frontend_url: &str) -> Cors {
    let allowed = frontend_url.trim().trim_end_matches('/').to_string();
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            if allowed.is_empty() || allowed == "*" {
                return true;
            }
            origin
                .to_str()
                .map(|o| o.trim_end_matches('/') == allowed || o.starts_with("http://localhost"))
                .unwrap_or(false)
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header;
    use actix_web::test as actix_test;
    use actix_web::{App, HttpResponse, web};

    #[actix_web::test]
    async fn test_configured_origin_is_allowed() {
        let app = actix_test::init_service(
            App::new()
                .wrap(create_cors("https://onenightbox.com/"))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://onenightbox.com"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("https://onenightbox.com")
        );
    }
}
