use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use mystery_box_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::MailgunService,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(&config.jwt.secret);

    // 外部服务
    let mailgun_service = MailgunService::new(config.mailgun.clone(), &config.frontend);
    if !mailgun_service.is_enabled() {
        log::warn!("Mailgun API key not configured, emails will only be logged");
    }

    // 创建服务
    let box_category_service = BoxCategoryService::new(pool.clone());
    let box_service = BoxService::new(pool.clone());
    let item_service = ItemService::new(pool.clone());
    let subscription_service = SubscriptionService::new(pool.clone(), mailgun_service);
    let game_service = GameService::new(pool.clone(), subscription_service.clone());
    let auth_service = AuthService::new(
        pool.clone(),
        jwt_service.clone(),
        config.jwt.access_token_expires_in,
    );
    let inventory_service = InventoryService::new(pool.clone());

    // 启动后台任务
    tasks::spawn_all(subscription_service.clone());

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let frontend_url = config.frontend.url.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors(&frontend_url))
            .app_data(web::Data::new(box_category_service.clone()))
            .app_data(web::Data::new(box_service.clone()))
            .app_data(web::Data::new(item_service.clone()))
            .app_data(web::Data::new(subscription_service.clone()))
            .app_data(web::Data::new(game_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(inventory_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::inventory_config)
                    .configure(handlers::box_category_config)
                    .configure(handlers::box_config)
                    .configure(handlers::item_config)
                    .configure(handlers::game_config)
                    .configure(handlers::subscription_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
