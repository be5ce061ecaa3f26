pub mod auth;

pub mod classes;

pub mod lessons;

pub mod schedule;

pub use auth::configure_auth_routes;
pub use classes::configure_classes_routes;
pub use lessons::configure_lessons_routes;
pub use schedule::configure_schedule_routes;

use actix_web::web;

use crate::utils::{json_error_handler, query_error_handler};

/// 注册全部路由及请求体解析配置
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .configure(configure_auth_routes)
        .configure(configure_lessons_routes)
        .configure(configure_classes_routes)
        .configure(configure_schedule_routes);
}
