use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::ScheduleService;

static SCHEDULE_SERVICE: Lazy<ScheduleService> = Lazy::new(ScheduleService::new_lazy);

pub async fn calendar(req: HttpRequest) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE.calendar(&req).await
}

pub async fn lesson_details(req: HttpRequest, body: web::Bytes) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE.lesson_details(&req, body).await
}

pub async fn update_lesson(req: HttpRequest, payload: web::Payload) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE.update_lesson(&req, payload).await
}

// 配置路由
pub fn configure_schedule_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/schedule")
            .service(web::resource("/").route(web::get().to(calendar)))
            .service(
                // 匿名请求由处理程序返回 403 JSON
                web::resource("/lesson_details/")
                    .wrap(middlewares::RequireJWT::optional())
                    .route(web::post().to(lesson_details)),
            )
            .service(
                web::resource("/update-lesson/")
                    .wrap(middlewares::RequireJWT::optional())
                    .route(web::post().to(update_lesson)),
            ),
    );
}
