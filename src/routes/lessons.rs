use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::lessons::LessonFormRequest;
use crate::models::users::UserRole;
use crate::services::LessonService;
use crate::utils::SafeIdI64;

static LESSON_SERVICE: Lazy<LessonService> = Lazy::new(LessonService::new_lazy);

pub async fn list_lessons(req: HttpRequest, class_id: SafeIdI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.list_lessons(&req, class_id.0).await
}

pub async fn create_form(req: HttpRequest, class_id: SafeIdI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.create_form(&req, class_id.0).await
}

pub async fn create_lesson(
    req: HttpRequest,
    class_id: SafeIdI64,
    lesson_form: web::Json<LessonFormRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .create_lesson(&req, class_id.0, lesson_form.into_inner())
        .await
}

pub async fn edit_form(req: HttpRequest, lesson_id: SafeIdI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.edit_form(&req, lesson_id.0).await
}

pub async fn update_lesson(
    req: HttpRequest,
    lesson_id: SafeIdI64,
    lesson_form: web::Json<LessonFormRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .update_lesson(&req, lesson_id.0, lesson_form.into_inner())
        .await
}

pub async fn delete_form(req: HttpRequest, lesson_id: SafeIdI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.delete_form(&req, lesson_id.0).await
}

pub async fn delete_lesson(req: HttpRequest, lesson_id: SafeIdI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.delete_lesson(&req, lesson_id.0).await
}

// 配置路由
pub fn configure_lessons_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/schedule/classes/{id}/lessons/")
            // 学生只能查看已选班级，在服务层判断
            .wrap(middlewares::RequireJWT::strict())
            .route(web::get().to(list_lessons)),
    )
    .service(
        web::resource("/schedule/classes/{id}/lessons/create/")
            .wrap(middlewares::RequireRole::new_any(
                UserRole::class_manager_roles(),
            ))
            .wrap(middlewares::RequireJWT::strict())
            .route(web::get().to(create_form))
            .route(web::post().to(create_lesson)),
    )
    .service(
        web::resource("/schedule/update-lesson/{id}/")
            // GET 对所有登录用户开放，无权限时表单只读
            .wrap(middlewares::RequireJWT::strict())
            .route(web::get().to(edit_form))
            .route(web::post().to(update_lesson)),
    )
    .service(
        web::resource("/schedule/lessons/{id}/delete/")
            .wrap(middlewares::RequireRole::new_any(
                UserRole::class_manager_roles(),
            ))
            .wrap(middlewares::RequireJWT::strict())
            .route(web::get().to(delete_form))
            .route(web::post().to(delete_lesson)),
    );
}
