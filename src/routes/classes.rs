use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::classes::{ClassFormRequest, ClassListQuery};
use crate::models::users::UserRole;
use crate::services::ClassService;
use crate::utils::SafeIdI64;

// 懒加载的全局 CLASS_SERVICE 实例
static CLASS_SERVICE: Lazy<ClassService> = Lazy::new(ClassService::new_lazy);

// HTTP处理程序
pub async fn home(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.home(&req).await
}

pub async fn list_classes(
    req: HttpRequest,
    query: web::Query<ClassListQuery>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_classes(&req, query.into_inner()).await
}

pub async fn create_form(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.create_form(&req).await
}

pub async fn create_class(
    req: HttpRequest,
    class_form: web::Json<ClassFormRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .create_class(&req, class_form.into_inner())
        .await
}

pub async fn update_form(req: HttpRequest, class_id: SafeIdI64) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.update_form(&req, class_id.0).await
}

pub async fn update_class(
    req: HttpRequest,
    class_id: SafeIdI64,
    class_form: web::Json<ClassFormRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .update_class(&req, class_id.0, class_form.into_inner())
        .await
}

pub async fn delete_form(req: HttpRequest, class_id: SafeIdI64) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.delete_form(&req, class_id.0).await
}

pub async fn delete_class(req: HttpRequest, class_id: SafeIdI64) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.delete_class(&req, class_id.0).await
}

// 配置路由
pub fn configure_classes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(
            web::scope("/schedule/classes")
                // 匿名可查看班级列表
                .service(web::resource("/").route(web::get().to(list_classes)))
                .service(
                    web::resource("/create/")
                        // 教师创建自己的班级，超级管理员可以指定教师
                        .wrap(middlewares::RequireRole::new_any(
                            UserRole::class_manager_roles(),
                        ))
                        .wrap(middlewares::RequireJWT::strict())
                        .route(web::get().to(create_form))
                        .route(web::post().to(create_class)),
                )
                .service(
                    web::resource("/{id}/update/")
                        // 是否为本班教师在服务层判断
                        .wrap(middlewares::RequireRole::new_any(
                            UserRole::class_manager_roles(),
                        ))
                        .wrap(middlewares::RequireJWT::strict())
                        .route(web::get().to(update_form))
                        .route(web::post().to(update_class)),
                )
                .service(
                    web::resource("/{id}/delete/")
                        .wrap(middlewares::RequireRole::new_any(
                            UserRole::class_manager_roles(),
                        ))
                        .wrap(middlewares::RequireJWT::strict())
                        .route(web::get().to(delete_form))
                        .route(web::post().to(delete_class)),
                ),
        );
}
