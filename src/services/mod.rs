pub mod auth;
pub mod classes;
pub mod lessons;
pub mod schedule;

pub use auth::AuthService;
pub use classes::ClassService;
pub use lessons::LessonService;
pub use schedule::ScheduleService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, error, web};
use std::sync::Arc;
use tracing::error;

use crate::cache::ObjectCache;
use crate::mail::Mailer;
use crate::middlewares::LOGIN_REQUIRED_MESSAGE;
use crate::models::{ApiResponse, ErrorCode, FormErrors};
use crate::storage::Storage;

/// 从 app_data 取出存储
pub(crate) fn storage_from(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| error::ErrorInternalServerError("Storage not found in app data"))
}

/// 对象缓存是可选的，未配置时返回 None
pub(crate) fn cache_from(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
}

pub(crate) fn mailer_from(request: &HttpRequest) -> ActixResult<Arc<dyn Mailer>> {
    request
        .app_data::<web::Data<Arc<dyn Mailer>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| error::ErrorInternalServerError("Mailer not found in app data"))
}

/// 未登录
pub(crate) fn login_required() -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        LOGIN_REQUIRED_MESSAGE,
    ))
}

/// 已登录但无权操作
pub(crate) fn forbidden(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn not_found(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

/// 表单校验失败，按字段返回错误
pub(crate) fn form_errors(errors: FormErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error(
        ErrorCode::ValidationFailed,
        errors,
        "Please correct the errors below.",
    ))
}

/// 存储层错误只写日志，不把驱动信息返回给客户端
pub(crate) fn internal_error(context: &str, err: impl std::fmt::Display) -> HttpResponse {
    error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        context,
    ))
}
