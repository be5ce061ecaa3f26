use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use super::form::{class_detail, load_managed_class, validate_class_form};
use crate::middlewares::RequireJWT;
use crate::models::classes::{ClassFormRequest, ClassUpdate};
use crate::models::{ApiResponse, ErrorCode};

pub async fn update_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    class_form: ClassFormRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(super::super::login_required());
    };

    let class = match load_managed_class(&storage, request, class_id).await {
        Ok(class) => class,
        Err(resp) => return Ok(resp),
    };

    // 只有超级管理员可以更换教师
    let teacher_id = class_form.teacher.unwrap_or(class.teacher_id);
    if teacher_id != class.teacher_id && !user.is_superuser() {
        return Ok(super::super::forbidden(
            ErrorCode::ClassPermissionDenied,
            "Only a superuser can reassign the teacher.",
        ));
    }

    let form = match validate_class_form(&storage, &class_form, Some(teacher_id), Some(class_id))
        .await
    {
        Ok(form) => form,
        Err(resp) => return Ok(resp),
    };

    let update = ClassUpdate {
        title: form.title,
        description: form.description,
        color: form.color,
        teacher_id: form.teacher_id,
        student_ids: form.student_ids,
    };

    let updated = match storage
        .update_class_with_schedule(class_id, update, form.schedule)
        .await
    {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Ok(super::super::not_found(
                ErrorCode::ClassNotFound,
                "Class not found.",
            ));
        }
        Err(e) => return Ok(super::super::internal_error("Class update failed", e)),
    };

    info!("Class {} updated by user {}", class_id, user.id);

    match class_detail(&storage, updated).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Class updated successfully.",
        ))),
        Err(e) => Ok(super::super::internal_error("Class update failed", e)),
    }
}
