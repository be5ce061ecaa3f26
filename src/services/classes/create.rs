use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use super::form::{class_detail, validate_class_form};
use crate::middlewares::RequireJWT;
use crate::models::classes::{ClassFormRequest, NewClass};
use crate::models::users::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::color::assign_color;

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    class_form: ClassFormRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(super::super::login_required());
    };

    // 教师只能创建自己任教的班级
    let teacher_id = match user.role {
        UserRole::Superuser => class_form.teacher,
        UserRole::Teacher => {
            let teacher_id = class_form.teacher.unwrap_or(user.id);
            if teacher_id != user.id {
                return Ok(super::super::forbidden(
                    ErrorCode::ClassPermissionDenied,
                    "You can only create classes that you teach.",
                ));
            }
            Some(teacher_id)
        }
        UserRole::Student => {
            return Ok(super::super::forbidden(
                ErrorCode::ClassPermissionDenied,
                "You do not have permission to create a class.",
            ));
        }
    };

    let form = match validate_class_form(&storage, &class_form, teacher_id, None).await {
        Ok(form) => form,
        Err(resp) => return Ok(resp),
    };

    let color = match form.color {
        Some(color) => color,
        None => {
            let config = &service.get_config().color;
            assign_color(
                &mut rand::rng(),
                &form.title,
                &form.used_colors,
                config.saturation,
                config.lightness,
            )
        }
    };

    let new_class = NewClass {
        title: form.title,
        description: form.description.unwrap_or_default(),
        color,
        teacher_id: form.teacher_id,
        student_ids: form.student_ids,
    };

    let class = match storage
        .create_class_with_schedule(new_class, form.schedule)
        .await
    {
        Ok(class) => class,
        Err(e) => return Ok(super::super::internal_error("Class creation failed", e)),
    };

    info!("Class {} created by user {}", class.title, user.id);

    match class_detail(&storage, class).await {
        Ok(detail) => Ok(HttpResponse::Created().json(ApiResponse::success(
            detail,
            "Class created successfully.",
        ))),
        Err(e) => Ok(super::super::internal_error("Class creation failed", e)),
    }
}
