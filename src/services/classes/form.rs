//! 班级表单：上下文与字段校验，创建和更新共用

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use std::sync::Arc;

use super::ClassService;
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::classes::entities::{DEFAULT_CLASS_COLOR, needs_generated_color};
use crate::models::classes::{ClassDetail, ClassFormContext, ClassFormRequest, EnglishClass};
use crate::models::schedules::ScheduleInput;
use crate::models::users::{User, UserRole, UserSummary};
use crate::models::{ApiResponse, ErrorCode, FormErrors};
use crate::storage::Storage;
use crate::utils::datetime::parse_date;

const TITLE_MAX_LENGTH: usize = 255;
const COLOR_MAX_LENGTH: usize = 20;
const TERM_MAX_LENGTH: usize = 100;
const REQUIRED: &str = "This field is required.";

/// 校验通过的班级表单
#[derive(Debug, Clone)]
pub(super) struct ValidatedClassForm {
    pub title: String,
    pub description: Option<String>,
    /// 显式指定的颜色，`None` 表示需要生成或保留原值
    pub color: Option<String>,
    pub teacher_id: i64,
    pub student_ids: Vec<i64>,
    pub schedule: ScheduleInput,
    /// 其他班级已占用的颜色
    pub used_colors: HashSet<String>,
}

pub async fn create_form(service: &ClassService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match form_context(&storage, None).await {
        Ok(context) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            context,
            "Class form retrieved successfully",
        ))),
        Err(e) => Ok(super::super::internal_error("Failed to load class form", e)),
    }
}

pub async fn update_form(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let class = match load_managed_class(&storage, request, class_id).await {
        Ok(class) => class,
        Err(resp) => return Ok(resp),
    };

    let result = async {
        let detail = class_detail(&storage, class).await?;
        form_context(&storage, Some(detail)).await
    }
    .await;

    match result {
        Ok(context) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            context,
            "Class form retrieved successfully",
        ))),
        Err(e) => Ok(super::super::internal_error("Failed to load class form", e)),
    }
}

async fn form_context(
    storage: &Arc<dyn Storage>,
    class: Option<ClassDetail>,
) -> Result<ClassFormContext> {
    let teachers = storage.list_users_by_role(UserRole::Teacher).await?;
    let students = storage.list_users_by_role(UserRole::Student).await?;

    Ok(ClassFormContext {
        class,
        teachers: teachers.iter().map(UserSummary::from).collect(),
        students: students.iter().map(UserSummary::from).collect(),
        default_color: DEFAULT_CLASS_COLOR,
    })
}

/// 班级详情：教师、学生与主安排
pub(super) async fn class_detail(
    storage: &Arc<dyn Storage>,
    class: EnglishClass,
) -> Result<ClassDetail> {
    let mut ids = class.student_ids.clone();
    ids.push(class.teacher_id);
    let users = storage.list_users_by_ids(&ids).await?;

    let teacher = users
        .iter()
        .find(|u| u.id == class.teacher_id)
        .map(UserSummary::from)
        .unwrap_or_else(|| UserSummary {
            id: class.teacher_id,
            username: String::new(),
        });
    let students = users
        .iter()
        .filter(|u| class.has_student(u.id))
        .map(UserSummary::from)
        .collect();
    let schedule = storage.get_canonical_schedule(class.id).await?;

    Ok(ClassDetail {
        class,
        teacher,
        students,
        schedule,
    })
}

/// 读取班级并确认当前用户可以管理
pub(super) async fn load_managed_class(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    class_id: i64,
) -> std::result::Result<EnglishClass, HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Err(super::super::login_required());
    };

    let class = match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Err(super::super::not_found(
                ErrorCode::ClassNotFound,
                "Class not found.",
            ));
        }
        Err(e) => return Err(super::super::internal_error("Failed to load class", e)),
    };

    if !class.is_managed_by(&user) {
        return Err(super::super::forbidden(
            ErrorCode::ClassPermissionDenied,
            "You do not have permission to manage this class.",
        ));
    }

    Ok(class)
}

/// 校验表单字段，失败时返回可直接响应的错误
pub(super) async fn validate_class_form(
    storage: &Arc<dyn Storage>,
    form: &ClassFormRequest,
    teacher_id: Option<i64>,
    exclude_class_id: Option<i64>,
) -> std::result::Result<ValidatedClassForm, HttpResponse> {
    let mut errors = FormErrors::new();

    let title = form.title.trim().to_string();
    if title.is_empty() {
        errors.add("title", REQUIRED);
    } else if title.chars().count() > TITLE_MAX_LENGTH {
        errors.add("title", "Ensure this value has at most 255 characters.");
    }

    let used_colors = storage
        .list_used_colors(exclude_class_id)
        .await
        .map_err(|e| super::super::internal_error("Failed to validate class", e))?;

    let color = match form.color.as_deref() {
        Some(c) if !needs_generated_color(Some(c)) => {
            let c = c.trim().to_string();
            if c.chars().count() > COLOR_MAX_LENGTH {
                errors.add("color", "Ensure this value has at most 20 characters.");
            } else if used_colors.contains(&c) {
                errors.add("color", "This color is already used by another class.");
            }
            Some(c)
        }
        _ => None,
    };

    let teacher = match teacher_id {
        None => {
            errors.add("teacher", REQUIRED);
            None
        }
        Some(id) => match storage.get_user_by_id(id).await {
            Ok(Some(user)) if user.is_teacher() => Some(user),
            Ok(_) => {
                errors.add(
                    "teacher",
                    "Select a valid choice. That choice is not one of the available choices.",
                );
                None
            }
            Err(e) => return Err(super::super::internal_error("Failed to validate class", e)),
        },
    };

    let mut student_ids = form.students.clone();
    student_ids.sort_unstable();
    student_ids.dedup();
    if student_ids.is_empty() {
        errors.add("students", REQUIRED);
    } else {
        let found: Vec<User> = storage
            .list_users_by_ids(&student_ids)
            .await
            .map_err(|e| super::super::internal_error("Failed to validate class", e))?;
        for id in &student_ids {
            if !found.iter().any(|u| u.id == *id && u.is_student()) {
                errors.add(
                    "students",
                    format!("Select a valid choice. {id} is not one of the available choices."),
                );
            }
        }
    }

    let term = form.term.trim().to_string();
    if term.is_empty() {
        errors.add("term", REQUIRED);
    } else if term.chars().count() > TERM_MAX_LENGTH {
        errors.add("term", "Ensure this value has at most 100 characters.");
    }

    let start_date = required_date(&mut errors, "start_date", form.start_date.as_deref());
    let end_date = required_date(&mut errors, "end_date", form.end_date.as_deref());

    match (teacher, start_date, end_date) {
        (Some(teacher), Some(start_date), Some(end_date)) if errors.is_empty() => {
            Ok(ValidatedClassForm {
                title,
                description: form.description.as_ref().map(|d| d.trim().to_string()),
                color,
                teacher_id: teacher.id,
                student_ids,
                schedule: ScheduleInput {
                    term,
                    start_date,
                    end_date,
                },
                used_colors,
            })
        }
        _ => Err(super::super::form_errors(errors)),
    }
}

fn required_date(
    errors: &mut FormErrors,
    field: &str,
    value: Option<&str>,
) -> Option<chrono::NaiveDate> {
    match value.map(str::trim) {
        None | Some("") => {
            errors.add(field, REQUIRED);
            None
        }
        Some(raw) => match parse_date(raw) {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add(field, "Enter a valid date.");
                None
            }
        },
    }
}
