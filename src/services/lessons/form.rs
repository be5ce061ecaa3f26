//! 课时表单：上下文、权限与字段校验

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::LessonService;
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::classes::EnglishClass;
use crate::models::lessons::{
    Lesson, LessonFormContext, LessonFormRequest, LessonInput, LessonLocation, LessonStatus,
};
use crate::models::materials::MaterialSummary;
use crate::models::users::User;
use crate::models::{ApiResponse, ErrorCode, FormErrors};
use crate::storage::Storage;
use crate::utils::datetime::parse_datetime;
use crate::utils::validate::validate_url;

const TITLE_MAX_LENGTH: usize = 255;
const REQUIRED: &str = "This field is required.";

pub async fn create_form(
    service: &LessonService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let (_, class) = match load_class(&storage, request, class_id, Access::Manage).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    match form_context(&storage, &class, None, Vec::new(), true).await {
        Ok(context) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            context,
            "Lesson form retrieved successfully",
        ))),
        Err(e) => Ok(super::super::internal_error("Failed to load lesson form", e)),
    }
}

pub async fn edit_form(
    service: &LessonService,
    request: &HttpRequest,
    lesson_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // 任何登录用户都能打开，无管理权限时所有字段禁用
    let (user, lesson, class) = match load_lesson(&storage, request, lesson_id, Access::View).await
    {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };
    let can_manage = class.is_managed_by(&user);

    let result = async {
        let selected = storage
            .list_materials_for_lessons(&[lesson.id])
            .await?
            .remove(&lesson.id)
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.id)
            .collect();
        form_context(&storage, &class, Some(lesson), selected, can_manage).await
    }
    .await;

    match result {
        Ok(context) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            context,
            "Lesson form retrieved successfully",
        ))),
        Err(e) => Ok(super::super::internal_error("Failed to load lesson form", e)),
    }
}

async fn form_context(
    storage: &Arc<dyn Storage>,
    class: &EnglishClass,
    lesson: Option<Lesson>,
    selected_materials: Vec<i64>,
    can_manage: bool,
) -> Result<LessonFormContext> {
    let materials = storage
        .list_materials()
        .await?
        .iter()
        .map(MaterialSummary::from)
        .collect();

    Ok(LessonFormContext {
        class_id: class.id,
        class_title: class.title.clone(),
        lesson,
        selected_materials,
        materials,
        location_choices: LessonLocation::choices(),
        status_choices: LessonStatus::choices(),
        disabled_fields: if can_manage {
            Vec::new()
        } else {
            LessonFormContext::FIELDS.to_vec()
        },
    })
}

/// 访问级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Access {
    /// 仅要求登录
    View,
    /// 管理者或已选课学生
    Enrolled,
    /// 超级管理员或本班教师
    Manage,
}

fn check_access(user: &User, class: &EnglishClass, access: Access) -> bool {
    match access {
        Access::View => true,
        Access::Enrolled => class.is_visible_to(user),
        Access::Manage => class.is_managed_by(user),
    }
}

fn permission_denied() -> HttpResponse {
    super::super::forbidden(
        ErrorCode::LessonPermissionDenied,
        "You do not have permission to access this lesson.",
    )
}

pub(super) async fn load_class(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    class_id: i64,
    access: Access,
) -> std::result::Result<(User, EnglishClass), HttpResponse> {
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

    if !check_access(&user, &class, access) {
        return Err(permission_denied());
    }
    Ok((user, class))
}

pub(super) async fn load_lesson(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    lesson_id: i64,
    access: Access,
) -> std::result::Result<(User, Lesson, EnglishClass), HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Err(super::super::login_required());
    };

    let lesson = match storage.get_lesson_by_id(lesson_id).await {
        Ok(Some(lesson)) => lesson,
        Ok(None) => {
            return Err(super::super::not_found(
                ErrorCode::LessonNotFound,
                "Lesson not found.",
            ));
        }
        Err(e) => return Err(super::super::internal_error("Failed to load lesson", e)),
    };

    let class = match storage.get_class_by_id(lesson.class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Err(super::super::not_found(
                ErrorCode::LessonNotFound,
                "Lesson not found.",
            ));
        }
        Err(e) => return Err(super::super::internal_error("Failed to load lesson", e)),
    };

    if !check_access(&user, &class, access) {
        return Err(permission_denied());
    }
    Ok((user, lesson, class))
}

/// 校验课时表单
pub(super) fn validate_lesson_form(
    form: &LessonFormRequest,
) -> std::result::Result<LessonInput, FormErrors> {
    let mut errors = FormErrors::new();

    let title = form.title.trim().to_string();
    if title.is_empty() {
        errors.add("title", REQUIRED);
    } else if title.chars().count() > TITLE_MAX_LENGTH {
        errors.add("title", "Ensure this value has at most 255 characters.");
    }

    let start_time = required_datetime(&mut errors, "start_time", form.start_time.as_deref());
    let end_time = required_datetime(&mut errors, "end_time", form.end_time.as_deref());

    let location = match form.location.as_deref().map(str::trim) {
        None | Some("") => LessonLocation::default(),
        Some(raw) => raw.parse::<LessonLocation>().unwrap_or_else(|msg| {
            errors.add("location", msg);
            LessonLocation::default()
        }),
    };

    let status = match form.status.as_deref().map(str::trim) {
        None | Some("") => LessonStatus::default(),
        Some(raw) => raw.parse::<LessonStatus>().unwrap_or_else(|msg| {
            errors.add("status", msg);
            LessonStatus::default()
        }),
    };

    // 线上课必须有会议链接，其他地点一律清空
    let meeting_link = form
        .meeting_link
        .as_deref()
        .map(str::trim)
        .filter(|link| !link.is_empty());
    let meeting_link = if location.is_online() {
        match meeting_link {
            None => {
                errors.add("meeting_link", "Meeting link is required for online lessons.");
                None
            }
            Some(link) => {
                if let Err(msg) = validate_url(link) {
                    errors.add("meeting_link", msg);
                }
                Some(link.to_string())
            }
        }
    } else {
        None
    };

    let description = form
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    match (start_time, end_time) {
        (Some(start_time), Some(end_time)) if errors.is_empty() => Ok(LessonInput {
            title,
            description,
            start_time,
            end_time,
            meeting_link,
            location,
            status,
            material_ids: form.materials.clone(),
        }),
        _ => Err(errors),
    }
}

fn required_datetime(
    errors: &mut FormErrors,
    field: &str,
    value: Option<&str>,
) -> Option<chrono::DateTime<chrono::Utc>> {
    match value.map(str::trim) {
        None | Some("") => {
            errors.add(field, REQUIRED);
            None
        }
        Some(raw) => match parse_datetime(raw) {
            Ok(dt) => Some(dt),
            Err(_) => {
                errors.add(field, "Enter a valid date/time.");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> LessonFormRequest {
        LessonFormRequest {
            title: "Basic Grammar".to_string(),
            start_time: Some("2024-03-04T10:00".to_string()),
            end_time: Some("2024-03-04T12:00".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_apply() {
        let input = validate_lesson_form(&form()).unwrap();
        assert_eq!(input.location, LessonLocation::OnSite);
        assert_eq!(input.status, LessonStatus::Planned);
        assert_eq!(input.meeting_link, None);
    }

    #[test]
    fn test_online_requires_link() {
        let mut f = form();
        f.location = Some("on-line".to_string());
        let errors = validate_lesson_form(&f).unwrap_err();
        assert_eq!(
            errors.get("meeting_link"),
            ["Meeting link is required for online lessons.".to_string()]
        );

        f.meeting_link = Some("https://meet.google.com/abc-defg-hij".to_string());
        let input = validate_lesson_form(&f).unwrap();
        assert_eq!(
            input.meeting_link.as_deref(),
            Some("https://meet.google.com/abc-defg-hij")
        );
    }

    #[test]
    fn test_on_site_clears_link() {
        let mut f = form();
        f.meeting_link = Some("https://meet.google.com/abc".to_string());
        assert_eq!(validate_lesson_form(&f).unwrap().meeting_link, None);
    }

    #[test]
    fn test_invalid_choices_and_dates() {
        let mut f = form();
        f.title = String::new();
        f.status = Some("postponed".to_string());
        f.start_time = Some("tomorrow".to_string());
        let errors = validate_lesson_form(&f).unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("status"));
        assert_eq!(errors.get("start_time"), ["Enter a valid date/time.".to_string()]);
    }
}
