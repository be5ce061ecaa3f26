//! 日历弹窗/拖拽提交的课时更新
//!
//! 请求体可以是 JSON（`id`）或 multipart 表单（`lessonId`，附带 `new_materials` 文件）。
//! 只修改请求中出现的字段，全部修改在一个事务内完成。

use actix_multipart::Multipart;
use actix_web::{
    HttpRequest, HttpResponse, Result as ActixResult,
    http::{StatusCode, header::CONTENT_TYPE},
    web,
};
use futures_util::{StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::ScheduleService;
use super::calendar::build_calendar_event;
use crate::errors::HesoError;
use crate::middlewares::{LOGIN_REQUIRED_MESSAGE, RequireJWT};
use crate::models::lessons::{
    CalendarEvent, LessonAjaxResponse, LessonLocation, LessonPatch, UpdateLessonRequest,
};
use crate::models::materials::UploadedMaterial;
use crate::models::users::User;
use crate::storage::Storage;
use crate::utils::datetime::parse_datetime;

// 普通表单字段的长度上限
const TEXT_FIELD_LIMIT: usize = 64 * 1024;

/// 更新失败的类别，每类对应固定的状态码
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateLessonFailure {
    Unauthenticated,
    NotFound(String),
    Forbidden(String),
    Invalid(String),
    /// 其他错误，详情只写日志
    Other,
}

impl UpdateLessonFailure {
    pub fn status(&self) -> StatusCode {
        match self {
            UpdateLessonFailure::Unauthenticated | UpdateLessonFailure::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            UpdateLessonFailure::NotFound(_) => StatusCode::NOT_FOUND,
            UpdateLessonFailure::Invalid(_) | UpdateLessonFailure::Other => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            UpdateLessonFailure::Unauthenticated => LOGIN_REQUIRED_MESSAGE,
            UpdateLessonFailure::NotFound(msg)
            | UpdateLessonFailure::Forbidden(msg)
            | UpdateLessonFailure::Invalid(msg) => msg,
            UpdateLessonFailure::Other => "Unable to update the lesson.",
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status()).json(LessonAjaxResponse::error(self.message()))
    }

    fn invalid(msg: impl Into<String>) -> Self {
        UpdateLessonFailure::Invalid(msg.into())
    }
}

impl From<HesoError> for UpdateLessonFailure {
    fn from(err: HesoError) -> Self {
        match err {
            HesoError::NotFound(msg) => UpdateLessonFailure::NotFound(msg),
            HesoError::Authorization(msg) => UpdateLessonFailure::Forbidden(msg),
            HesoError::Validation(msg) | HesoError::DateParse(msg) => {
                UpdateLessonFailure::Invalid(msg)
            }
            other => {
                error!("Lesson update failed: {}", other);
                UpdateLessonFailure::Other
            }
        }
    }
}

pub async fn handle_update_lesson(
    service: &ScheduleService,
    request: &HttpRequest,
    payload: web::Payload,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(UpdateLessonFailure::Unauthenticated.into_response());
    };
    let storage = service.get_storage(request)?;

    match update_lesson(service, &storage, &user, request, payload).await {
        Ok(event) => Ok(HttpResponse::Ok().json(LessonAjaxResponse::success(
            "Lesson updated successfully.",
            event,
        ))),
        Err(failure) => {
            debug!("Lesson update rejected: {:?}", failure);
            Ok(failure.into_response())
        }
    }
}

async fn update_lesson(
    service: &ScheduleService,
    storage: &Arc<dyn Storage>,
    user: &User,
    request: &HttpRequest,
    payload: web::Payload,
) -> Result<CalendarEvent, UpdateLessonFailure> {
    let config = service.get_config();

    let (form, files) = if is_multipart(request) {
        read_multipart(
            request,
            payload,
            config.upload.max_material_size,
            config.upload.max_files,
        )
        .await?
    } else {
        let body = read_body(payload, config.server.limits.max_payload_size).await?;
        let form = serde_json::from_slice::<UpdateLessonRequest>(&body).map_err(|e| {
            debug!("Invalid lesson update body: {}", e);
            UpdateLessonFailure::invalid("Invalid request body.")
        })?;
        (form, Vec::new())
    };

    let lesson_id = form.id;
    let lesson = storage
        .get_lesson_by_id(lesson_id)
        .await?
        .ok_or_else(|| UpdateLessonFailure::NotFound("Lesson not found.".to_string()))?;
    let class = storage
        .get_class_by_id(lesson.class_id)
        .await?
        .ok_or_else(|| UpdateLessonFailure::NotFound("Lesson not found.".to_string()))?;

    if !class.is_managed_by(user) {
        return Err(UpdateLessonFailure::Forbidden(
            "You do not have permission to update this lesson.".to_string(),
        ));
    }

    let patch = into_patch(form, files)?;
    let updated = storage.apply_lesson_patch(lesson_id, patch).await?;
    info!("Lesson {} updated from calendar by user {}", lesson_id, user.id);

    let data = storage.load_calendar_data(Some(updated.class_id)).await?;
    build_calendar_event(&data, lesson_id)
        .ok_or_else(|| UpdateLessonFailure::NotFound("Lesson not found.".to_string()))
}

/// 把请求字段转换为局部更新
pub(crate) fn into_patch(
    form: UpdateLessonRequest,
    new_materials: Vec<UploadedMaterial>,
) -> Result<LessonPatch, UpdateLessonFailure> {
    let start_time = form.start.as_deref().map(parse_datetime).transpose()?;
    let end_time = form.end.as_deref().map(parse_datetime).transpose()?;
    let location = form
        .location
        .as_deref()
        .map(str::parse::<LessonLocation>)
        .transpose()
        .map_err(UpdateLessonFailure::Invalid)?;

    Ok(LessonPatch {
        description: form
            .description
            .map(|d| d.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())),
        start_time,
        end_time,
        location,
        // 显式传入 null 视为清空
        meeting_link: form.meeting_link.map(Option::unwrap_or_default),
        teacher_id: form.teacher,
        student_ids: form.students,
        material_ids: form.materials,
        new_materials,
    })
}

fn is_multipart(request: &HttpRequest) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

async fn read_body(
    mut payload: web::Payload,
    limit: usize,
) -> Result<web::BytesMut, UpdateLessonFailure> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            debug!("Failed to read request body: {}", e);
            UpdateLessonFailure::invalid("Unable to read the request body.")
        })?;
        if body.len() + chunk.len() > limit {
            return Err(UpdateLessonFailure::invalid("Request body is too large."));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

async fn read_multipart(
    request: &HttpRequest,
    payload: web::Payload,
    max_material_size: usize,
    max_files: usize,
) -> Result<(UpdateLessonRequest, Vec<UploadedMaterial>), UpdateLessonFailure> {
    let mut multipart = Multipart::new(request.headers(), payload);
    let mut form = UpdateLessonRequest::default();
    let mut lesson_id = None;
    let mut files = Vec::new();

    while let Some(mut field) = multipart.try_next().await.map_err(|e| {
        debug!("Invalid multipart payload: {}", e);
        UpdateLessonFailure::invalid("Invalid form data.")
    })? {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        let filename = content_disposition
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string());

        if name == "new_materials" {
            let content = read_field(&mut field, max_material_size).await?;
            // 未选择文件时浏览器也会提交空字段
            let Some(filename) = filename.filter(|f| !f.is_empty()) else {
                continue;
            };
            if files.len() >= max_files {
                return Err(UpdateLessonFailure::invalid("Too many files uploaded."));
            }
            files.push(UploadedMaterial { filename, content });
            continue;
        }

        let raw = read_field(&mut field, TEXT_FIELD_LIMIT).await?;
        let value = String::from_utf8(raw)
            .map_err(|_| UpdateLessonFailure::invalid("Invalid form data."))?;

        match name.as_str() {
            "lessonId" | "id" => lesson_id = parse_optional_id(&value)?,
            "description" => form.description = Some(Some(value)),
            "start" => form.start = Some(value),
            "end" => form.end = Some(value),
            "location" => form.location = Some(value),
            "meeting_link" => form.meeting_link = Some(Some(value)),
            "teacher" => form.teacher = parse_optional_id(&value)?,
            "students" | "students[]" => {
                push_ids(form.students.get_or_insert_with(Vec::new), &value)?
            }
            "materials" | "materials[]" => {
                push_ids(form.materials.get_or_insert_with(Vec::new), &value)?
            }
            other => debug!("Ignoring form field {}", other),
        }
    }

    form.id = lesson_id.ok_or_else(|| UpdateLessonFailure::invalid("Lesson id is required."))?;
    Ok((form, files))
}

async fn read_field(
    field: &mut actix_multipart::Field,
    limit: usize,
) -> Result<Vec<u8>, UpdateLessonFailure> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| {
            debug!("Failed to read form field: {}", e);
            UpdateLessonFailure::invalid("Invalid form data.")
        })?;
        if data.len() + chunk.len() > limit {
            return Err(UpdateLessonFailure::invalid("File size exceeds the limit."));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn parse_optional_id(value: &str) -> Result<Option<i64>, UpdateLessonFailure> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| UpdateLessonFailure::Invalid(format!("Invalid id: '{value}'")))
}

/// 同名字段可以重复出现，也可以是逗号分隔的列表
fn push_ids(ids: &mut Vec<i64>, value: &str) -> Result<(), UpdateLessonFailure> {
    for part in value.split(',') {
        if let Some(id) = parse_optional_id(part)? {
            ids.push(id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_mapping() {
        let failure = UpdateLessonFailure::from(HesoError::not_found("Teacher not found."));
        assert_eq!(failure.status(), StatusCode::NOT_FOUND);
        assert_eq!(failure.message(), "Teacher not found.");

        let failure = UpdateLessonFailure::from(HesoError::validation(
            "Meeting link is required for online lessons.",
        ));
        assert_eq!(failure.status(), StatusCode::BAD_REQUEST);

        // 驱动错误不返回给客户端
        let failure = UpdateLessonFailure::from(HesoError::database_operation("disk I/O error"));
        assert_eq!(failure, UpdateLessonFailure::Other);
        assert_eq!(failure.message(), "Unable to update the lesson.");

        assert_eq!(
            UpdateLessonFailure::Unauthenticated.status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_into_patch_only_touches_present_fields() {
        let form: UpdateLessonRequest =
            serde_json::from_str(r#"{"id": 3, "start": "2024-03-04T10:00:00Z"}"#).unwrap();
        let patch = into_patch(form, Vec::new()).unwrap();
        assert!(patch.start_time.is_some());
        assert!(patch.end_time.is_none());
        assert!(patch.location.is_none());
        assert!(patch.description.is_none());
        assert!(patch.teacher_id.is_none());
        assert!(patch.student_ids.is_none());
    }

    #[test]
    fn test_into_patch_rejects_bad_values() {
        let form: UpdateLessonRequest =
            serde_json::from_str(r#"{"id": 3, "location": "moon"}"#).unwrap();
        assert!(matches!(
            into_patch(form, Vec::new()),
            Err(UpdateLessonFailure::Invalid(_))
        ));

        let form: UpdateLessonRequest =
            serde_json::from_str(r#"{"id": 3, "end": "later"}"#).unwrap();
        assert!(matches!(
            into_patch(form, Vec::new()),
            Err(UpdateLessonFailure::Invalid(_))
        ));
    }

    #[test]
    fn test_null_meeting_link_clears() {
        let form: UpdateLessonRequest =
            serde_json::from_str(r#"{"id": 3, "meeting_link": null, "description": "  "}"#)
                .unwrap();
        let patch = into_patch(form, Vec::new()).unwrap();
        assert_eq!(patch.meeting_link, Some(String::new()));
        assert_eq!(patch.description, Some(None));
    }

    #[test]
    fn test_push_ids() {
        let mut ids = Vec::new();
        push_ids(&mut ids, "3, 4").unwrap();
        push_ids(&mut ids, "9").unwrap();
        assert_eq!(ids, vec![3, 4, 9]);
        assert!(push_ids(&mut ids, "x").is_err());
    }
}
