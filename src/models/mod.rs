//! 业务数据模型
//!
//! 与 `entity` 中的数据库实体分离，路由与服务层只接触这里的类型。

pub mod auth;
pub mod classes;
pub mod common;
pub mod lessons;
pub mod materials;
pub mod schedules;
pub mod users;

pub use common::{ApiResponse, FormErrors, PaginatedResponse, PaginationInfo, PaginationQuery};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 响应中的数字错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    ValidationFailed = 1022,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证
    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserNotFound = 2004,

    // 班级
    ClassNotFound = 3004,
    ClassPermissionDenied = 3003,
    ClassCreationFailed = 3010,
    ClassUpdateFailed = 3011,
    ClassDeleteFailed = 3012,

    // 课时
    LessonNotFound = 4004,
    LessonPermissionDenied = 4003,
    LessonCreationFailed = 4010,
    LessonUpdateFailed = 4011,
    LessonDeleteFailed = 4012,

    // 资料
    MaterialNotFound = 5004,
    FileSizeExceeded = 5013,
    FileUploadFailed = 5010,
}
