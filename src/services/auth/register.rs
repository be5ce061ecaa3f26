use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::{error, info};

use crate::mail::welcome_mail;
use crate::models::{
    ApiResponse, FormErrors,
    auth::{FormSchemaResponse, RegisterRequest},
    users::{CreateUserRequest, UserRole},
};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_username};

use super::AuthService;

const PHONE_NUMBER_MAX_LENGTH: usize = 15;

pub async fn handle_register_form() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        FormSchemaResponse::register(),
        "Register form",
    )))
}

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // 1. 字段校验，收集全部错误后一起返回
    let errors = match validate_register_request(&storage, &register_request).await {
        Ok(errors) => errors,
        Err(resp) => return Ok(resp),
    };
    if !errors.is_empty() {
        return Ok(super::super::form_errors(errors));
    }

    // 2. 哈希密码
    let password_hash = match hash_password(&register_request.password1) {
        Ok(hash) => hash,
        Err(e) => return Ok(super::super::internal_error("Register failed", e)),
    };

    let username = register_request.username.trim().to_string();
    let email = register_request.email.trim().to_string();
    let phone_number = register_request
        .phone_number
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    // 3. 创建学生账号
    let user = match storage
        .create_user(CreateUserRequest {
            username: username.clone(),
            email: email.clone(),
            password: password_hash,
            role: UserRole::Student,
            phone_number,
            enrollment_date: None,
        })
        .await
    {
        Ok(user) => user,
        Err(e) => return Ok(super::super::internal_error("Register failed", e)),
    };

    // 4. 欢迎邮件，发送失败不影响注册结果
    let mailer = super::super::mailer_from(request)?;
    if let Err(e) = mailer.send(welcome_mail(&username, &email)).await {
        error!("Failed to send welcome mail to {}: {}", email, e);
    }

    info!("Account created for {}", user.username);
    Ok(HttpResponse::Created().json(ApiResponse::success(
        user,
        format!("Account created for {username}!"),
    )))
}

async fn validate_register_request(
    storage: &Arc<dyn Storage>,
    req: &RegisterRequest,
) -> Result<FormErrors, HttpResponse> {
    let mut errors = FormErrors::new();
    let username = req.username.trim();
    let email = req.email.trim();

    match validate_username(username) {
        Err(msg) => errors.add("username", msg),
        Ok(()) => match storage.get_user_by_username(username).await {
            Ok(Some(_)) => errors.add("username", "A user with that username already exists."),
            Ok(None) => {}
            Err(e) => return Err(super::super::internal_error("Register failed", e)),
        },
    }

    match validate_email(email) {
        Err(msg) => errors.add("email", msg),
        Ok(()) => match storage.get_user_by_email(email).await {
            Ok(Some(_)) => errors.add("email", "This email address is already in use."),
            Ok(None) => {}
            Err(e) => return Err(super::super::internal_error("Register failed", e)),
        },
    }

    if req.password1.is_empty() {
        errors.add("password1", "This field is required.");
    }
    if req.password2.is_empty() {
        errors.add("password2", "This field is required.");
    }
    if !req.password1.is_empty() && !req.password2.is_empty() {
        if req.password1 != req.password2 {
            errors.add("password2", "The two password fields didn't match.");
        } else {
            let result = validate_password(&req.password2, username);
            for msg in result.errors {
                errors.add("password2", msg);
            }
        }
    }

    if let Some(phone) = &req.phone_number
        && phone.trim().chars().count() > PHONE_NUMBER_MAX_LENGTH
    {
        errors.add("phone_number", "Ensure this value has at most 15 characters.");
    }

    Ok(errors)
}
