use crate::models::users::entities::User;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub user: User,
}

/// 表单字段描述，供前端渲染注册/登录表单
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormSchemaResponse {
    pub fields: Vec<FormField>,
}

impl FormSchemaResponse {
    pub fn register() -> Self {
        Self {
            fields: vec![
                FormField {
                    name: "username",
                    label: "Username",
                    input_type: "text",
                    required: true,
                    help_text: Some(
                        "Required. 150 characters or fewer. Letters, digits and @/./+/-/_ only.",
                    ),
                },
                FormField {
                    name: "email",
                    label: "Email",
                    input_type: "email",
                    required: true,
                    help_text: None,
                },
                FormField {
                    name: "password1",
                    label: "Password",
                    input_type: "password",
                    required: true,
                    help_text: Some(
                        "Your password must contain at least 8 characters, can't be a commonly used password and can't be entirely numeric.",
                    ),
                },
                FormField {
                    name: "password2",
                    label: "Password confirmation",
                    input_type: "password",
                    required: true,
                    help_text: Some("Enter the same password as before, for verification."),
                },
                FormField {
                    name: "phone_number",
                    label: "Phone number",
                    input_type: "text",
                    required: false,
                    help_text: Some("Optional."),
                },
            ],
        }
    }

    pub fn login() -> Self {
        Self {
            fields: vec![
                FormField {
                    name: "username",
                    label: "Username or email",
                    input_type: "text",
                    required: true,
                    help_text: None,
                },
                FormField {
                    name: "password",
                    label: "Password",
                    input_type: "password",
                    required: true,
                    help_text: None,
                },
            ],
        }
    }
}
