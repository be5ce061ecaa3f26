use super::entities::UserRole;

// 用户创建请求（存储层），password 为已哈希的值
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub phone_number: Option<String>,
    pub enrollment_date: Option<chrono::NaiveDate>,
}
