use serde::{Deserialize, Serialize};

use crate::models::users::User;

/// 表单里代表"未指定颜色"的默认值
pub const DEFAULT_CLASS_COLOR: &str = "#FFFFFF";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnglishClass {
    pub id: i64,
    pub title: String,
    pub description: String,
    // 日历中的背景色，首次保存时分配
    pub color: String,
    pub teacher_id: i64,
    pub student_ids: Vec<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl EnglishClass {
    pub fn number_of_students(&self) -> usize {
        self.student_ids.len()
    }

    pub fn has_student(&self, user_id: i64) -> bool {
        self.student_ids.contains(&user_id)
    }

    /// 超级管理员或本班教师可以修改班级及其课时
    pub fn is_managed_by(&self, user: &User) -> bool {
        user.is_superuser() || (user.is_teacher() && user.id == self.teacher_id)
    }

    /// 管理者或已选课学生可以查看课时
    pub fn is_visible_to(&self, user: &User) -> bool {
        self.is_managed_by(user) || (user.is_student() && self.has_student(user.id))
    }
}

/// 颜色为空或等于表单默认值时需要自动分配
pub fn needs_generated_color(color: Option<&str>) -> bool {
    match color.map(str::trim) {
        None => true,
        Some(c) => c.is_empty() || c.eq_ignore_ascii_case(DEFAULT_CLASS_COLOR),
    }
}

/// 新建班级（颜色已确定）
#[derive(Debug, Clone)]
pub struct NewClass {
    pub title: String,
    pub description: String,
    pub color: String,
    pub teacher_id: i64,
    pub student_ids: Vec<i64>,
}

/// 班级更新，`student_ids` 整体替换现有成员
#[derive(Debug, Clone)]
pub struct ClassUpdate {
    pub title: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub teacher_id: i64,
    pub student_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::UserRole;

    fn user(id: i64, role: UserRole) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            password_hash: String::new(),
            role,
            phone_number: None,
            enrollment_date: None,
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn class() -> EnglishClass {
        EnglishClass {
            id: 1,
            title: "English 101".to_string(),
            description: String::new(),
            color: "hsl(10, 100%, 30%)".to_string(),
            teacher_id: 2,
            student_ids: vec![5, 6],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_access_rules() {
        let c = class();
        assert!(c.is_managed_by(&user(1, UserRole::Superuser)));
        assert!(c.is_managed_by(&user(2, UserRole::Teacher)));
        assert!(!c.is_managed_by(&user(3, UserRole::Teacher)));
        assert!(c.is_visible_to(&user(5, UserRole::Student)));
        assert!(!c.is_visible_to(&user(7, UserRole::Student)));
        assert!(!c.is_managed_by(&user(5, UserRole::Student)));
        assert_eq!(c.number_of_students(), 2);
    }

    #[test]
    fn test_needs_generated_color() {
        assert!(needs_generated_color(None));
        assert!(needs_generated_color(Some("")));
        assert!(needs_generated_color(Some("#ffffff")));
        assert!(!needs_generated_color(Some("hsl(1, 100%, 30%)")));
    }
}
