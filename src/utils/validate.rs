use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("Invalid url regex"));

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "admin123",
    "letmein1",
    "welcome1",
    "abcd1234",
    "11111111",
];

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.is_empty() {
        return Err("This field is required.");
    }
    if username.chars().count() > USERNAME_MAX_LENGTH {
        return Err("Ensure this value has at most 150 characters.");
    }
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.is_empty() {
        return Err("This field is required.");
    }
    if !EMAIL_RE.is_match(email) {
        return Err("Enter a valid email address.");
    }
    Ok(())
}

/// 校验链接格式，只接受 http/https
pub fn validate_url(url: &str) -> Result<(), &'static str> {
    if !URL_RE.is_match(url) {
        return Err("Enter a valid URL.");
    }
    Ok(())
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 验证密码是否符合安全策略
///
/// - 至少 8 个字符
/// - 不能全为数字
/// - 不能是常见密码
/// - 不能与用户名过于相似
pub fn validate_password(password: &str, username: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        errors.push("This password is too short. It must contain at least 8 characters.");
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.");
    }

    if COMMON_PASSWORDS
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("This password is too common.");
    }

    if is_too_similar(password, username) {
        errors.push("The password is too similar to the username.");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn is_too_similar(password: &str, username: &str) -> bool {
    if username.chars().count() < 3 || password.is_empty() {
        return false;
    }
    let password = password.to_lowercase();
    let username = username.to_lowercase();
    password.contains(&username) || username.contains(&password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username() {
        assert!(validate_username("student.one+x@heso").is_ok());
        assert!(validate_username("bad name").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
        assert!(validate_username(&"a".repeat(150)).is_ok());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("teacher1@example.com").is_ok());
        assert!(validate_email("teacher1@example").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_url() {
        assert!(validate_url("https://meet.google.com/abcdefghij").is_ok());
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("meet.google.com/abc").is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("Lantern-Harbor-42", "alice").is_valid);
        assert!(validate_password("quietriver88", "bob_student").is_valid);
    }

    #[test]
    fn test_short_password() {
        let result = validate_password("Ab1", "alice");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"This password is too short. It must contain at least 8 characters.")
        );
    }

    #[test]
    fn test_numeric_password() {
        let result = validate_password("84736251", "alice");
        assert!(result.errors.contains(&"This password is entirely numeric."));
    }

    #[test]
    fn test_common_password() {
        let result = validate_password("Password123", "alice");
        assert!(result.errors.contains(&"This password is too common."));
    }

    #[test]
    fn test_similar_password() {
        let result = validate_password("newstudent2024", "NewStudent");
        assert!(
            result
                .errors
                .contains(&"The password is too similar to the username.")
        );
    }
}
