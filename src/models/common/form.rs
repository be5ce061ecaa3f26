use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 按字段归类的表单错误
///
/// 序列化为 `{"field": ["message", ...]}`，`__all__` 存放与具体字段无关的错误。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub const NON_FIELD: &'static str = "__all__";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// 没有错误时返回 `Ok(value)`
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_by_field() {
        let mut errors = FormErrors::new();
        errors.add("username", "A user with that username already exists.");
        errors.add("username", "Enter a valid username.");
        errors.add("email", "This email address is already in use.");

        assert_eq!(errors.get("username").len(), 2);
        assert!(errors.has("email"));
        assert!(errors.get("password2").is_empty());

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json["email"][0],
            serde_json::json!("This email address is already in use.")
        );
    }

    #[test]
    fn test_into_result() {
        assert_eq!(FormErrors::new().into_result(7), Ok(7));
        let mut errors = FormErrors::new();
        errors.add(FormErrors::NON_FIELD, "nope");
        assert!(errors.into_result(()).is_err());
    }
}
