//! 邮件发送
//!
//! 只提供发送接口，`log` 后端把邮件写入日志，`memory` 后端供测试检查已发送内容。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::{HesoError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<()>;
}

/// 写入日志，不实际投递
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        info!(
            from = %mail.from,
            to = ?mail.to,
            subject = %mail.subject,
            "Mail sent: {}",
            mail.body
        );
        Ok(())
    }
}

/// 保存在内存中的邮件
#[derive(Debug, Default, Clone)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        let mut guard = self
            .sent
            .lock()
            .map_err(|e| HesoError::mail(format!("邮件队列不可用: {e}")))?;
        guard.push(mail);
        Ok(())
    }
}

/// 按配置创建邮件后端
pub fn create_mailer() -> Result<Arc<dyn Mailer>> {
    let backend = AppConfig::get().mail.backend.as_str();
    match backend {
        "log" => Ok(Arc::new(LogMailer)),
        "memory" => Ok(Arc::new(MemoryMailer::new())),
        other => Err(HesoError::mail(format!("未知的邮件后端: {other}"))),
    }
}

/// 注册成功后的欢迎邮件
pub fn welcome_mail(username: &str, email: &str) -> OutgoingMail {
    let config = &AppConfig::get().mail;
    OutgoingMail {
        from: config.from_address.clone(),
        to: vec![email.to_string()],
        subject: config.welcome_subject.clone(),
        body: format!("Hi {username}, thank you for registering at HESO-site."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_memory_mailer_records() {
        let mailer = MemoryMailer::new();
        let handle: Arc<dyn Mailer> = Arc::new(mailer.clone());
        handle.send(welcome_mail("alice", "alice@example.com")).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Welcome to HESO!");
        assert_eq!(sent[0].from, "noreply@heso.com");
        assert_eq!(sent[0].to, vec!["alice@example.com".to_string()]);
        assert_eq!(
            sent[0].body,
            "Hi alice, thank you for registering at HESO-site."
        );
    }
}
