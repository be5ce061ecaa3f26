use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::errors::{HesoError, Result};
use crate::mail::{Mailer, create_mailer};
use crate::models::users::{CreateUserRequest, UserRole};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 默认超级管理员账号
pub const DEFAULT_SUPERUSER_NAME: &str = "admin";
pub const DEFAULT_SUPERUSER_EMAIL: &str = "admin@localhost";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub mailer: Arc<dyn Mailer>,
}

/// 按名称构造缓存后端
async fn build_cache(name: &str) -> Option<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name)?;
    match constructor().await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", name);
            Some(Arc::from(cache))
        }
        Err(e) => {
            warn!("Failed to create {} cache: {}", name, e);
            None
        }
    }
}

/// 创建缓存实例，配置的后端不可用时回退到 moka
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = AppConfig::get().cache.cache_type.as_str();

    warn!("Attempting to create {} cache backend", cache_type);

    if let Some(cache) = build_cache(cache_type).await {
        return Ok(cache);
    }

    if cache_type != "moka" {
        warn!("Falling back to Moka (in-memory) cache");
        if let Some(cache) = build_cache("moka").await {
            return Ok(cache);
        }
    }

    Err(HesoError::cache_plugin_not_found(format!(
        "No cache backend available (tried: {cache_type})"
    )))
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 数据库为空时创建默认超级管理员，返回是否创建
pub async fn seed_superuser(storage: &Arc<dyn Storage>, password: Option<String>) -> Result<bool> {
    let count = storage.count_users().await?;
    if count > 0 {
        debug!(
            "Database already has {} user(s), skipping superuser seed",
            count
        );
        return Ok(false);
    }

    info!("No users found in database, creating default superuser account...");

    let password = password.unwrap_or_else(|| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  SUPERUSER PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated superuser password: {}", pwd);
        warn!("  Please save this password or set HESO_SUPERUSER_PASSWORD");
        warn!("==========================================================");
        pwd
    });

    let user = storage
        .create_user(CreateUserRequest {
            username: DEFAULT_SUPERUSER_NAME.to_string(),
            email: DEFAULT_SUPERUSER_EMAIL.to_string(),
            password: hash_password(&password)?,
            role: UserRole::Superuser,
            phone_number: None,
            enrollment_date: None,
        })
        .await?;

    info!(
        "Default superuser created (ID: {}, username: {})",
        user.id, user.username
    );
    Ok(true)
}

/// 准备服务器启动的上下文：存储、缓存和邮件后端
pub async fn prepare_server_startup() -> Result<StartupContext> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    if let Err(e) = seed_superuser(&storage, std::env::var("HESO_SUPERUSER_PASSWORD").ok()).await
    {
        warn!("Failed to seed superuser: {}", e);
    }

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    let mailer = create_mailer()?;
    warn!("Mail backend '{}' initialized", AppConfig::get().mail.backend);

    Ok(StartupContext {
        storage,
        cache,
        mailer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[test]
    fn test_generate_random_password() {
        let pwd = generate_random_password(16);
        assert_eq!(pwd.chars().count(), 16);
        assert_ne!(pwd, generate_random_password(16));
    }

    #[actix_web::test]
    async fn test_seed_superuser_once() {
        let storage: Arc<dyn Storage> =
            Arc::new(SeaOrmStorage::from_url("sqlite::memory:").await.unwrap());

        assert!(seed_superuser(&storage, Some("secret-pass".into())).await.unwrap());
        assert!(!seed_superuser(&storage, None).await.unwrap());

        let user = storage
            .get_user_by_username(DEFAULT_SUPERUSER_NAME)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, UserRole::Superuser);
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }
}
