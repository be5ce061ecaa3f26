use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

const DEVELOPMENT_JWT_SECRET: &str = "heso-development-secret-change-me";

/// 内置默认值，保证没有配置文件时也能启动（测试环境即如此）
fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("app.system_name", "HESO")?
        .set_default("app.environment", "development")?
        .set_default("app.log_level", "info")?
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8000_i64)?
        .set_default("server.unix_socket_path", "")?
        .set_default("server.workers", 0_i64)?
        .set_default("server.max_workers", 8_i64)?
        .set_default("server.timeouts.client_request", 5000_i64)?
        .set_default("server.timeouts.client_disconnect", 1000_i64)?
        .set_default("server.timeouts.keep_alive", 30_i64)?
        .set_default("server.limits.max_payload_size", 10_485_760_i64)?
        .set_default("jwt.secret", DEVELOPMENT_JWT_SECRET)?
        .set_default("jwt.access_token_expiry", 60_i64)?
        .set_default("jwt.refresh_token_expiry", 7_i64)?
        .set_default("argon2.memory_cost", 19_456_i64)?
        .set_default("argon2.time_cost", 2_i64)?
        .set_default("argon2.parallelism", 1_i64)?
        .set_default("database.url", "heso.db")?
        .set_default("database.pool_size", 10_i64)?
        .set_default("database.timeout", 30_i64)?
        .set_default("cache.type", "moka")?
        .set_default("cache.default_ttl", 3600_i64)?
        .set_default("cache.redis.url", "redis://127.0.0.1:6379")?
        .set_default("cache.redis.key_prefix", "heso:")?
        .set_default("cache.memory.max_capacity", 10_000_i64)?
        .set_default("cors.max_age", 3600_i64)?
        .set_default("rate_limit.window_secs", 60_i64)?
        .set_default("rate_limit.login", 5_i64)?
        .set_default("rate_limit.register", 3_i64)?
        .set_default("rate_limit.refresh", 10_i64)?
        .set_default("upload.max_material_size", 5_242_880_i64)?
        .set_default("upload.max_files", 10_i64)?
        .set_default("mail.backend", "log")?
        .set_default("mail.from_address", "noreply@heso.com")?
        .set_default("mail.welcome_subject", "Welcome to HESO!")?
        .set_default("color.saturation", 100_i64)?
        .set_default("color.lightness", 30_i64)
}

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = with_defaults(Config::builder())?
            .add_source(File::with_name("config").required(false))
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // HESO_DATABASE__URL -> database.url
            .add_source(
                Environment::with_prefix("HESO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("cache.redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option("mail.from_address", std::env::var("DEFAULT_FROM_EMAIL").ok())?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers).max(1);
        }

        if app_config.is_production() && app_config.jwt.secret == DEVELOPMENT_JWT_SECRET {
            return Err(ConfigError::Message(
                "JWT_SECRET must be set in production".to_string(),
            ));
        }

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize() {
        let config: AppConfig = with_defaults(Config::builder())
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.app.system_name, "HESO");
        assert_eq!(config.cache.cache_type, "moka");
        assert_eq!(config.mail.from_address, "noreply@heso.com");
        assert_eq!(config.mail.welcome_subject, "Welcome to HESO!");
        assert_eq!(config.color.saturation, 100);
        assert_eq!(config.color.lightness, 30);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.rate_limit.register, 3);
        assert!(config.is_development());
        assert_eq!(config.server_bind_address(), "127.0.0.1:8000");
    }
}
