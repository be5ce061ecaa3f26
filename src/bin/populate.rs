//! 写入演示数据：超级管理员、教师、学生、班级、课时与资料

use dotenv::dotenv;
use tracing::{info, warn};

use heso_schedule::config::AppConfig;
use heso_schedule::seed;
use heso_schedule::storage::create_storage;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    AppConfig::init().map_err(std::io::Error::other)?;
    let config = AppConfig::get();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.app.log_level))
        .init();

    warn!("Populating database {}", config.database.url);

    let storage = create_storage().await.map_err(std::io::Error::other)?;
    let summary = seed::populate(&storage, &mut rand::rng())
        .await
        .map_err(std::io::Error::other)?;

    info!(
        users_created = summary.users_created,
        classes = summary.classes,
        lessons = summary.lessons,
        materials = summary.materials,
        "Database populated successfully"
    );

    Ok(())
}
