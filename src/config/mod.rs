//! 配置管理
//!
//! 按顺序合并：内置默认值 → config.toml → config.{APP_ENV}.toml → HESO_* 环境变量 → 常用环境变量覆盖。

mod loader;
mod structs;

pub use structs::*;
