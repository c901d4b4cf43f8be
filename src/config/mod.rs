//! 配置管理
//!
//! 默认值 -> config 文件 -> config.{APP_ENV} 文件 -> 环境变量，逐层覆盖。

mod r#impl;
mod structs;

pub use structs::*;
