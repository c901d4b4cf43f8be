use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 闪存消息级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/page.ts")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

// 一次性提示消息，跟随重定向在下一个页面展示
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/page.ts")]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// 页面负载：前端组件名 + 属性 + 待展示的闪存消息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/page.ts")]
pub struct PageResponse<T: TS> {
    pub component: String,
    pub props: T,
    pub flash: Option<FlashMessage>,
}
