use super::entities::UserRole;
use serde::Deserialize;
use ts_rs::TS;

// 用户创建请求（用于存储层，password 字段存放哈希值）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}
