use crate::config::AppConfig;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::seed::seed_demo_data;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
}

/// 生成随机密码，保证满足密码策略（大小写字母与数字各至少一个）
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    let body: String = (0..length.saturating_sub(3))
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();
    format!(
        "{}{}{}{}",
        body,
        rng.random_range(b'A'..=b'Z') as char,
        rng.random_range(b'a'..=b'z') as char,
        rng.random_range(b'0'..=b'9') as char
    )
}

/// 用户表为空时创建默认管理员
async fn seed_admin(storage: &Arc<dyn Storage>) {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping admin seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default administrator account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return;
        }
    }

    // 优先使用环境变量中的密码，否则生成随机密码并只打印一次
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return;
        }
    };

    let admin_request = CreateUserRequest {
        name: "Administrator".to_string(),
        email: "admin@eduplatform.com".to_string(),
        password: password_hash,
        role: UserRole::Administrator,
    };

    match storage.create_user(admin_request).await {
        Ok(user) => {
            info!(
                "Default administrator account created (ID: {}, email: {})",
                user.id, user.email
            );
        }
        Err(e) => {
            warn!("Failed to create administrator account: {}", e);
        }
    }
}

/// 准备服务器启动的上下文：加密库、存储（含迁移）与初始数据
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&storage).await;

    if AppConfig::get().app.seed_demo_data {
        if let Err(e) = seed_demo_data(&storage).await {
            warn!("Failed to seed demo data: {}", e);
        }
    }

    StartupContext { storage }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::validate_password;

    #[test]
    fn test_generated_password_meets_policy() {
        for _ in 0..20 {
            let password = generate_random_password(16);
            assert_eq!(password.chars().count(), 16);
            assert!(validate_password(&password).is_ok(), "{password}");
        }
    }
}
