use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{LmsError, Result};
use crate::models::users::{
    entities::{User, UserRole},
    requests::CreateUserRequest,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 创建用户，邮箱需预先规范化
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            email: Set(req.email),
            password_hash: Set(req.password),
            role: Set(req.role.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建用户失败: {e}")))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_users_impl(&self) -> Result<i64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计用户失败: {e}")))?;
        Ok(count as i64)
    }

    pub async fn count_active_users_by_role_impl(&self, role: UserRole) -> Result<i64> {
        let count = Users::find()
            .filter(Column::Role.eq(role.to_string()))
            .filter(Column::IsActive.eq(true))
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计用户失败: {e}")))?;
        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_user, test_storage};
    use crate::models::users::entities::UserRole;
    use test_log::test;

    #[test(tokio::test)]
    async fn test_create_and_lookup_user() {
        let (storage, _dir) = test_storage().await;
        let user = create_user(&storage, "alice@eduplatform.com", UserRole::Student).await;

        let by_email = storage
            .get_user_by_email_impl("alice@eduplatform.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.role, UserRole::Student);
        assert!(by_email.is_active);
        assert!(by_email.last_login.is_none());

        assert!(storage.update_last_login_impl(user.id).await.unwrap());
        let reloaded = storage.get_user_by_id_impl(user.id).await.unwrap().unwrap();
        assert!(reloaded.last_login.is_some());
    }

    #[test(tokio::test)]
    async fn test_duplicate_email_rejected() {
        let (storage, _dir) = test_storage().await;
        create_user(&storage, "dup@eduplatform.com", UserRole::Student).await;

        let result = storage
            .create_user_impl(crate::models::users::requests::CreateUserRequest {
                name: "Another".to_string(),
                email: "dup@eduplatform.com".to_string(),
                password: "hash".to_string(),
                role: UserRole::Teacher,
            })
            .await;
        assert!(result.is_err());
    }

    #[test(tokio::test)]
    async fn test_count_by_role() {
        let (storage, _dir) = test_storage().await;
        create_user(&storage, "s1@eduplatform.com", UserRole::Student).await;
        create_user(&storage, "s2@eduplatform.com", UserRole::Student).await;
        create_user(&storage, "t1@eduplatform.com", UserRole::Teacher).await;

        assert_eq!(storage.count_users_impl().await.unwrap(), 3);
        assert_eq!(
            storage
                .count_active_users_by_role_impl(UserRole::Student)
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            storage
                .count_active_users_by_role_impl(UserRole::Administrator)
                .await
                .unwrap(),
            0
        );
    }
}
