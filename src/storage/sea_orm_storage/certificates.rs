use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{certificates, enrollments};
use crate::errors::{LmsError, Result};
use crate::models::certificates::entities::{
    Certificate, CertificateIssuance, CertificateNumbering,
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, SqlErr,
    TransactionSession, TransactionTrait, TryInsertResult,
};
use tracing::{debug, info};

async fn find_by_enrollment<C: ConnectionTrait>(
    conn: &C,
    enrollment_id: i64,
) -> Result<Option<certificates::Model>> {
    Certificates::find()
        .filter(certificates::Column::EnrollmentId.eq(enrollment_id))
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询证书失败: {e}")))
}

/// 单次写入证书的结果
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CertificateInsert {
    Inserted,
    /// 该选课已有证书（并发签发）
    EnrollmentTaken,
    /// 证书编号已被占用，需要换一个编号重试
    NumberTaken,
}

/// 在保存点内写入一张证书，编号冲突不会中止外层事务
pub(crate) async fn insert_certificate<C: ConnectionTrait + TransactionTrait>(
    conn: &C,
    enrollment_id: i64,
    number: &str,
    issued_at: i64,
) -> Result<CertificateInsert> {
    let savepoint = conn
        .begin()
        .await
        .map_err(|e| LmsError::database_operation(format!("开启保存点失败: {e}")))?;

    let model = CertificateActiveModel {
        enrollment_id: Set(enrollment_id),
        certificate_number: Set(number.to_string()),
        file_path: Set(None),
        issued_at: Set(issued_at),
        ..Default::default()
    };
    let result = Certificates::insert(model)
        .on_conflict(
            OnConflict::column(certificates::Column::EnrollmentId)
                .do_nothing()
                .to_owned(),
        )
        .do_nothing()
        .exec(&savepoint)
        .await;

    match result {
        Ok(TryInsertResult::Inserted(_)) => {
            savepoint
                .commit()
                .await
                .map_err(|e| LmsError::database_operation(format!("提交保存点失败: {e}")))?;
            Ok(CertificateInsert::Inserted)
        }
        Ok(TryInsertResult::Conflicted | TryInsertResult::Empty) => {
            savepoint
                .commit()
                .await
                .map_err(|e| LmsError::database_operation(format!("提交保存点失败: {e}")))?;
            Ok(CertificateInsert::EnrollmentTaken)
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            savepoint
                .rollback()
                .await
                .map_err(|e| LmsError::database_operation(format!("回滚保存点失败: {e}")))?;
            Ok(CertificateInsert::NumberTaken)
        }
        Err(e) => Err(LmsError::database_operation(format!("签发证书失败: {e}"))),
    }
}

/// 在给定事务内为已完成的选课签发证书
///
/// 已有证书时返回原证书；enrollment_id 上的唯一约束兜底并发签发，
/// 编号冲突时换号重试。
pub(crate) async fn issue_certificate_in<C: ConnectionTrait + TransactionTrait>(
    conn: &C,
    enrollment: &enrollments::Model,
    numbering: &CertificateNumbering,
) -> Result<CertificateIssuance> {
    if !enrollment.is_completed {
        return Ok(CertificateIssuance::NotEligible);
    }
    if let Some(existing) = find_by_enrollment(conn, enrollment.id).await? {
        return Ok(CertificateIssuance::AlreadyIssued(existing.into_certificate()));
    }

    let issued_at = chrono::Utc::now();
    for attempt in 1..=numbering.max_attempts {
        let number = numbering.generate(issued_at);
        let taken = Certificates::find()
            .filter(certificates::Column::CertificateNumber.eq(number.as_str()))
            .count(conn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询证书编号失败: {e}")))?
            > 0;
        if taken {
            debug!("Certificate number {} already taken (attempt {})", number, attempt);
            continue;
        }

        let outcome =
            insert_certificate(conn, enrollment.id, &number, issued_at.timestamp()).await?;
        if outcome == CertificateInsert::NumberTaken {
            debug!("Certificate number {} claimed concurrently (attempt {})", number, attempt);
            continue;
        }

        let certificate = find_by_enrollment(conn, enrollment.id)
            .await?
            .ok_or_else(|| LmsError::database_operation("证书写入后未找到"))?
            .into_certificate();

        return Ok(match outcome {
            CertificateInsert::Inserted => {
                info!(
                    "Certificate {} issued for enrollment {}",
                    certificate.certificate_number, enrollment.id
                );
                CertificateIssuance::Issued(certificate)
            }
            _ => CertificateIssuance::AlreadyIssued(certificate),
        });
    }

    Err(LmsError::database_operation(format!(
        "生成唯一证书编号失败，已尝试 {} 次",
        numbering.max_attempts
    )))
}

impl SeaOrmStorage {
    /// 选课完成后签发证书；重复调用只会得到同一张证书
    pub async fn issue_certificate_if_eligible_impl(
        &self,
        enrollment_id: i64,
    ) -> Result<CertificateIssuance> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LmsError::database_operation(format!("开启事务失败: {e}")))?;

        let enrollment = Enrollments::find_by_id(enrollment_id)
            .one(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询选课失败: {e}")))?
            .ok_or_else(|| LmsError::not_found(format!("Enrollment {enrollment_id} not found")))?;

        let issuance = issue_certificate_in(&txn, &enrollment, &self.numbering).await?;

        txn.commit()
            .await
            .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(issuance)
    }

    pub async fn get_certificate_by_enrollment_impl(
        &self,
        enrollment_id: i64,
    ) -> Result<Option<Certificate>> {
        Ok(find_by_enrollment(&self.db, enrollment_id)
            .await?
            .map(|m| m.into_certificate()))
    }

    pub async fn count_certificates_impl(&self) -> Result<i64> {
        let count = Certificates::find()
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计证书失败: {e}")))?;
        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_user, sample_course, test_storage};
    use super::{CertificateInsert, insert_certificate};
    use crate::models::certificates::entities::CertificateIssuance;
    use crate::models::enrollments::requests::CreateEnrollmentRequest;
    use crate::models::users::entities::UserRole;
    use sea_orm::TransactionTrait;
    use test_log::test;

    #[test(tokio::test)]
    async fn test_incomplete_enrollment_not_eligible() {
        let (storage, _dir) = test_storage().await;
        let teacher = create_user(&storage, "t@eduplatform.com", UserRole::Teacher).await;
        let student = create_user(&storage, "s@eduplatform.com", UserRole::Student).await;
        let sample = sample_course(&storage, teacher.id).await;
        let enrollment = storage
            .enroll_student_impl(CreateEnrollmentRequest {
                student_id: student.id,
                course_id: sample.course.id,
                currency: "USD".into(),
            })
            .await
            .unwrap();

        let issuance = storage
            .issue_certificate_if_eligible_impl(enrollment.id)
            .await
            .unwrap();
        assert!(matches!(issuance, CertificateIssuance::NotEligible));
        assert_eq!(storage.count_certificates_impl().await.unwrap(), 0);

        assert!(
            storage
                .issue_certificate_if_eligible_impl(9999)
                .await
                .is_err()
        );
    }

    #[test(tokio::test)]
    async fn test_taken_number_is_reported_for_retry() {
        let (storage, _dir) = test_storage().await;
        let teacher = create_user(&storage, "t@eduplatform.com", UserRole::Teacher).await;
        let sample = sample_course(&storage, teacher.id).await;
        let mut enrollment_ids = Vec::new();
        for email in ["a@eduplatform.com", "b@eduplatform.com"] {
            let student = create_user(&storage, email, UserRole::Student).await;
            let enrollment = storage
                .enroll_student_impl(CreateEnrollmentRequest {
                    student_id: student.id,
                    course_id: sample.course.id,
                    currency: "USD".into(),
                })
                .await
                .unwrap();
            enrollment_ids.push(enrollment.id);
        }

        let txn = storage.db.begin().await.unwrap();
        let now = chrono::Utc::now().timestamp();
        assert_eq!(
            insert_certificate(&txn, enrollment_ids[0], "EDU-2025-SAME", now)
                .await
                .unwrap(),
            CertificateInsert::Inserted
        );
        // 编号冲突不会让事务失效
        assert_eq!(
            insert_certificate(&txn, enrollment_ids[1], "EDU-2025-SAME", now)
                .await
                .unwrap(),
            CertificateInsert::NumberTaken
        );
        assert_eq!(
            insert_certificate(&txn, enrollment_ids[0], "EDU-2025-OTHER", now)
                .await
                .unwrap(),
            CertificateInsert::EnrollmentTaken
        );
        assert_eq!(
            insert_certificate(&txn, enrollment_ids[1], "EDU-2025-NEXT", now)
                .await
                .unwrap(),
            CertificateInsert::Inserted
        );
        txn.commit().await.unwrap();

        assert_eq!(storage.count_certificates_impl().await.unwrap(), 2);
    }
}
