use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{certificates, courses, enrollments, users};
use crate::errors::{LmsError, Result};
use crate::models::{
    enrollments::{
        entities::{Enrollment, PaymentRecord},
        requests::CreateEnrollmentRequest,
        responses::StudentEnrollmentItem,
    },
    users::entities::UserRole,
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    SqlErr, TransactionTrait, TryInsertResult,
};
use tracing::info;

fn already_enrolled(student_id: i64, course_id: i64) -> LmsError {
    LmsError::already_enrolled(format!(
        "Student {student_id} is already enrolled in course {course_id}"
    ))
}

/// 唯一约束冲突视为重复选课，其余数据库错误原样上报
fn map_insert_error(err: DbErr, student_id: i64, course_id: i64) -> LmsError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => already_enrolled(student_id, course_id),
        _ => LmsError::database_operation(format!("创建选课失败: {err}")),
    }
}

impl SeaOrmStorage {
    /// 学生选课
    ///
    /// 角色、课程状态、重复检查与写入在同一事务内完成；
    /// (student_id, course_id) 唯一约束兜底并发的重复选课。
    pub async fn enroll_student_impl(&self, req: CreateEnrollmentRequest) -> Result<Enrollment> {
        let CreateEnrollmentRequest {
            student_id,
            course_id,
            currency,
        } = req;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LmsError::database_operation(format!("开启事务失败: {e}")))?;

        let student = Users::find_by_id(student_id)
            .one(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询用户失败: {e}")))?
            .ok_or_else(|| LmsError::not_authenticated(format!("User {student_id} not found")))?;
        if student.role != UserRole::STUDENT {
            return Err(LmsError::wrong_role(format!(
                "Only students can enroll, user {student_id} is a {}",
                student.role
            )));
        }

        let course = Courses::find_by_id(course_id)
            .one(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?
            .map(|m| m.into_course())
            .filter(|c| c.is_published())
            .ok_or_else(|| LmsError::not_found(format!("Course {course_id} not found")))?;

        let existing = Enrollments::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .filter(enrollments::Column::CourseId.eq(course_id))
            .count(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询选课失败: {e}")))?;
        if existing > 0 {
            return Err(already_enrolled(student_id, course_id));
        }

        let payment = PaymentRecord::simulated_for(course.price, &currency);
        let payment_data = payment.as_ref().map(serde_json::to_string).transpose()?;
        let now = chrono::Utc::now().timestamp();

        let model = EnrollmentActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            progress_basis_points: Set(0),
            is_completed: Set(false),
            completed_at: Set(None),
            payment_data: Set(payment_data),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = Enrollments::insert(model)
            .on_conflict(
                OnConflict::columns([
                    enrollments::Column::StudentId,
                    enrollments::Column::CourseId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&txn)
            .await
            .map_err(|e| map_insert_error(e, student_id, course_id))?;

        let enrollment_id = match result {
            TryInsertResult::Inserted(inserted) => inserted.last_insert_id,
            TryInsertResult::Conflicted | TryInsertResult::Empty => {
                return Err(already_enrolled(student_id, course_id));
            }
        };

        let enrollment = Enrollments::find_by_id(enrollment_id)
            .one(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询选课失败: {e}")))?
            .ok_or_else(|| LmsError::database_operation("选课写入后未找到"))?;

        txn.commit()
            .await
            .map_err(|e| map_insert_error(e, student_id, course_id))?;

        info!(
            "Student {} enrolled in course {} (enrollment {}, paid: {})",
            student_id,
            course_id,
            enrollment.id,
            payment.is_some()
        );

        Ok(enrollment.into_enrollment())
    }

    /// 通过 ID 获取选课
    pub async fn get_enrollment_by_id_impl(&self, id: i64) -> Result<Option<Enrollment>> {
        let result = Enrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询选课失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    pub async fn get_enrollment_by_student_and_course_impl(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .filter(enrollments::Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询选课失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    /// 学生的全部选课（附课程摘要与证书编号），最新在前
    pub async fn list_student_enrollments_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<StudentEnrollmentItem>> {
        let rows = Enrollments::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .order_by_desc(enrollments::Column::CreatedAt)
            .order_by_desc(enrollments::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询选课列表失败: {e}")))?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let course_ids: Vec<i64> = rows.iter().map(|e| e.course_id).collect();
        let enrollment_ids: Vec<i64> = rows.iter().map(|e| e.id).collect();

        let course_map: HashMap<i64, courses::Model> = Courses::find()
            .filter(courses::Column::Id.is_in(course_ids.clone()))
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let teacher_names: HashMap<i64, String> = Users::find()
            .select_only()
            .column(users::Column::Id)
            .column(users::Column::Name)
            .filter(users::Column::Id.is_in(course_map.values().map(|c| c.teacher_id)))
            .into_tuple::<(i64, String)>()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询授课教师失败: {e}")))?
            .into_iter()
            .collect();

        let certificate_numbers: HashMap<i64, String> = Certificates::find()
            .select_only()
            .column(certificates::Column::EnrollmentId)
            .column(certificates::Column::CertificateNumber)
            .filter(certificates::Column::EnrollmentId.is_in(enrollment_ids))
            .into_tuple::<(i64, String)>()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询证书失败: {e}")))?
            .into_iter()
            .collect();

        let lesson_counts = self.count_lessons_by_course(course_ids).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let course = course_map.get(&row.course_id)?;
                let enrollment = row.into_enrollment();
                Some(StudentEnrollmentItem {
                    enrollment_id: enrollment.id,
                    course_id: course.id,
                    course_title: course.title.clone(),
                    course_category: course.category.clone(),
                    teacher_name: teacher_names
                        .get(&course.teacher_id)
                        .cloned()
                        .unwrap_or_default(),
                    total_lessons: lesson_counts.get(&course.id).copied().unwrap_or(0),
                    progress: enrollment.progress,
                    is_completed: enrollment.is_completed,
                    enrolled_at: enrollment.created_at,
                    completed_at: enrollment.completed_at,
                    certificate_number: certificate_numbers.get(&enrollment.id).cloned(),
                })
            })
            .collect())
    }

    pub async fn count_enrollments_impl(&self) -> Result<i64> {
        let count = Enrollments::find()
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计选课失败: {e}")))?;
        Ok(count as i64)
    }
}
