use super::SeaOrmStorage;
use super::certificates::issue_certificate_in;
use crate::entity::prelude::{
    Enrollments, LessonProgress as LessonProgressEntity, LessonProgressActiveModel, Lessons,
    QuizAttempts, Quizzes,
};
use crate::entity::{
    course_modules, enrollments, lesson_progress, lessons, quiz_attempts, quizzes,
};
use crate::errors::{LmsError, Result};
use crate::models::{
    certificates::entities::{Certificate, CertificateNumbering},
    progress::{
        entities::{LessonProgress, ProgressTally, ProgressWeights},
        responses::{EnrollmentProgressResponse, LessonProgressUpdate},
    },
    quizzes::{entities::QuizAttempt, responses::QuizResult},
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait, TryInsertResult,
};
use tracing::{debug, info};

/// 课程内计入进度的课时与测验
pub(crate) struct CourseContent {
    pub lesson_ids: Vec<i64>,
    pub quiz_ids: Vec<i64>,
}

pub(crate) async fn course_content<C: ConnectionTrait>(
    conn: &C,
    course_id: i64,
) -> Result<CourseContent> {
    let lesson_ids = Lessons::find()
        .select_only()
        .column(lessons::Column::Id)
        .join(JoinType::InnerJoin, lessons::Relation::Module.def())
        .filter(course_modules::Column::CourseId.eq(course_id))
        .into_tuple::<i64>()
        .all(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询课程课时失败: {e}")))?;

    let quiz_ids = Quizzes::find()
        .select_only()
        .column(quizzes::Column::Id)
        .join(JoinType::InnerJoin, quizzes::Relation::Module.def())
        .filter(course_modules::Column::CourseId.eq(course_id))
        .into_tuple::<i64>()
        .all(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询课程测验失败: {e}")))?;

    Ok(CourseContent {
        lesson_ids,
        quiz_ids,
    })
}

/// 在事务内加载选课，不存在时返回 NotFound
pub(crate) async fn load_enrollment<C: ConnectionTrait>(
    conn: &C,
    enrollment_id: i64,
) -> Result<enrollments::Model> {
    Enrollments::find_by_id(enrollment_id)
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询选课失败: {e}")))?
        .ok_or_else(|| LmsError::not_found(format!("Enrollment {enrollment_id} not found")))
}

async fn lesson_belongs_to_course<C: ConnectionTrait>(
    conn: &C,
    lesson_id: i64,
    course_id: i64,
) -> Result<bool> {
    let count = Lessons::find()
        .join(JoinType::InnerJoin, lessons::Relation::Module.def())
        .filter(lessons::Column::Id.eq(lesson_id))
        .filter(course_modules::Column::CourseId.eq(course_id))
        .count(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询课时失败: {e}")))?;
    Ok(count > 0)
}

/// 写入课时进度
///
/// `mark_complete` 只会把未完成改为完成，首次完成时间保持不变；
/// `position` 为 Some 时覆盖播放位置。
async fn upsert_lesson_progress<C: ConnectionTrait>(
    conn: &C,
    enrollment_id: i64,
    lesson_id: i64,
    mark_complete: bool,
    position: Option<i32>,
) -> Result<lesson_progress::Model> {
    let now = chrono::Utc::now().timestamp();

    let model = LessonProgressActiveModel {
        enrollment_id: Set(enrollment_id),
        lesson_id: Set(lesson_id),
        is_completed: Set(mark_complete),
        last_position_seconds: Set(position.unwrap_or(0)),
        completed_at: Set(mark_complete.then_some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = LessonProgressEntity::insert(model)
        .on_conflict(
            OnConflict::columns([
                lesson_progress::Column::EnrollmentId,
                lesson_progress::Column::LessonId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .do_nothing()
        .exec(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("写入课时进度失败: {e}")))?;

    let existing = LessonProgressEntity::find()
        .filter(lesson_progress::Column::EnrollmentId.eq(enrollment_id))
        .filter(lesson_progress::Column::LessonId.eq(lesson_id))
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询课时进度失败: {e}")))?
        .ok_or_else(|| LmsError::database_operation("课时进度写入后未找到"))?;

    if let TryInsertResult::Inserted(_) = result {
        return Ok(existing);
    }

    let needs_completion = mark_complete && !existing.is_completed;
    if !needs_completion && position.is_none() {
        return Ok(existing);
    }

    let mut active: LessonProgressActiveModel = existing.into();
    if needs_completion {
        active.is_completed = Set(true);
        active.completed_at = Set(Some(now));
    }
    if let Some(seconds) = position {
        active.last_position_seconds = Set(seconds);
    }
    active.updated_at = Set(now);

    active
        .update(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("更新课时进度失败: {e}")))
}

/// 重新计算选课进度，达到 100% 时标记完成并签发证书
///
/// 完成状态一旦写入不再回退。
pub(crate) async fn recompute_progress<C: ConnectionTrait + TransactionTrait>(
    conn: &C,
    enrollment: enrollments::Model,
    weights: ProgressWeights,
    numbering: &CertificateNumbering,
) -> Result<(enrollments::Model, Option<Certificate>)> {
    if enrollment.is_completed {
        let certificate = issue_certificate_in(conn, &enrollment, numbering)
            .await?
            .into_certificate();
        return Ok((enrollment, certificate));
    }

    let content = course_content(conn, enrollment.course_id).await?;

    let completed_lessons = LessonProgressEntity::find()
        .filter(lesson_progress::Column::EnrollmentId.eq(enrollment.id))
        .filter(lesson_progress::Column::IsCompleted.eq(true))
        .filter(lesson_progress::Column::LessonId.is_in(content.lesson_ids.clone()))
        .count(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("统计已完成课时失败: {e}")))?;

    let passed_quizzes = QuizAttempts::find()
        .select_only()
        .column(quiz_attempts::Column::QuizId)
        .distinct()
        .filter(quiz_attempts::Column::EnrollmentId.eq(enrollment.id))
        .filter(quiz_attempts::Column::IsPassed.eq(true))
        .filter(quiz_attempts::Column::SubmittedAt.is_not_null())
        .filter(quiz_attempts::Column::QuizId.is_in(content.quiz_ids.clone()))
        .into_tuple::<i64>()
        .all(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("统计已通过测验失败: {e}")))?
        .len() as u64;

    let tally = ProgressTally {
        completed_lessons,
        total_lessons: content.lesson_ids.len() as u64,
        passed_quizzes,
        total_quizzes: content.quiz_ids.len() as u64,
    };
    let basis_points = tally.basis_points(weights);
    let completed = tally.is_complete(weights);
    debug!(
        "Enrollment {} progress recomputed: {:?} -> {} bp",
        enrollment.id, tally, basis_points
    );

    let now = chrono::Utc::now().timestamp();
    let mut active: enrollments::ActiveModel = enrollment.into();
    active.progress_basis_points = Set(basis_points);
    active.updated_at = Set(now);
    if completed {
        active.is_completed = Set(true);
        active.completed_at = Set(Some(now));
    }
    let updated = active
        .update(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("更新选课进度失败: {e}")))?;

    if !completed {
        return Ok((updated, None));
    }

    info!("Enrollment {} completed", updated.id);
    let certificate = issue_certificate_in(conn, &updated, numbering)
        .await?
        .into_certificate();
    Ok((updated, certificate))
}

impl SeaOrmStorage {
    /// 标记课时完成并重新计算进度，整个过程在一个事务内
    pub async fn complete_lesson_impl(
        &self,
        enrollment_id: i64,
        lesson_id: i64,
    ) -> Result<LessonProgressUpdate> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LmsError::database_operation(format!("开启事务失败: {e}")))?;

        let enrollment = load_enrollment(&txn, enrollment_id).await?;
        if !lesson_belongs_to_course(&txn, lesson_id, enrollment.course_id).await? {
            return Err(LmsError::not_found(format!(
                "Lesson {lesson_id} not found in course {}",
                enrollment.course_id
            )));
        }

        let progress = upsert_lesson_progress(&txn, enrollment_id, lesson_id, true, None).await?;
        let (enrollment, certificate) =
            recompute_progress(&txn, enrollment, self.weights, &self.numbering).await?;

        txn.commit()
            .await
            .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))?;

        debug!("Lesson {} completed for enrollment {}", lesson_id, enrollment_id);

        Ok(LessonProgressUpdate {
            lesson_progress: progress.into_lesson_progress(),
            enrollment: enrollment.into_enrollment(),
            certificate,
        })
    }

    /// 记录播放位置，不会改变完成状态
    pub async fn record_lesson_position_impl(
        &self,
        enrollment_id: i64,
        lesson_id: i64,
        seconds: i32,
    ) -> Result<LessonProgress> {
        if seconds < 0 {
            return Err(LmsError::validation("Position must not be negative"));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LmsError::database_operation(format!("开启事务失败: {e}")))?;

        let enrollment = load_enrollment(&txn, enrollment_id).await?;
        if !lesson_belongs_to_course(&txn, lesson_id, enrollment.course_id).await? {
            return Err(LmsError::not_found(format!(
                "Lesson {lesson_id} not found in course {}",
                enrollment.course_id
            )));
        }

        let progress =
            upsert_lesson_progress(&txn, enrollment_id, lesson_id, false, Some(seconds)).await?;

        txn.commit()
            .await
            .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(progress.into_lesson_progress())
    }

    pub async fn list_lesson_progress_impl(
        &self,
        enrollment_id: i64,
    ) -> Result<Vec<LessonProgress>> {
        let rows = LessonProgressEntity::find()
            .filter(lesson_progress::Column::EnrollmentId.eq(enrollment_id))
            .order_by_asc(lesson_progress::Column::LessonId)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课时进度失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_lesson_progress()).collect())
    }

    /// 选课的整体进度：课时进度与每个测验的最好成绩
    pub async fn get_enrollment_progress_impl(
        &self,
        enrollment_id: i64,
    ) -> Result<Option<EnrollmentProgressResponse>> {
        let Some(enrollment) = Enrollments::find_by_id(enrollment_id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询选课失败: {e}")))?
        else {
            return Ok(None);
        };

        let lessons = self.list_lesson_progress_impl(enrollment_id).await?;
        let content = course_content(&self.db, enrollment.course_id).await?;

        let attempts: Vec<QuizAttempt> = QuizAttempts::find()
            .filter(quiz_attempts::Column::EnrollmentId.eq(enrollment_id))
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询测验作答失败: {e}")))?
            .into_iter()
            .map(|m| m.into_attempt())
            .collect();

        let quizzes = content
            .quiz_ids
            .iter()
            .map(|&quiz_id| QuizResult::summarize(quiz_id, &attempts))
            .collect();

        Ok(Some(EnrollmentProgressResponse {
            enrollment: enrollment.into_enrollment(),
            lessons,
            quizzes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_user, sample_course, test_storage};
    use crate::errors::LmsError;
    use crate::models::enrollments::requests::CreateEnrollmentRequest;
    use crate::models::users::entities::UserRole;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use test_log::test;

    #[test(tokio::test)]
    async fn test_lesson_completion_is_idempotent() {
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

        let first = storage
            .complete_lesson_impl(enrollment.id, sample.lesson_ids[0])
            .await
            .unwrap();
        let second = storage
            .complete_lesson_impl(enrollment.id, sample.lesson_ids[0])
            .await
            .unwrap();

        assert!(first.lesson_progress.is_completed);
        assert_eq!(first.lesson_progress.id, second.lesson_progress.id);
        assert_eq!(
            first.lesson_progress.completed_at,
            second.lesson_progress.completed_at
        );
        // 1 个课时 / (3 个课时 + 1 个测验)
        assert_eq!(second.enrollment.progress, Decimal::from_str("25.00").unwrap());
        assert!(second.certificate.is_none());
        assert_eq!(
            storage
                .list_lesson_progress_impl(enrollment.id)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[test(tokio::test)]
    async fn test_position_never_uncompletes() {
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
        let lesson_id = sample.lesson_ids[1];

        let progress = storage
            .record_lesson_position_impl(enrollment.id, lesson_id, 90)
            .await
            .unwrap();
        assert!(!progress.is_completed);
        assert_eq!(progress.last_position_seconds, 90);

        storage
            .complete_lesson_impl(enrollment.id, lesson_id)
            .await
            .unwrap();
        let progress = storage
            .record_lesson_position_impl(enrollment.id, lesson_id, 120)
            .await
            .unwrap();
        assert!(progress.is_completed);
        assert_eq!(progress.last_position_seconds, 120);

        let negative = storage
            .record_lesson_position_impl(enrollment.id, lesson_id, -1)
            .await;
        assert!(matches!(negative, Err(LmsError::Validation(_))));
    }

    #[test(tokio::test)]
    async fn test_lesson_from_other_course_not_found() {
        let (storage, _dir) = test_storage().await;
        let teacher = create_user(&storage, "t@eduplatform.com", UserRole::Teacher).await;
        let student = create_user(&storage, "s@eduplatform.com", UserRole::Student).await;
        let first = sample_course(&storage, teacher.id).await;
        let second = sample_course(&storage, teacher.id).await;
        let enrollment = storage
            .enroll_student_impl(CreateEnrollmentRequest {
                student_id: student.id,
                course_id: first.course.id,
                currency: "USD".into(),
            })
            .await
            .unwrap();

        let result = storage
            .complete_lesson_impl(enrollment.id, second.lesson_ids[0])
            .await;
        assert!(matches!(result, Err(LmsError::NotFound(_))));
        let result = storage.complete_lesson_impl(9999, first.lesson_ids[0]).await;
        assert!(matches!(result, Err(LmsError::NotFound(_))));
    }
}
