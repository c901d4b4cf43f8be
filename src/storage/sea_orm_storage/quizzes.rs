use super::SeaOrmStorage;
use super::progress::{load_enrollment, recompute_progress};
use crate::entity::prelude::*;
use crate::entity::{course_modules, quiz_attempts, quiz_questions, quizzes};
use crate::errors::{LmsError, Result};
use crate::models::quizzes::{
    entities::{QuizAttempt, QuizQuestion, grade_answers},
    responses::{QuizForTaking, QuizSubmissionResponse},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tracing::info;

/// 查找属于指定课程的测验，不属于时视为不存在
async fn find_quiz_in_course<C: ConnectionTrait>(
    conn: &C,
    quiz_id: i64,
    course_id: i64,
) -> Result<quizzes::Model> {
    Quizzes::find()
        .join(JoinType::InnerJoin, quizzes::Relation::Module.def())
        .filter(quizzes::Column::Id.eq(quiz_id))
        .filter(course_modules::Column::CourseId.eq(course_id))
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询测验失败: {e}")))?
        .ok_or_else(|| LmsError::not_found(format!("Quiz {quiz_id} not found in course {course_id}")))
}

async fn list_questions<C: ConnectionTrait>(conn: &C, quiz_id: i64) -> Result<Vec<QuizQuestion>> {
    let rows = QuizQuestions::find()
        .filter(quiz_questions::Column::QuizId.eq(quiz_id))
        .order_by_asc(quiz_questions::Column::OrderIndex)
        .order_by_asc(quiz_questions::Column::Id)
        .all(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询测验题目失败: {e}")))?;

    Ok(rows.into_iter().map(|m| m.into_question()).collect())
}

impl SeaOrmStorage {
    /// 作答用的测验内容，题目不含正确答案
    pub async fn get_quiz_for_taking_impl(
        &self,
        enrollment_id: i64,
        quiz_id: i64,
    ) -> Result<QuizForTaking> {
        let enrollment = load_enrollment(&self.db, enrollment_id).await?;
        let quiz = find_quiz_in_course(&self.db, quiz_id, enrollment.course_id).await?;
        let questions = list_questions(&self.db, quiz.id).await?;

        Ok(QuizForTaking {
            quiz: quiz.into_quiz(),
            total_points: questions.iter().map(|q| q.points).sum(),
            questions,
        })
    }

    /// 开始一次测验作答
    pub async fn start_quiz_attempt_impl(
        &self,
        enrollment_id: i64,
        quiz_id: i64,
    ) -> Result<QuizAttempt> {
        let enrollment = load_enrollment(&self.db, enrollment_id).await?;
        let quiz = find_quiz_in_course(&self.db, quiz_id, enrollment.course_id).await?;
        let questions = list_questions(&self.db, quiz.id).await?;

        let model = QuizAttemptActiveModel {
            enrollment_id: Set(enrollment.id),
            quiz_id: Set(quiz.id),
            answers: Set(None),
            score: Set(0),
            total_questions: Set(questions.len() as i32),
            total_points: Set(questions.iter().map(|q| q.points).sum()),
            is_passed: Set(false),
            started_at: Set(chrono::Utc::now().timestamp()),
            submitted_at: Set(None),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建测验作答失败: {e}")))?;

        Ok(result.into_attempt())
    }

    pub async fn get_quiz_attempt_by_id_impl(&self, id: i64) -> Result<Option<QuizAttempt>> {
        let result = QuizAttempts::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询测验作答失败: {e}")))?;

        Ok(result.map(|m| m.into_attempt()))
    }

    /// 提交作答：判分、写回并重新计算进度
    ///
    /// 写回使用 `submitted_at IS NULL` 条件更新，并发提交只有一个能成功。
    pub async fn submit_quiz_attempt_impl(
        &self,
        attempt_id: i64,
        answers: Vec<Option<i32>>,
    ) -> Result<QuizSubmissionResponse> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LmsError::database_operation(format!("开启事务失败: {e}")))?;

        let attempt = QuizAttempts::find_by_id(attempt_id)
            .one(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询测验作答失败: {e}")))?
            .ok_or_else(|| LmsError::not_found(format!("Quiz attempt {attempt_id} not found")))?;
        if attempt.submitted_at.is_some() {
            return Err(LmsError::already_submitted(format!(
                "Quiz attempt {attempt_id} has already been submitted"
            )));
        }

        let quiz = Quizzes::find_by_id(attempt.quiz_id)
            .one(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询测验失败: {e}")))?
            .ok_or_else(|| LmsError::not_found(format!("Quiz {} not found", attempt.quiz_id)))?;
        let questions = list_questions(&txn, quiz.id).await?;
        let grade = grade_answers(&questions, &answers, quiz.passing_score)?;
        let now = chrono::Utc::now().timestamp();

        let result = QuizAttempts::update_many()
            .col_expr(
                quiz_attempts::Column::Answers,
                Expr::value(Some(serde_json::to_string(&answers)?)),
            )
            .col_expr(quiz_attempts::Column::Score, Expr::value(grade.score))
            .col_expr(
                quiz_attempts::Column::TotalQuestions,
                Expr::value(grade.total_questions),
            )
            .col_expr(
                quiz_attempts::Column::TotalPoints,
                Expr::value(grade.total_points),
            )
            .col_expr(quiz_attempts::Column::IsPassed, Expr::value(grade.is_passed))
            .col_expr(quiz_attempts::Column::SubmittedAt, Expr::value(Some(now)))
            .filter(quiz_attempts::Column::Id.eq(attempt_id))
            .filter(quiz_attempts::Column::SubmittedAt.is_null())
            .exec(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("提交测验作答失败: {e}")))?;
        if result.rows_affected == 0 {
            return Err(LmsError::already_submitted(format!(
                "Quiz attempt {attempt_id} has already been submitted"
            )));
        }

        let attempt = QuizAttempts::find_by_id(attempt_id)
            .one(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询测验作答失败: {e}")))?
            .ok_or_else(|| LmsError::database_operation("测验作答提交后未找到"))?;

        let enrollment = load_enrollment(&txn, attempt.enrollment_id).await?;
        let (enrollment, certificate) =
            recompute_progress(&txn, enrollment, self.weights, &self.numbering).await?;

        txn.commit()
            .await
            .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))?;

        info!(
            "Quiz attempt {} graded: {}/{} points, passed: {}",
            attempt.id, grade.score, grade.total_points, grade.is_passed
        );

        Ok(QuizSubmissionResponse {
            attempt: attempt.into_attempt(),
            enrollment: enrollment.into_enrollment(),
            certificate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_user, sample_course, test_storage};
    use crate::errors::LmsError;
    use crate::models::certificates::entities::CertificateIssuance;
    use crate::models::enrollments::requests::CreateEnrollmentRequest;
    use crate::models::users::entities::UserRole;
    use rust_decimal::Decimal;
    use test_log::test;

    #[test(tokio::test)]
    async fn test_second_submit_rejected() {
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

        let quiz = storage
            .get_quiz_for_taking_impl(enrollment.id, sample.quiz_id)
            .await
            .unwrap();
        assert_eq!(quiz.questions.len(), 2);
        assert_eq!(quiz.total_points, 2);

        let attempt = storage
            .start_quiz_attempt_impl(enrollment.id, sample.quiz_id)
            .await
            .unwrap();
        assert!(!attempt.is_submitted());

        // 只答对第一题：1/2 = 50%，及格线 50
        let submitted = storage
            .submit_quiz_attempt_impl(attempt.id, vec![Some(0), Some(2)])
            .await
            .unwrap();
        assert_eq!(submitted.attempt.score, 1);
        assert!(submitted.attempt.is_passed);
        assert!(submitted.attempt.is_submitted());
        assert_eq!(submitted.enrollment.progress, Decimal::new(2500, 2));

        let again = storage
            .submit_quiz_attempt_impl(attempt.id, vec![Some(0), Some(1)])
            .await;
        assert!(matches!(again, Err(LmsError::AlreadySubmitted(_))));

        let reloaded = storage
            .get_quiz_attempt_by_id_impl(attempt.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.score, 1);
    }

    #[test(tokio::test)]
    async fn test_too_many_answers_rejected() {
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
        let attempt = storage
            .start_quiz_attempt_impl(enrollment.id, sample.quiz_id)
            .await
            .unwrap();

        let result = storage
            .submit_quiz_attempt_impl(attempt.id, vec![Some(0), Some(1), Some(2)])
            .await;
        assert!(matches!(result, Err(LmsError::Validation(_))));

        // 校验失败不会消耗本次作答
        let submitted = storage
            .submit_quiz_attempt_impl(attempt.id, vec![None, Some(1)])
            .await
            .unwrap();
        assert_eq!(submitted.attempt.score, 1);
    }

    #[test(tokio::test)]
    async fn test_full_completion_issues_single_certificate() {
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

        for lesson_id in &sample.lesson_ids {
            let update = storage
                .complete_lesson_impl(enrollment.id, *lesson_id)
                .await
                .unwrap();
            assert!(!update.enrollment.is_completed);
            assert!(update.certificate.is_none());
        }

        // 未通过的作答不计入进度
        let failed = storage
            .start_quiz_attempt_impl(enrollment.id, sample.quiz_id)
            .await
            .unwrap();
        let failed = storage
            .submit_quiz_attempt_impl(failed.id, vec![Some(2), Some(2)])
            .await
            .unwrap();
        assert!(!failed.attempt.is_passed);
        assert_eq!(failed.enrollment.progress, Decimal::new(7500, 2));
        assert!(!failed.enrollment.is_completed);

        let passed = storage
            .start_quiz_attempt_impl(enrollment.id, sample.quiz_id)
            .await
            .unwrap();
        let passed = storage
            .submit_quiz_attempt_impl(passed.id, vec![Some(0), Some(1)])
            .await
            .unwrap();
        assert_eq!(passed.enrollment.progress, Decimal::new(10000, 2));
        assert!(passed.enrollment.is_completed);
        assert!(passed.enrollment.completed_at.is_some());
        let certificate = passed.certificate.expect("certificate issued on completion");
        assert!(certificate.certificate_number.starts_with("EDU-"));

        let first = storage
            .issue_certificate_if_eligible_impl(enrollment.id)
            .await
            .unwrap();
        let second = storage
            .issue_certificate_if_eligible_impl(enrollment.id)
            .await
            .unwrap();
        assert!(matches!(first, CertificateIssuance::AlreadyIssued(_)));
        assert_eq!(
            second.certificate().map(|c| c.certificate_number.clone()),
            Some(certificate.certificate_number.clone())
        );
        assert_eq!(storage.count_certificates_impl().await.unwrap(), 1);

        // 完成后再次完成课时不会回退状态
        let update = storage
            .complete_lesson_impl(enrollment.id, sample.lesson_ids[0])
            .await
            .unwrap();
        assert!(update.enrollment.is_completed);
        assert_eq!(update.enrollment.progress, Decimal::new(10000, 2));

        let items = storage.list_student_enrollments_impl(student.id).await.unwrap();
        assert_eq!(
            items[0].certificate_number.as_deref(),
            Some(certificate.certificate_number.as_str())
        );

        let progress = storage
            .get_enrollment_progress_impl(enrollment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(progress.lessons.len(), 3);
        assert_eq!(progress.quizzes.len(), 1);
        assert_eq!(progress.quizzes[0].attempts, 2);
        assert_eq!(progress.quizzes[0].best_score, Some(2));
        assert!(progress.quizzes[0].is_passed);
    }
}
