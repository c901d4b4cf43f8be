//! 测验作答实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_attempts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub enrollment_id: i64,
    pub quiz_id: i64,
    /// 提交的答案（JSON 数组），作答中为空
    #[sea_orm(column_type = "Text", nullable)]
    pub answers: Option<String>,
    pub score: i32,
    pub total_questions: i32,
    pub total_points: i32,
    pub is_passed: bool,
    pub started_at: i64,
    pub submitted_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::enrollments::Entity",
        from = "Column::EnrollmentId",
        to = "super::enrollments::Column::Id"
    )]
    Enrollment,
    #[sea_orm(
        belongs_to = "super::quizzes::Entity",
        from = "Column::QuizId",
        to = "super::quizzes::Column::Id"
    )]
    Quiz,
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl Related<super::quizzes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_attempt(self) -> crate::models::quizzes::entities::QuizAttempt {
        use chrono::{DateTime, Utc};

        crate::models::quizzes::entities::QuizAttempt {
            id: self.id,
            enrollment_id: self.enrollment_id,
            quiz_id: self.quiz_id,
            answers: self
                .answers
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
            score: self.score,
            total_questions: self.total_questions,
            total_points: self.total_points,
            is_passed: self.is_passed,
            started_at: DateTime::<Utc>::from_timestamp(self.started_at, 0).unwrap_or_default(),
            submitted_at: self
                .submitted_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
        }
    }
}
