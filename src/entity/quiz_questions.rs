//! 测验题目实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub quiz_id: i64,
    #[sea_orm(column_type = "Text")]
    pub question: String,
    /// 选项列表（JSON 数组）
    #[sea_orm(column_type = "Text")]
    pub options: String,
    pub correct_answer_index: i32,
    pub points: i32,
    pub order_index: i32,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quizzes::Entity",
        from = "Column::QuizId",
        to = "super::quizzes::Column::Id"
    )]
    Quiz,
}

impl Related<super::quizzes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_question(self) -> crate::models::quizzes::entities::QuizQuestion {
        crate::models::quizzes::entities::QuizQuestion {
            id: self.id,
            quiz_id: self.quiz_id,
            question: self.question,
            options: serde_json::from_str(&self.options).unwrap_or_default(),
            correct_answer_index: self.correct_answer_index,
            points: self.points,
            order_index: self.order_index,
        }
    }
}
