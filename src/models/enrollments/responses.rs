use rust_decimal::Decimal;
use serde::Serialize;
use ts_rs::TS;

// 学生仪表盘中的一条选课（含课程摘要）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct StudentEnrollmentItem {
    pub enrollment_id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub course_category: String,
    pub teacher_name: String,
    pub total_lessons: i64,
    #[ts(type = "string")]
    pub progress: Decimal,
    pub is_completed: bool,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub certificate_number: Option<String>,
}
