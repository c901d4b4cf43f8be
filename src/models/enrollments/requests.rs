use serde::Deserialize;
use ts_rs::TS;

// 创建选课请求（用于存储层）
//
// 付费课程的模拟支付记录在事务内按课程价格生成，币种由调用方给出。
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct CreateEnrollmentRequest {
    pub student_id: i64,
    pub course_id: i64,
    pub currency: String,
}
