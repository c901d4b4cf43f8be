use serde::Serialize;
use ts_rs::TS;

use super::entities::Certificate;

// 证书页
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/certificate.ts")]
pub struct CertificatePage {
    pub certificate: Certificate,
    pub course_id: i64,
    pub course_title: String,
    pub student_name: String,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}
