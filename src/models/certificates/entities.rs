use chrono::Datelike;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::utils::random_code::generate_random_code;

// 结业证书
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/certificate.ts")]
pub struct Certificate {
    pub id: i64,
    pub enrollment_id: i64,
    pub certificate_number: String,
    pub file_path: Option<String>,
    pub issued_at: chrono::DateTime<chrono::Utc>,
}

/// 证书签发结果
#[derive(Debug, Clone)]
pub enum CertificateIssuance {
    /// 本次新签发
    Issued(Certificate),
    /// 之前已签发，返回已有证书
    AlreadyIssued(Certificate),
    /// 选课尚未完成
    NotEligible,
}

impl CertificateIssuance {
    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            CertificateIssuance::Issued(c) | CertificateIssuance::AlreadyIssued(c) => Some(c),
            CertificateIssuance::NotEligible => None,
        }
    }

    pub fn into_certificate(self) -> Option<Certificate> {
        match self {
            CertificateIssuance::Issued(c) | CertificateIssuance::AlreadyIssued(c) => Some(c),
            CertificateIssuance::NotEligible => None,
        }
    }
}

/// 证书编号规则：`{prefix}-{年份}-{随机大写字母数字}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateNumbering {
    pub prefix: String,
    pub code_length: usize,
    pub max_attempts: u32,
}

impl Default for CertificateNumbering {
    fn default() -> Self {
        Self {
            prefix: "EDU".to_string(),
            code_length: 10,
            max_attempts: 5,
        }
    }
}

impl CertificateNumbering {
    pub fn generate(&self, issued_at: chrono::DateTime<chrono::Utc>) -> String {
        format!(
            "{}-{}-{}",
            self.prefix,
            issued_at.year(),
            generate_random_code(self.code_length)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generated_number_format() {
        let numbering = CertificateNumbering::default();
        let at = chrono::Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let number = numbering.generate(at);

        let parts: Vec<&str> = number.splitn(3, '-').collect();
        assert_eq!(parts[0], "EDU");
        assert_eq!(parts[1], "2025");
        assert_eq!(parts[2].len(), 10);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generated_numbers_differ() {
        let numbering = CertificateNumbering::default();
        let now = chrono::Utc::now();
        assert_ne!(numbering.generate(now), numbering.generate(now));
    }
}
