use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 模拟支付网关标识，不会发起任何真实扣款
pub const SIMULATED_GATEWAY: &str = "simulated";
pub const PAYMENT_STATUS_COMPLETED: &str = "completed";

// 选课时附带的支付记录（付费课程）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct PaymentRecord {
    #[ts(type = "string")]
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub gateway: String,
}

impl PaymentRecord {
    /// 为付费课程生成一条已完成的模拟支付记录；免费课程返回 None
    pub fn simulated_for(price: Decimal, currency: &str) -> Option<Self> {
        if price.is_zero() {
            return None;
        }
        Some(Self {
            amount: price,
            currency: currency.to_string(),
            status: PAYMENT_STATUS_COMPLETED.to_string(),
            gateway: SIMULATED_GATEWAY.to_string(),
        })
    }
}

// 选课记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    /// 完成百分比，两位小数
    #[ts(type = "string")]
    pub progress: Decimal,
    pub is_completed: bool,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub payment: Option<PaymentRecord>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Enrollment {
    pub fn belongs_to(&self, student_id: i64) -> bool {
        self.student_id == student_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_free_course_has_no_payment() {
        assert!(PaymentRecord::simulated_for(Decimal::ZERO, "USD").is_none());
        assert!(PaymentRecord::simulated_for(Decimal::new(0, 2), "USD").is_none());
    }

    #[test]
    fn test_paid_course_payment_mirrors_price() {
        let price = Decimal::from_str("49.99").unwrap();
        let payment = PaymentRecord::simulated_for(price, "USD").unwrap();
        assert_eq!(payment.amount, price);
        assert_eq!(payment.status, "completed");
        assert_eq!(payment.gateway, "simulated");

        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["amount"], "49.99");
        assert_eq!(json["currency"], "USD");
    }
}
