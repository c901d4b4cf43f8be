use serde::Deserialize;
use ts_rs::TS;

use crate::errors::{LmsError, Result};

// 记录播放/阅读位置
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct RecordPositionRequest {
    pub seconds: i32,
}

impl RecordPositionRequest {
    pub fn validate(&self) -> Result<()> {
        if self.seconds < 0 {
            return Err(LmsError::validation("Position must not be negative"));
        }
        Ok(())
    }
}
