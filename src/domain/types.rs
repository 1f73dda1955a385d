// ==========================================
// 钙线喂线系统 - 领域类型定义
// ==========================================
// 职责: 线卷余量状态、喂线修正规则等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 线卷余量状态 (Balance Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceStatus {
    Normal,   // 余量正常
    Low,      // 余量低于预警比例
    Depleted, // 余量耗尽(≤0)，需更换线卷
}

impl fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceStatus::Normal => write!(f, "NORMAL"),
            BalanceStatus::Low => write!(f, "LOW"),
            BalanceStatus::Depleted => write!(f, "DEPLETED"),
        }
    }
}

// ==========================================
// 喂线长度修正规则 (Correction Rule)
// ==========================================
// 顺序即求值顺序，不可调整
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectionRule {
    Freeboard,   // 净空
    Temperature, // 钢水温度
    Aluminium,   // 铝含量
    Sulphur,     // 硫含量
    Phosphorus,  // 磷增量
    Silicon,     // 硅含量
}

impl CorrectionRule {
    /// 全部规则，按求值顺序排列
    pub const ALL: [CorrectionRule; 6] = [
        CorrectionRule::Freeboard,
        CorrectionRule::Temperature,
        CorrectionRule::Aluminium,
        CorrectionRule::Sulphur,
        CorrectionRule::Phosphorus,
        CorrectionRule::Silicon,
    ];

    /// 规则的中文名称（用于原因说明）
    pub fn label(&self) -> &'static str {
        match self {
            CorrectionRule::Freeboard => "净空修正",
            CorrectionRule::Temperature => "温度修正",
            CorrectionRule::Aluminium => "铝修正",
            CorrectionRule::Sulphur => "硫修正",
            CorrectionRule::Phosphorus => "磷修正",
            CorrectionRule::Silicon => "硅修正",
        }
    }
}

impl fmt::Display for CorrectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionRule::Freeboard => write!(f, "FREEBOARD"),
            CorrectionRule::Temperature => write!(f, "TEMPERATURE"),
            CorrectionRule::Aluminium => write!(f, "ALUMINIUM"),
            CorrectionRule::Sulphur => write!(f, "SULPHUR"),
            CorrectionRule::Phosphorus => write!(f, "PHOSPHORUS"),
            CorrectionRule::Silicon => write!(f, "SILICON"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order() {
        assert_eq!(CorrectionRule::ALL[0], CorrectionRule::Freeboard);
        assert_eq!(CorrectionRule::ALL[5], CorrectionRule::Silicon);
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&BalanceStatus::Depleted).unwrap();
        assert_eq!(json, "\"DEPLETED\"");
        assert_eq!(BalanceStatus::Low.to_string(), "LOW");
    }
}
