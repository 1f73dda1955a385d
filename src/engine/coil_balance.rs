// ==========================================
// 钙线喂线系统 - 线卷余量引擎
// ==========================================
// 职责: 余量状态判定与原因说明
// 输入: 线卷当前余量 + 预警比例
// 输出: 余量状态 + 原因 (JSON)
// ==========================================

use crate::domain::coil::{CoilBalanceMonitor, CoilConfig};
use crate::domain::types::BalanceStatus;
use serde_json::json;

/// 默认低余量预警比例 (%)
pub const DEFAULT_LOW_BALANCE_PCT: f64 = 15.0;

// ==========================================
// CoilBalanceEngine - 线卷余量引擎
// ==========================================
pub struct CoilBalanceEngine {
    low_balance_pct: f64,
}

impl Default for CoilBalanceEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_BALANCE_PCT)
    }
}

impl CoilBalanceEngine {
    /// # 参数
    /// - `low_balance_pct`: 低余量预警比例 (%)
    pub fn new(low_balance_pct: f64) -> Self {
        Self { low_balance_pct }
    }

    pub fn low_balance_pct(&self) -> f64 {
        self.low_balance_pct
    }

    /// 检查余量状态
    ///
    /// # 规则
    /// - current ≤ 0 → DEPLETED
    /// - balance_pct < 预警比例 → LOW
    /// - 否则 → NORMAL
    pub fn check_balance_status(&self, coil: &CoilConfig) -> (BalanceStatus, String) {
        let status = self.classify(coil);
        (status, self.generate_reason(coil, status))
    }

    /// 判定余量状态（不生成原因）
    pub fn classify(&self, coil: &CoilConfig) -> BalanceStatus {
        if coil.is_depleted() {
            BalanceStatus::Depleted
        } else if coil.is_low_balance(self.low_balance_pct) {
            BalanceStatus::Low
        } else {
            BalanceStatus::Normal
        }
    }

    /// 预测喂线后的余量状态
    pub fn predict_status_after_injection(
        &self,
        coil: &CoilConfig,
        length_m: f64,
    ) -> BalanceStatus {
        let mut projected = coil.clone();
        projected.debit(length_m);
        self.classify(&projected)
    }

    fn generate_reason(&self, coil: &CoilConfig, status: BalanceStatus) -> String {
        let reason = match status {
            BalanceStatus::Depleted => "线卷余量已耗尽，请更换线卷",
            BalanceStatus::Low => "线卷余量低于预警比例，请准备更换线卷",
            BalanceStatus::Normal => "线卷余量正常",
        };

        json!({
            "status": status.to_string(),
            "reason": reason,
            "coil_number": coil.coil_number,
            "current_length_m": coil.current_length_m,
            "total_length_m": coil.total_length_m,
            "balance_pct": format!("{:.1}%", coil.balance_pct()),
            "low_balance_pct": self.low_balance_pct,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coil::{CoilDefaults, CoilSpec};

    fn create_test_coil(current: f64) -> CoilConfig {
        let mut coil = CoilConfig::from_spec(&CoilSpec::from(&CoilDefaults::default()));
        coil.current_length_m = current;
        coil
    }

    #[test]
    fn test_check_balance_status_normal() {
        let engine = CoilBalanceEngine::default();
        let (status, reason) = engine.check_balance_status(&create_test_coil(4000.0));
        assert_eq!(status, BalanceStatus::Normal);
        assert!(reason.contains("NORMAL"));
        assert!(reason.contains("COIL-001"));
    }

    #[test]
    fn test_check_balance_status_low() {
        let engine = CoilBalanceEngine::default();
        let (status, reason) = engine.check_balance_status(&create_test_coil(500.0));
        assert_eq!(status, BalanceStatus::Low);
        assert!(reason.contains("10.0%"));
    }

    #[test]
    fn test_check_balance_status_depleted() {
        let engine = CoilBalanceEngine::default();
        assert_eq!(engine.classify(&create_test_coil(0.0)), BalanceStatus::Depleted);
        assert_eq!(engine.classify(&create_test_coil(-20.0)), BalanceStatus::Depleted);
    }

    #[test]
    fn test_custom_threshold() {
        let engine = CoilBalanceEngine::new(25.0);
        // 1000 / 5000 = 20%
        assert_eq!(engine.classify(&create_test_coil(1000.0)), BalanceStatus::Low);
    }

    #[test]
    fn test_predict_status_after_injection() {
        let engine = CoilBalanceEngine::default();
        let coil = create_test_coil(1000.0);

        assert_eq!(
            engine.predict_status_after_injection(&coil, 200.0),
            BalanceStatus::Normal
        ); // 800 / 5000 = 16%
        assert_eq!(
            engine.predict_status_after_injection(&coil, 300.0),
            BalanceStatus::Low
        ); // 700 / 5000 = 14%
        assert_eq!(
            engine.predict_status_after_injection(&coil, 1200.0),
            BalanceStatus::Depleted
        );
        // 原线卷不受影响
        assert_eq!(coil.current_length_m, 1000.0);
    }
}
