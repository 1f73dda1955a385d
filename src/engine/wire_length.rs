// ==========================================
// 钙线喂线系统 - 喂线长度预测引擎
// ==========================================
// 职责: 物料平衡计算基础长度，再按六条阶梯规则修正
// 输入: 激活线卷配置 + 炉次参数
// 输出: 喂线长度 (m) + 喂线时间 (min) + 逐条修正明细
// 红线: 纯函数，无状态，无副作用
// ==========================================

mod rules;

#[cfg(test)]
mod tests;

pub use rules::{round_dp, RuleAdjustment};

use crate::domain::coil::CoilConfig;
use crate::domain::heat::HeatParameters;
use crate::domain::types::CorrectionRule;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// 输出长度/时间保留的小数位
pub const OUTPUT_DECIMALS: usize = 2;

// ==========================================
// WirePrediction - 预测结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePrediction {
    pub length_m: f64,      // 喂线长度（2 位小数）
    pub time_min: f64,      // 喂线时间（2 位小数）
    pub base_length_m: f64, // 物料平衡基础长度（未取整）
    pub raw_length_m: f64,  // 修正后长度（未取整）
    pub adjustments: Vec<RuleAdjustment>, // 逐条规则结果，按求值顺序
}

impl WirePrediction {
    /// 查询某条规则的修正结果
    pub fn adjustment(&self, rule: CorrectionRule) -> Option<&RuleAdjustment> {
        self.adjustments.iter().find(|a| a.rule == rule)
    }

    /// 规则修正总量 (m)
    pub fn total_adjustment_m(&self) -> f64 {
        self.adjustments.iter().map(|a| a.added_m).sum()
    }

    /// 生成修正原因说明（JSON）
    pub fn explain(&self) -> String {
        let rules: Vec<_> = self
            .adjustments
            .iter()
            .map(|a| {
                json!({
                    "rule": a.rule.to_string(),
                    "label": a.rule.label(),
                    "triggered": a.triggered,
                    "steps": a.steps,
                    "added_m": a.added_m,
                })
            })
            .collect();

        json!({
            "base_length_m": round_dp(self.base_length_m, OUTPUT_DECIMALS),
            "length_m": self.length_m,
            "time_min": self.time_min,
            "rules": rules,
        })
        .to_string()
    }
}

// ==========================================
// WireLengthEngine - 喂线长度预测引擎
// ==========================================
/// 无状态引擎，可被任意并发调用
#[derive(Debug, Default)]
pub struct WireLengthEngine {}

impl WireLengthEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 预测喂线长度与时间
    ///
    /// # 参数
    /// - `coil`: 当前激活线卷（只读）
    /// - `params`: 炉次参数
    ///
    /// # 返回
    /// - `Ok(WirePrediction)`
    /// - `Err(EngineError::InvalidInput)`: 参数为 NaN/∞
    /// - `Err(EngineError::Configuration)`: 密度或收得率不可作除数
    ///
    /// # 规则顺序
    /// 净空 → 温度 → 铝 → 硫 → 磷 → 硅，逐条累加
    pub fn predict(
        &self,
        coil: &CoilConfig,
        params: &HeatParameters,
    ) -> EngineResult<WirePrediction> {
        if let Some(field) = params.first_non_finite() {
            return Err(EngineError::InvalidInput {
                field: field.to_string(),
                message: "不是有效数值".to_string(),
            });
        }

        let base_length_m = self.base_length_m(coil, params.tonnage_t)?;
        let adjustments = rules::evaluate_all(params);

        let mut length_m = base_length_m;
        for adjustment in &adjustments {
            length_m += adjustment.added_m;
        }

        let time_min = if params.injection_speed_m_per_min > 0.0 {
            length_m / params.injection_speed_m_per_min
        } else {
            0.0
        };

        Ok(WirePrediction {
            length_m: round_dp(length_m, OUTPUT_DECIMALS),
            time_min: round_dp(time_min, OUTPUT_DECIMALS),
            base_length_m,
            raw_length_m: length_m,
            adjustments,
        })
    }

    /// 物料平衡基础长度 (m)
    ///
    /// 纯钙量 = 钢水量 × 1000 × ppm / 10^6 (kg)
    /// 毛钙量 = 纯钙量 / (收得率 / 100)
    /// 长度   = 毛钙量 × 1000 / 线密度
    pub fn base_length_m(&self, coil: &CoilConfig, tonnage_t: f64) -> EngineResult<f64> {
        validate_divisor("density", coil.density_g_per_m)?;
        validate_divisor("recovery_target", coil.recovery_pct)?;
        if !coil.target_ppm.is_finite() {
            return Err(EngineError::Configuration {
                field: "target_ppm".to_string(),
                value: coil.target_ppm,
            });
        }

        let pure_ca_kg = (tonnage_t * 1000.0) * (coil.target_ppm / 1_000_000.0);
        let gross_ca_kg = pure_ca_kg / (coil.recovery_pct / 100.0);
        Ok((gross_ca_kg * 1000.0) / coil.density_g_per_m)
    }
}

fn validate_divisor(field: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::Configuration {
            field: field.to_string(),
            value,
        })
    }
}
