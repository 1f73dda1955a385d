// ==========================================
// 喂线长度修正规则
// ==========================================
// 每条规则独立判定、只增不减、按阶梯累加固定增量
// 成分差值先四舍五入到 5 位小数再折算阶梯，避免阈值附近的浮点抖动
// ==========================================

use crate::domain::heat::HeatParameters;
use crate::domain::types::CorrectionRule;
use serde::{Deserialize, Serialize};

// ===== 净空 =====
pub const FREEBOARD_BASE_MM: f64 = 500.0;
pub const FREEBOARD_STEP_MM: f64 = 50.0;
pub const FREEBOARD_INCREMENT_M: f64 = 20.0;

// ===== 温度 =====
pub const TEMPERATURE_BASE_C: f64 = 1600.0;
pub const TEMPERATURE_STEP_C: f64 = 10.0;
pub const TEMPERATURE_INCREMENT_M: f64 = 20.0;

// ===== 铝 =====
pub const ALUMINIUM_MIN: f64 = 0.028;
pub const ALUMINIUM_INCREMENT_M: f64 = 40.0;

// ===== 硫 =====
pub const SULPHUR_MAX: f64 = 0.010;
pub const SULPHUR_STEP: f64 = 0.001;
pub const SULPHUR_INCREMENT_M: f64 = 10.0;

// ===== 磷 =====
pub const PHOSPHORUS_GAIN_MAX: f64 = 0.003;
pub const PHOSPHORUS_STEP: f64 = 0.001;
pub const PHOSPHORUS_INCREMENT_M: f64 = 20.0;

// ===== 硅 =====
pub const SILICON_MIN: f64 = 0.010;
pub const SILICON_STEP: f64 = 0.001;
pub const SILICON_INCREMENT_M: f64 = 10.0;

/// 成分差值的保留小数位
pub const DIFF_DECIMALS: usize = 5;

// ==========================================
// RuleAdjustment - 单条规则的修正结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleAdjustment {
    pub rule: CorrectionRule,
    pub triggered: bool, // 是否越过阈值
    pub deviation: f64,  // 越过阈值的偏差（未触发为 0）
    pub steps: i64,      // 阶梯数
    pub added_m: f64,    // 增加的长度 (m)
}

impl RuleAdjustment {
    fn idle(rule: CorrectionRule) -> Self {
        Self {
            rule,
            triggered: false,
            deviation: 0.0,
            steps: 0,
            added_m: 0.0,
        }
    }

    fn stepped(rule: CorrectionRule, deviation: f64, step: f64, increment_m: f64) -> Self {
        let steps = count_steps(deviation, step);
        Self {
            rule,
            triggered: true,
            deviation,
            steps,
            added_m: steps as f64 * increment_m,
        }
    }
}

/// 按十进制保留指定小数位
///
/// 对二进制精确值取整，恰好居中时取偶（0.125 → 0.12）；
/// 不先乘 10^n，避免 0.0069949… 被放大成 0.5 进位
pub fn round_dp(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals, value)
        .parse::<f64>()
        .unwrap_or(value)
}

/// 阶梯数 = floor(偏差 / 步长)；偏差非负
fn count_steps(deviation: f64, step: f64) -> i64 {
    (deviation / step).floor() as i64
}

/// 按固定顺序求值全部规则
pub fn evaluate_all(params: &HeatParameters) -> Vec<RuleAdjustment> {
    CorrectionRule::ALL
        .iter()
        .map(|rule| evaluate(*rule, params))
        .collect()
}

/// 求值单条规则
pub fn evaluate(rule: CorrectionRule, params: &HeatParameters) -> RuleAdjustment {
    match rule {
        CorrectionRule::Freeboard => freeboard(params.freeboard_mm),
        CorrectionRule::Temperature => temperature(params.temperature_c),
        CorrectionRule::Aluminium => aluminium(params.aluminium),
        CorrectionRule::Sulphur => sulphur(params.sulphur),
        CorrectionRule::Phosphorus => phosphorus(params.phosphorus_gain()),
        CorrectionRule::Silicon => silicon(params.silicon),
    }
}

fn freeboard(freeboard_mm: f64) -> RuleAdjustment {
    if freeboard_mm > FREEBOARD_BASE_MM {
        RuleAdjustment::stepped(
            CorrectionRule::Freeboard,
            freeboard_mm - FREEBOARD_BASE_MM,
            FREEBOARD_STEP_MM,
            FREEBOARD_INCREMENT_M,
        )
    } else {
        RuleAdjustment::idle(CorrectionRule::Freeboard)
    }
}

fn temperature(temperature_c: f64) -> RuleAdjustment {
    if temperature_c > TEMPERATURE_BASE_C {
        RuleAdjustment::stepped(
            CorrectionRule::Temperature,
            temperature_c - TEMPERATURE_BASE_C,
            TEMPERATURE_STEP_C,
            TEMPERATURE_INCREMENT_M,
        )
    } else {
        RuleAdjustment::idle(CorrectionRule::Temperature)
    }
}

// 铝: 固定增量，不随偏差放大
fn aluminium(aluminium: f64) -> RuleAdjustment {
    if aluminium < ALUMINIUM_MIN {
        RuleAdjustment {
            rule: CorrectionRule::Aluminium,
            triggered: true,
            deviation: ALUMINIUM_MIN - aluminium,
            steps: 1,
            added_m: ALUMINIUM_INCREMENT_M,
        }
    } else {
        RuleAdjustment::idle(CorrectionRule::Aluminium)
    }
}

fn sulphur(sulphur: f64) -> RuleAdjustment {
    if sulphur > SULPHUR_MAX {
        let diff = round_dp(sulphur - SULPHUR_MAX, DIFF_DECIMALS);
        RuleAdjustment::stepped(CorrectionRule::Sulphur, diff, SULPHUR_STEP, SULPHUR_INCREMENT_M)
    } else {
        RuleAdjustment::idle(CorrectionRule::Sulphur)
    }
}

// 磷: 先取整增量，再与阈值比较，再对超出部分取整
fn phosphorus(raw_gain: f64) -> RuleAdjustment {
    let gain = round_dp(raw_gain, DIFF_DECIMALS);
    if gain > PHOSPHORUS_GAIN_MAX {
        let diff = round_dp(gain - PHOSPHORUS_GAIN_MAX, DIFF_DECIMALS);
        RuleAdjustment::stepped(
            CorrectionRule::Phosphorus,
            diff,
            PHOSPHORUS_STEP,
            PHOSPHORUS_INCREMENT_M,
        )
    } else {
        RuleAdjustment::idle(CorrectionRule::Phosphorus)
    }
}

fn silicon(silicon: f64) -> RuleAdjustment {
    if silicon < SILICON_MIN {
        let diff = round_dp(SILICON_MIN - silicon, DIFF_DECIMALS);
        RuleAdjustment::stepped(CorrectionRule::Silicon, diff, SILICON_STEP, SILICON_INCREMENT_M)
    } else {
        RuleAdjustment::idle(CorrectionRule::Silicon)
    }
}
