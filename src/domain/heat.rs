// ==========================================
// 钙线喂线系统 - 炉次参数领域模型
// ==========================================
// 职责: 单次计算的输入参数（不单独持久化，随喂线日志快照）
// 约定: 化学成分以小数表示（如 0.040），阈值常量按同一口径
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// HeatParameters - 炉次参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatParameters {
    pub tonnage_t: f64,        // 钢水量 (t)
    pub freeboard_mm: f64,     // 净空 (mm)
    pub temperature_c: f64,    // 钢水温度 (°C)
    pub aluminium: f64,        // 铝
    pub sulphur: f64,          // 硫
    pub silicon: f64,          // 硅
    pub phosphorus_before: f64,  // 喂线前磷
    pub phosphorus_initial: f64, // LF 初始磷
    pub injection_speed_m_per_min: f64, // 喂线速度 (m/min)
}

impl HeatParameters {
    /// 按字段名列出全部数值（用于统一校验）
    pub fn named_values(&self) -> [(&'static str, f64); 9] {
        [
            ("tonnage", self.tonnage_t),
            ("freeboard", self.freeboard_mm),
            ("temp", self.temperature_c),
            ("al", self.aluminium),
            ("s", self.sulphur),
            ("si", self.silicon),
            ("p_before", self.phosphorus_before),
            ("p_initial", self.phosphorus_initial),
            ("speed", self.injection_speed_m_per_min),
        ]
    }

    /// 第一个非有限值（NaN/∞）的字段名
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.named_values()
            .into_iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(name, _)| name)
    }

    /// 磷增量 (喂线前 - LF 初始)
    pub fn phosphorus_gain(&self) -> f64 {
        self.phosphorus_before - self.phosphorus_initial
    }
}

// ==========================================
// HeatReference - 炉次标识
// ==========================================
/// 炉号与 LF 工位号，均为可选
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatReference {
    pub heat_id: Option<String>,
    pub lf_number: Option<String>,
}

impl HeatReference {
    pub fn new(heat_id: Option<String>, lf_number: Option<String>) -> Self {
        Self {
            heat_id: normalize(heat_id),
            lf_number: normalize(lf_number),
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
