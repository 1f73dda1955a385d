// ==========================================
// 钙线喂线系统 - 喂线日志领域模型
// ==========================================
// 红线: 日志只追加，不修改；仅允许整体清空
// 对齐: injection_log 表
// ==========================================

use crate::domain::heat::{HeatParameters, HeatReference};
use chrono::{NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

// ==========================================
// InjectionLog - 喂线日志
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectionLog {
    // ===== 主键 =====
    pub log_id: String,         // UUID
    pub log_seq: i64,           // 插入序号（新旧排序依据，单调递增）
    pub injected_at: NaiveDateTime,

    // ===== 线卷 =====
    pub coil_number: String,
    pub length_used_m: f64,   // 本次喂线长度
    pub balance_after_m: f64, // 喂线后余量

    // ===== 炉次 =====
    pub heat: HeatReference,
    pub params: HeatParameters, // 参数快照
}

impl InjectionLog {
    /// 创建新的喂线日志（log_seq 由数据库分配）
    pub fn new(
        coil_number: String,
        length_used_m: f64,
        balance_after_m: f64,
        heat: HeatReference,
        params: HeatParameters,
    ) -> Self {
        Self {
            log_id: uuid::Uuid::new_v4().to_string(),
            log_seq: 0,
            // 与库中存储精度一致（毫秒）
            injected_at: chrono::Local::now().naive_local().trunc_subsecs(3),
            coil_number,
            length_used_m,
            balance_after_m,
            heat,
            params,
        }
    }

    /// 显示用短ID
    pub fn get_display_id(&self) -> String {
        let heat_part = self.heat.heat_id.as_deref().unwrap_or("NO-HEAT");
        let short_id = self.log_id.get(..8).unwrap_or(&self.log_id);
        format!("{}_{}", heat_part, short_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn make_log(heat_id: Option<&str>) -> InjectionLog {
        InjectionLog::new(
            "COIL-001".to_string(),
            330.88,
            4669.12,
            HeatReference::new(heat_id.map(str::to_string), None),
            HeatParameters {
                tonnage_t: 150.0,
                freeboard_mm: 400.0,
                temperature_c: 1580.0,
                aluminium: 0.040,
                sulphur: 0.005,
                silicon: 0.200,
                phosphorus_before: 0.015,
                phosphorus_initial: 0.012,
                injection_speed_m_per_min: 130.0,
            },
        )
    }

    #[test]
    fn test_injected_at_truncated_to_millis() {
        let log = make_log(None);
        assert_eq!(log.injected_at.nanosecond() % 1_000_000, 0);
    }

    #[test]
    fn test_display_id() {
        let log = make_log(Some("H1001"));
        assert_eq!(log.get_display_id(), format!("H1001_{}", &log.log_id[..8]));

        let mut short = make_log(None);
        short.log_id = "abc".to_string();
        assert_eq!(short.get_display_id(), "NO-HEAT_abc");
    }
}
