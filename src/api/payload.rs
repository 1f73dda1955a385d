// ==========================================
// 钙线喂线系统 - 请求载荷解析
// ==========================================
// 职责: 将 JSON 请求（字段值可为数字或数字字符串）转换为领域类型
// 约束: 缺失/非数值字段 → InvalidInput，错误信息包含字段名
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::coil::CoilSpec;
use crate::domain::heat::{HeatParameters, HeatReference};
use serde_json::Value;

// ==========================================
// 炉次参数
// ==========================================

/// 解析炉次参数
///
/// 键: tonnage, freeboard, temp, al, s, si, p_before, p_initial, speed
pub fn parse_heat_parameters(payload: &Value) -> ApiResult<HeatParameters> {
    Ok(HeatParameters {
        tonnage_t: read_number(payload, "tonnage")?,
        freeboard_mm: read_number(payload, "freeboard")?,
        temperature_c: read_number(payload, "temp")?,
        aluminium: read_number(payload, "al")?,
        sulphur: read_number(payload, "s")?,
        silicon: read_number(payload, "si")?,
        phosphorus_before: read_number(payload, "p_before")?,
        phosphorus_initial: read_number(payload, "p_initial")?,
        injection_speed_m_per_min: read_number(payload, "speed")?,
    })
}

/// 解析炉号/LF工位号（可选，数字也按文本保存）
pub fn parse_heat_reference(payload: &Value) -> HeatReference {
    HeatReference::new(read_text(payload, "heat_id"), read_text(payload, "lf_number"))
}

// ==========================================
// 确认喂线
// ==========================================

/// 确认喂线请求
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmInjectionRequest {
    pub coil_number: String,
    pub length_used_m: f64,
    pub heat: HeatReference,
    pub params: HeatParameters,
}

/// 解析确认喂线请求
///
/// 键: coil_number, length_used, heat_id?, lf_number? + 全部炉次参数
pub fn parse_confirm_request(payload: &Value) -> ApiResult<ConfirmInjectionRequest> {
    Ok(ConfirmInjectionRequest {
        coil_number: read_required_text(payload, "coil_number")?,
        length_used_m: read_number(payload, "length_used")?,
        heat: parse_heat_reference(payload),
        params: parse_heat_parameters(payload)?,
    })
}

// ==========================================
// 切换/新建线卷
// ==========================================

/// 解析线卷切换请求
///
/// 键: coil_number, total_length, density, recovery_target, target_ppm
pub fn parse_coil_spec(payload: &Value) -> ApiResult<CoilSpec> {
    Ok(CoilSpec {
        coil_number: read_required_text(payload, "coil_number")?,
        total_length_m: read_number(payload, "total_length")?,
        density_g_per_m: read_number(payload, "density")?,
        recovery_pct: read_number(payload, "recovery_target")?,
        target_ppm: read_number(payload, "target_ppm")?,
    })
}

// ==========================================
// 字段读取
// ==========================================

fn read_number(payload: &Value, key: &str) -> ApiResult<f64> {
    let value = match payload.get(key) {
        None | Some(Value::Null) => {
            return Err(ApiError::InvalidInput(format!("缺少字段: {}", key)));
        }
        Some(v) => v,
    };

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ApiError::InvalidInput(format!(
            "字段{}不是有效数值: {}",
            key, value
        ))),
    }
}

fn read_text(payload: &Value, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_required_text(payload: &Value, key: &str) -> ApiResult<String> {
    read_text(payload, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::InvalidInput(format!("缺少字段: {}", key)))
}
