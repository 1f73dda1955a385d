// ==========================================
// 钙线喂线系统 - 喂线长度预测 API
// ==========================================
// 职责: 基于激活线卷预测喂线长度/时间
// 红线: 预测无副作用（仅空库自举会写入默认线卷）
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::{ApiError, ApiResult};
use crate::api::ledger_api::LedgerApi;
use crate::api::payload::parse_heat_parameters;
use crate::domain::heat::HeatParameters;
use crate::engine::{WireLengthEngine, WirePrediction};

// ==========================================
// PredictionApi - 预测 API
// ==========================================
pub struct PredictionApi {
    ledger_api: Arc<LedgerApi>,
    engine: WireLengthEngine,
}

impl PredictionApi {
    /// 创建新的PredictionApi实例
    pub fn new(ledger_api: Arc<LedgerApi>) -> Self {
        Self {
            ledger_api,
            engine: WireLengthEngine::new(),
        }
    }

    /// 预测喂线长度与时间（含逐条修正明细）
    pub fn predict(&self, params: &HeatParameters) -> ApiResult<WirePrediction> {
        let coil = self.ledger_api.get_active_coil()?;
        let prediction = self.engine.predict(&coil, params)?;

        tracing::debug!(
            coil_number = %coil.coil_number,
            length_m = prediction.length_m,
            time_min = prediction.time_min,
            "喂线长度预测完成"
        );

        Ok(prediction)
    }

    /// 按原始请求预测（字段值可为数字或数字字符串）
    ///
    /// 失败时不返回 Err，而是 `success=false` + 错误信息
    pub fn predict_request(&self, payload: &Value) -> PredictResponse {
        match self.predict_value(payload) {
            Ok(prediction) => PredictResponse::ok(&prediction),
            Err(e) => {
                tracing::debug!(error = %e, "喂线长度预测失败");
                PredictResponse::failed(&e)
            }
        }
    }

    fn predict_value(&self, payload: &Value) -> ApiResult<WirePrediction> {
        let params = parse_heat_parameters(payload)?;
        self.predict(&params)
    }
}

// ==========================================
// DTO 类型定义
// ==========================================

/// 预测响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_m: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictResponse {
    fn ok(prediction: &WirePrediction) -> Self {
        Self {
            success: true,
            length_m: Some(prediction.length_m),
            time_min: Some(prediction.time_min),
            error: None,
        }
    }

    fn failed(err: &ApiError) -> Self {
        Self {
            success: false,
            length_m: None,
            time_min: None,
            error: Some(err.to_string()),
        }
    }
}
