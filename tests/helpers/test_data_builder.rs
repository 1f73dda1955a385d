// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use ca_wire_injection::domain::coil::CoilSpec;
use ca_wire_injection::domain::heat::HeatParameters;
use serde_json::{json, Value};

// ==========================================
// HeatParameters 构建器
// ==========================================
// 默认值: 不触发任何修正规则

pub struct HeatBuilder {
    params: HeatParameters,
}

impl HeatBuilder {
    pub fn new() -> Self {
        Self {
            params: HeatParameters {
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
        }
    }

    pub fn tonnage(mut self, t: f64) -> Self {
        self.params.tonnage_t = t;
        self
    }

    pub fn freeboard(mut self, mm: f64) -> Self {
        self.params.freeboard_mm = mm;
        self
    }

    pub fn temperature(mut self, c: f64) -> Self {
        self.params.temperature_c = c;
        self
    }

    pub fn aluminium(mut self, al: f64) -> Self {
        self.params.aluminium = al;
        self
    }

    pub fn sulphur(mut self, s: f64) -> Self {
        self.params.sulphur = s;
        self
    }

    pub fn silicon(mut self, si: f64) -> Self {
        self.params.silicon = si;
        self
    }

    pub fn phosphorus(mut self, before: f64, initial: f64) -> Self {
        self.params.phosphorus_before = before;
        self.params.phosphorus_initial = initial;
        self
    }

    pub fn speed(mut self, speed: f64) -> Self {
        self.params.injection_speed_m_per_min = speed;
        self
    }

    pub fn build(self) -> HeatParameters {
        self.params
    }

    /// 按请求键名输出 JSON
    pub fn to_json(&self) -> Value {
        let p = &self.params;
        json!({
            "tonnage": p.tonnage_t,
            "freeboard": p.freeboard_mm,
            "temp": p.temperature_c,
            "al": p.aluminium,
            "s": p.sulphur,
            "si": p.silicon,
            "p_before": p.phosphorus_before,
            "p_initial": p.phosphorus_initial,
            "speed": p.injection_speed_m_per_min,
        })
    }
}

// ==========================================
// CoilSpec 构建器
// ==========================================

pub struct CoilBuilder {
    spec: CoilSpec,
}

impl CoilBuilder {
    pub fn new(coil_number: &str) -> Self {
        Self {
            spec: CoilSpec {
                coil_number: coil_number.to_string(),
                total_length_m: 5000.0,
                density_g_per_m: 68.0,
                recovery_pct: 20.0,
                target_ppm: 30.0,
            },
        }
    }

    pub fn total_length(mut self, m: f64) -> Self {
        self.spec.total_length_m = m;
        self
    }

    pub fn density(mut self, g_per_m: f64) -> Self {
        self.spec.density_g_per_m = g_per_m;
        self
    }

    pub fn recovery(mut self, pct: f64) -> Self {
        self.spec.recovery_pct = pct;
        self
    }

    pub fn target_ppm(mut self, ppm: f64) -> Self {
        self.spec.target_ppm = ppm;
        self
    }

    pub fn build(self) -> CoilSpec {
        self.spec
    }
}
