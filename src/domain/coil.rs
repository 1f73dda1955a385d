// ==========================================
// 钙线喂线系统 - 线卷领域模型
// ==========================================
// 职责: 线卷配置、出厂默认参数、余量监控接口
// 对齐: coil_config 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// CoilConfig - 线卷配置
// ==========================================
// 不变量: 同一时刻至多一个线卷处于激活状态
// 说明: current_length_m 允许为负（余量透支，需要更换线卷）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoilConfig {
    // ===== 主键 =====
    pub coil_id: i64,        // 自增主键
    pub coil_number: String, // 线卷编号 (唯一)

    // ===== 长度 =====
    pub total_length_m: f64,   // 总长度 (m)
    pub current_length_m: f64, // 当前余量 (m)

    // ===== 工艺参数 =====
    pub density_g_per_m: f64, // 线密度 (g Ca / m)
    pub target_ppm: f64,      // 目标钙含量 (ppm)
    pub recovery_pct: f64,    // 钙收得率 (%)

    // ===== 统计 =====
    pub heats_treated: i64, // 已处理炉数

    // ===== 状态 =====
    pub is_active: bool, // 由 ledger_state.active_coil_id 推导

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// ==========================================
// CoilDefaults - 新线卷默认参数
// ==========================================
/// 空库自举时使用的默认线卷参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoilDefaults {
    pub coil_number: String,
    pub total_length_m: f64,
    pub density_g_per_m: f64,
    pub target_ppm: f64,
    pub recovery_pct: f64,
}

impl Default for CoilDefaults {
    fn default() -> Self {
        Self {
            coil_number: "COIL-001".to_string(),
            total_length_m: 5000.0,
            density_g_per_m: 68.0,
            target_ppm: 30.0,
            recovery_pct: 20.0,
        }
    }
}

// ==========================================
// CoilSpec - 线卷切换/新建参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoilSpec {
    pub coil_number: String,
    pub total_length_m: f64,
    pub density_g_per_m: f64,
    pub recovery_pct: f64,
    pub target_ppm: f64,
}

impl From<&CoilDefaults> for CoilSpec {
    fn from(defaults: &CoilDefaults) -> Self {
        Self {
            coil_number: defaults.coil_number.clone(),
            total_length_m: defaults.total_length_m,
            density_g_per_m: defaults.density_g_per_m,
            recovery_pct: defaults.recovery_pct,
            target_ppm: defaults.target_ppm,
        }
    }
}

// ==========================================
// Trait: CoilBalanceMonitor
// ==========================================
// 用途: 余量监控（低余量预警、透支判定）
pub trait CoilBalanceMonitor {
    /// 余量百分比
    ///
    /// # 返回
    /// current / total * 100；总长度 ≤ 0 时返回 0
    fn balance_pct(&self) -> f64;

    /// 余量是否低于预警比例
    ///
    /// # 参数
    /// - `threshold_pct`: 预警比例 (%)，默认 15
    fn is_low_balance(&self, threshold_pct: f64) -> bool;

    /// 余量是否耗尽（≤ 0）
    fn is_depleted(&self) -> bool;

    /// 扣减余量并累计炉数（不做下限截断）
    fn debit(&mut self, length_m: f64);
}

impl CoilBalanceMonitor for CoilConfig {
    fn balance_pct(&self) -> f64 {
        if self.total_length_m > 0.0 {
            self.current_length_m / self.total_length_m * 100.0
        } else {
            0.0
        }
    }

    fn is_low_balance(&self, threshold_pct: f64) -> bool {
        self.balance_pct() < threshold_pct
    }

    fn is_depleted(&self) -> bool {
        self.current_length_m <= 0.0
    }

    fn debit(&mut self, length_m: f64) {
        self.current_length_m -= length_m;
        self.heats_treated += 1;
    }
}

impl CoilConfig {
    /// 按参数构造一个未持久化的线卷（余量 = 总长度）
    pub fn from_spec(spec: &CoilSpec) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            coil_id: 0,
            coil_number: spec.coil_number.clone(),
            total_length_m: spec.total_length_m,
            current_length_m: spec.total_length_m,
            density_g_per_m: spec.density_g_per_m,
            target_ppm: spec.target_ppm,
            recovery_pct: spec.recovery_pct,
            heats_treated: 0,
            is_active: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// 已消耗长度
    pub fn consumed_length_m(&self) -> f64 {
        self.total_length_m - self.current_length_m
    }
}
