use super::*;
use crate::domain::coil::{CoilConfig, CoilDefaults, CoilSpec};
use crate::domain::heat::HeatParameters;

// ==========================================
// 测试辅助
// ==========================================

fn create_test_coil() -> CoilConfig {
    CoilConfig::from_spec(&CoilSpec::from(&CoilDefaults::default()))
}

/// 基准工况：所有规则均不触发
fn baseline_params() -> HeatParameters {
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
    }
}

fn predict_with(f: impl FnOnce(&mut HeatParameters)) -> WirePrediction {
    let mut params = baseline_params();
    f(&mut params);
    WireLengthEngine::new()
        .predict(&create_test_coil(), &params)
        .unwrap()
}

fn added(prediction: &WirePrediction, rule: CorrectionRule) -> f64 {
    prediction.adjustment(rule).unwrap().added_m
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "actual={}, expected={}",
        actual,
        expected
    );
}

// ==========================================
// 基础长度
// ==========================================

#[test]
fn test_worked_example() {
    let prediction = predict_with(|_| {});

    // 150t × 30ppm → 4.5kg 纯钙 → 22.5kg 毛钙 → 22500g / 68 g/m
    assert_close(prediction.base_length_m, 22500.0 / 68.0);
    assert_close(prediction.length_m, 330.88);
    assert_close(prediction.time_min, 2.55);
    assert_eq!(prediction.total_adjustment_m(), 0.0);
    assert!(prediction.adjustments.iter().all(|a| !a.triggered));
}

#[test]
fn test_base_length_scales_with_tonnage() {
    let prediction = predict_with(|p| p.tonnage_t = 100.0);
    assert_close(prediction.length_m, 220.59);
    assert_close(prediction.time_min, 1.7);
}

#[test]
fn test_adjustments_in_fixed_order() {
    let prediction = predict_with(|_| {});
    let order: Vec<CorrectionRule> = prediction.adjustments.iter().map(|a| a.rule).collect();
    assert_eq!(order, CorrectionRule::ALL.to_vec());
}

// ==========================================
// 净空规则
// ==========================================

#[test]
fn test_freeboard_threshold_exactness() {
    // 500mm 不触发
    let p = predict_with(|p| p.freeboard_mm = 500.0);
    assert_eq!(added(&p, CorrectionRule::Freeboard), 0.0);
    assert!(!p.adjustment(CorrectionRule::Freeboard).unwrap().triggered);

    // 550mm 恰好一个 50mm 阶梯
    let p = predict_with(|p| p.freeboard_mm = 550.0);
    assert_eq!(added(&p, CorrectionRule::Freeboard), 20.0);
    assert_close(p.length_m, 350.88);

    // 549.999mm 越过阈值但不足一个阶梯
    let p = predict_with(|p| p.freeboard_mm = 549.999);
    assert_eq!(p.adjustment(CorrectionRule::Freeboard).unwrap().steps, 0);
    assert_close(p.length_m, 330.88);
}

#[test]
fn test_freeboard_multiple_steps() {
    // (620 - 500) / 50 = 2.4 → 2 阶
    let p = predict_with(|p| p.freeboard_mm = 620.0);
    assert_eq!(p.adjustment(CorrectionRule::Freeboard).unwrap().steps, 2);
    assert_close(p.length_m, 370.88);
}

// ==========================================
// 温度规则
// ==========================================

#[test]
fn test_temperature_rule() {
    let p = predict_with(|p| p.temperature_c = 1600.0);
    assert_eq!(added(&p, CorrectionRule::Temperature), 0.0);

    let p = predict_with(|p| p.temperature_c = 1610.0);
    assert_eq!(added(&p, CorrectionRule::Temperature), 20.0);

    // 25 / 10 → 2 阶
    let p = predict_with(|p| p.temperature_c = 1625.0);
    assert_eq!(added(&p, CorrectionRule::Temperature), 40.0);
    assert_close(p.length_m, 370.88);
    assert_close(p.time_min, 2.85);
}

// ==========================================
// 铝规则
// ==========================================

#[test]
fn test_aluminium_flat_addition() {
    let p = predict_with(|p| p.aluminium = 0.028);
    assert_eq!(added(&p, CorrectionRule::Aluminium), 0.0);

    let p = predict_with(|p| p.aluminium = 0.027);
    assert_eq!(added(&p, CorrectionRule::Aluminium), 40.0);

    // 与偏差大小无关
    let p = predict_with(|p| p.aluminium = 0.001);
    assert_eq!(added(&p, CorrectionRule::Aluminium), 40.0);
}

// ==========================================
// 硫规则
// ==========================================

#[test]
fn test_sulphur_rule() {
    let p = predict_with(|p| p.sulphur = 0.010);
    assert_eq!(added(&p, CorrectionRule::Sulphur), 0.0);

    let p = predict_with(|p| p.sulphur = 0.011);
    assert_eq!(added(&p, CorrectionRule::Sulphur), 10.0);

    let p = predict_with(|p| p.sulphur = 0.013);
    assert_eq!(added(&p, CorrectionRule::Sulphur), 30.0);

    let p = predict_with(|p| p.sulphur = 0.015);
    assert_eq!(added(&p, CorrectionRule::Sulphur), 50.0);
    assert_close(p.length_m, 380.88);

    // 0.0025 → 2 阶
    let p = predict_with(|p| p.sulphur = 0.0125);
    assert_eq!(added(&p, CorrectionRule::Sulphur), 20.0);
}

// ==========================================
// 磷规则
// ==========================================

#[test]
fn test_phosphorus_gain_at_threshold_does_not_trigger() {
    // 0.015 - 0.012 = 0.003，不大于阈值
    let p = predict_with(|_| {});
    assert!(!p.adjustment(CorrectionRule::Phosphorus).unwrap().triggered);
}

#[test]
fn test_phosphorus_rule() {
    // 增量 0.005 → 超出 0.002 → 2 阶
    let p = predict_with(|p| p.phosphorus_before = 0.017);
    assert_eq!(added(&p, CorrectionRule::Phosphorus), 40.0);

    // 增量 0.008 → 超出 0.005 → 5 阶
    let p = predict_with(|p| p.phosphorus_before = 0.020);
    assert_eq!(added(&p, CorrectionRule::Phosphorus), 100.0);
    assert_close(p.length_m, 430.88);

    // 增量 0.0035 → 触发但不足一阶
    let p = predict_with(|p| p.phosphorus_before = 0.0155);
    let adj = p.adjustment(CorrectionRule::Phosphorus).unwrap();
    assert!(adj.triggered);
    assert_eq!(adj.steps, 0);
}

#[test]
fn test_phosphorus_negative_gain_never_triggers() {
    let p = predict_with(|p| p.phosphorus_before = 0.001);
    assert_eq!(added(&p, CorrectionRule::Phosphorus), 0.0);
}

// ==========================================
// 硅规则
// ==========================================

#[test]
fn test_silicon_rule() {
    let p = predict_with(|p| p.silicon = 0.010);
    assert_eq!(added(&p, CorrectionRule::Silicon), 0.0);

    let p = predict_with(|p| p.silicon = 0.009);
    assert_eq!(added(&p, CorrectionRule::Silicon), 10.0);

    let p = predict_with(|p| p.silicon = 0.005);
    assert_eq!(added(&p, CorrectionRule::Silicon), 50.0);

    // 0.0015 → 1 阶
    let p = predict_with(|p| p.silicon = 0.0085);
    assert_eq!(added(&p, CorrectionRule::Silicon), 10.0);
}

// ==========================================
// 组合与时间
// ==========================================

#[test]
fn test_all_rules_combined() {
    let p = predict_with(|p| {
        p.freeboard_mm = 650.0; // +60
        p.temperature_c = 1630.0; // +60
        p.aluminium = 0.020; // +40
        p.sulphur = 0.014; // +40
        p.phosphorus_before = 0.018; // +60
        p.silicon = 0.006; // +40
        p.injection_speed_m_per_min = 120.0;
    });

    assert_eq!(p.total_adjustment_m(), 300.0);
    assert_close(p.length_m, 630.88);
    assert_close(p.time_min, 5.26);
}

#[test]
fn test_zero_speed_yields_zero_time() {
    let p = predict_with(|p| p.injection_speed_m_per_min = 0.0);
    assert_close(p.length_m, 330.88);
    assert_eq!(p.time_min, 0.0);
}

#[test]
fn test_explain_lists_every_rule() {
    let p = predict_with(|p| p.freeboard_mm = 550.0);
    let reason = p.explain();
    assert!(reason.contains("FREEBOARD"));
    assert!(reason.contains("SILICON"));
    assert!(reason.contains("净空修正"));
}

// ==========================================
// 错误路径
// ==========================================

#[test]
fn test_zero_density_is_configuration_error() {
    let mut coil = create_test_coil();
    coil.density_g_per_m = 0.0;

    let result = WireLengthEngine::new().predict(&coil, &baseline_params());
    match result {
        Err(EngineError::Configuration { field, value }) => {
            assert_eq!(field, "density");
            assert_eq!(value, 0.0);
        }
        other => panic!("Expected Configuration error, got {:?}", other),
    }
}

#[test]
fn test_zero_recovery_is_configuration_error() {
    let mut coil = create_test_coil();
    coil.recovery_pct = 0.0;

    let result = WireLengthEngine::new().predict(&coil, &baseline_params());
    assert!(matches!(
        result,
        Err(EngineError::Configuration { ref field, .. }) if field == "recovery_target"
    ));
}

#[test]
fn test_non_finite_input_is_invalid() {
    let mut params = baseline_params();
    params.temperature_c = f64::INFINITY;

    let result = WireLengthEngine::new().predict(&create_test_coil(), &params);
    assert!(matches!(
        result,
        Err(EngineError::InvalidInput { ref field, .. }) if field == "temp"
    ));
}

// ==========================================
// 性质
// ==========================================

#[test]
fn test_predict_is_deterministic() {
    let engine = WireLengthEngine::new();
    let coil = create_test_coil();
    let mut params = baseline_params();
    params.sulphur = 0.017;
    params.freeboard_mm = 733.0;

    let first = engine.predict(&coil, &params).unwrap();
    let second = engine.predict(&coil, &params).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_monotonic_in_freeboard_and_temperature() {
    let mut last = f64::MIN;
    for i in 0..200 {
        let fb = 300.0 + i as f64 * 3.7;
        let p = predict_with(|p| p.freeboard_mm = fb);
        assert!(p.raw_length_m >= last, "freeboard={}", fb);
        last = p.raw_length_m;
    }

    let mut last = f64::MIN;
    for i in 0..200 {
        let temp = 1550.0 + i as f64 * 0.9;
        let p = predict_with(|p| p.temperature_c = temp);
        assert!(p.raw_length_m >= last, "temp={}", temp);
        last = p.raw_length_m;
    }
}

#[test]
fn test_monotonic_in_sulphur_and_phosphorus_gap() {
    let mut last = f64::MIN;
    for i in 0..120 {
        let s = 0.005 + i as f64 * 0.00025;
        let p = predict_with(|p| p.sulphur = s);
        assert!(p.raw_length_m >= last, "s={}", s);
        last = p.raw_length_m;
    }

    let mut last = f64::MIN;
    for i in 0..120 {
        let p_before = 0.012 + i as f64 * 0.00025;
        let p = predict_with(|p| p.phosphorus_before = p_before);
        assert!(p.raw_length_m >= last, "p_before={}", p_before);
        last = p.raw_length_m;
    }
}

#[test]
fn test_round_dp() {
    assert_eq!(round_dp(330.88235294117646, 2), 330.88);
    assert_eq!(round_dp(0.015 - 0.010, 5), 0.005);

    // 二进制值略小于 0.006995，应舍去
    assert_eq!(round_dp(0.016995 - 0.010, 5), 0.00699);

    // 恰好居中取偶
    assert_eq!(round_dp(0.125, 2), 0.12);
    assert_eq!(round_dp(3.125, 2), 3.12);
    assert_eq!(round_dp(0.375, 2), 0.38);
}

// ==========================================
// 差值取整边界
// ==========================================

#[test]
fn test_sulphur_diff_just_below_half_rounds_down() {
    // 0.016995 - 0.010 = 0.0069949… → 0.00699 → 6 阶
    let p = predict_with(|p| p.sulphur = 0.016995);
    let adj = p.adjustment(CorrectionRule::Sulphur).unwrap();
    assert_eq!(adj.deviation, 0.00699);
    assert_eq!(adj.steps, 6);
    assert_eq!(adj.added_m, 60.0);
}

#[test]
fn test_phosphorus_gain_just_below_half_rounds_down() {
    // 增量 0.0069949… → 0.00699 → 超出 0.00399 → 3 阶
    let p = predict_with(|p| {
        p.phosphorus_before = 0.016995;
        p.phosphorus_initial = 0.010;
    });
    let adj = p.adjustment(CorrectionRule::Phosphorus).unwrap();
    assert_eq!(adj.steps, 3);
    assert_eq!(adj.added_m, 60.0);
}

#[test]
fn test_silicon_diff_just_below_half_rounds_down() {
    // 0.010 - 0.001005 = 0.0089949… → 0.00899 → 8 阶
    let p = predict_with(|p| p.silicon = 0.001005);
    let adj = p.adjustment(CorrectionRule::Silicon).unwrap();
    assert_eq!(adj.steps, 8);
    assert_eq!(adj.added_m, 80.0);
}

#[test]
fn test_time_half_tie_rounds_to_even() {
    // 0t 钢水：净空 12 阶 240m + 硫 1 阶 10m = 250m；250 / 80 = 3.125
    let p = predict_with(|p| {
        p.tonnage_t = 0.0;
        p.freeboard_mm = 1100.0;
        p.sulphur = 0.011;
        p.injection_speed_m_per_min = 80.0;
    });
    assert_eq!(p.raw_length_m, 250.0);
    assert_eq!(p.length_m, 250.0);
    assert_eq!(p.time_min, 3.12);
}
