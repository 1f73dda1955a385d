use super::core::insert_log;
use super::InjectionLogRepository;
use crate::domain::coil::CoilSpec;
use crate::domain::heat::{HeatParameters, HeatReference};
use crate::domain::injection_log::InjectionLog;
use crate::repository::coil_repo::CoilConfigRepository;
use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = crate::db::open_in_memory().unwrap();
    Arc::new(Mutex::new(conn))
}

fn setup_with_coil(number: &str, total: f64) -> (CoilConfigRepository, InjectionLogRepository) {
    let conn = setup_test_db();
    let coil_repo = CoilConfigRepository::new(conn.clone());
    coil_repo
        .switch_or_create(&CoilSpec {
            coil_number: number.to_string(),
            total_length_m: total,
            density_g_per_m: 68.0,
            recovery_pct: 20.0,
            target_ppm: 30.0,
        })
        .unwrap();
    (coil_repo, InjectionLogRepository::new(conn))
}

fn make_params() -> HeatParameters {
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

fn heat(id: &str) -> HeatReference {
    HeatReference::new(Some(id.to_string()), Some("LF2".to_string()))
}

#[test]
fn test_record_injection_debits_and_logs() {
    let (coil_repo, repo) = setup_with_coil("C-1", 5000.0);

    let log = repo
        .record_injection("C-1", 330.88, &heat("H1"), &make_params())
        .unwrap();

    assert_eq!(log.coil_number, "C-1");
    assert_eq!(log.balance_after_m, 5000.0 - 330.88);
    assert!(log.log_seq > 0);

    let coil = coil_repo.find_active().unwrap().unwrap();
    assert_eq!(coil.current_length_m, 5000.0 - 330.88);
    assert_eq!(coil.heats_treated, 1);

    let stored = repo.find_by_id(&log.log_id).unwrap().unwrap();
    assert_eq!(stored, log);
}

#[test]
fn test_record_injection_twice_accumulates() {
    let (coil_repo, repo) = setup_with_coil("C-1", 1000.0);

    repo.record_injection("C-1", 100.0, &heat("H1"), &make_params())
        .unwrap();
    repo.record_injection("C-1", 100.0, &heat("H1"), &make_params())
        .unwrap();

    assert_eq!(repo.count().unwrap(), 2);
    let coil = coil_repo.find_active().unwrap().unwrap();
    assert_eq!(coil.current_length_m, 800.0);
    assert_eq!(coil.heats_treated, 2);
}

#[test]
fn test_record_injection_stale_coil_rejected() {
    let (coil_repo, repo) = setup_with_coil("C-1", 1000.0);

    let result = repo.record_injection("C-OLD", 100.0, &heat("H1"), &make_params());
    assert!(matches!(result, Err(RepositoryError::BusinessRuleViolation(_))));

    // 事务回滚: 余量与日志均未变化
    assert_eq!(repo.count().unwrap(), 0);
    let coil = coil_repo.find_active().unwrap().unwrap();
    assert_eq!(coil.current_length_m, 1000.0);
    assert_eq!(coil.heats_treated, 0);
}

#[test]
fn test_record_injection_without_active_coil() {
    let repo = InjectionLogRepository::new(setup_test_db());
    let result = repo.record_injection("C-1", 100.0, &heat("H1"), &make_params());
    assert!(matches!(result, Err(RepositoryError::BusinessRuleViolation(_))));
}

#[test]
fn test_record_injection_allows_negative_balance() {
    let (_coil_repo, repo) = setup_with_coil("C-1", 100.0);
    let log = repo
        .record_injection("C-1", 150.0, &HeatReference::default(), &make_params())
        .unwrap();
    assert_eq!(log.balance_after_m, -50.0);
    assert_eq!(log.heat.heat_id, None);
}

#[test]
fn test_find_recent_newest_first() {
    let (_coil_repo, repo) = setup_with_coil("C-1", 5000.0);

    let first = repo
        .record_injection("C-1", 10.0, &heat("H1"), &make_params())
        .unwrap();
    let second = repo
        .record_injection("C-1", 20.0, &heat("H2"), &make_params())
        .unwrap();
    let third = repo
        .record_injection("C-1", 30.0, &heat("H3"), &make_params())
        .unwrap();

    let logs = repo.find_recent(50).unwrap();
    let ids: Vec<&str> = logs.iter().map(|l| l.log_id.as_str()).collect();
    assert_eq!(ids, vec![&third.log_id, &second.log_id, &first.log_id]);

    let limited = repo.find_recent(2).unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].log_id, third.log_id);
}

#[test]
fn test_find_recent_orders_by_insertion_when_clock_goes_back() {
    let repo = InjectionLogRepository::new(setup_test_db());
    let conn = repo.get_conn().unwrap();

    let mut late = InjectionLog::new(
        "C-1".to_string(),
        10.0,
        990.0,
        heat("LATE"),
        make_params(),
    );
    late.injected_at = NaiveDate::from_ymd_opt(2025, 3, 2)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let mut early = InjectionLog::new(
        "C-1".to_string(),
        10.0,
        980.0,
        heat("EARLY"),
        make_params(),
    );
    early.injected_at = NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();

    // 时钟回拨：后写入的记录时间戳更早，仍应排在最前
    insert_log(&conn, &late).unwrap();
    insert_log(&conn, &early).unwrap();
    drop(conn);

    let logs = repo.find_recent(10).unwrap();
    assert_eq!(logs[0].heat.heat_id.as_deref(), Some("EARLY"));
    assert_eq!(logs[1].heat.heat_id.as_deref(), Some("LATE"));

    let by_coil = repo.find_by_coil_number("C-1", 10).unwrap();
    assert_eq!(by_coil[0].heat.heat_id.as_deref(), Some("EARLY"));
}

#[test]
fn test_find_by_coil_number() {
    let (coil_repo, repo) = setup_with_coil("C-1", 5000.0);
    repo.record_injection("C-1", 10.0, &heat("H1"), &make_params())
        .unwrap();

    coil_repo
        .switch_or_create(&CoilSpec {
            coil_number: "C-2".to_string(),
            total_length_m: 3000.0,
            density_g_per_m: 68.0,
            recovery_pct: 20.0,
            target_ppm: 30.0,
        })
        .unwrap();
    repo.record_injection("C-2", 20.0, &heat("H2"), &make_params())
        .unwrap();
    repo.record_injection("C-2", 30.0, &heat("H3"), &make_params())
        .unwrap();

    assert_eq!(repo.find_by_coil_number("C-1", 50).unwrap().len(), 1);
    assert_eq!(repo.find_by_coil_number("C-2", 50).unwrap().len(), 2);
    assert!(repo.find_by_coil_number("C-9", 50).unwrap().is_empty());
}

#[test]
fn test_delete_all_keeps_balance() {
    let (coil_repo, repo) = setup_with_coil("C-1", 1000.0);
    repo.record_injection("C-1", 100.0, &heat("H1"), &make_params())
        .unwrap();
    repo.record_injection("C-1", 100.0, &heat("H2"), &make_params())
        .unwrap();

    assert_eq!(repo.delete_all().unwrap(), 2);
    assert_eq!(repo.count().unwrap(), 0);
    assert!(repo.find_recent(50).unwrap().is_empty());

    let coil = coil_repo.find_active().unwrap().unwrap();
    assert_eq!(coil.current_length_m, 800.0);
}

#[test]
fn test_find_by_id_not_found() {
    let repo = InjectionLogRepository::new(setup_test_db());
    assert!(repo.find_by_id("missing").unwrap().is_none());
}
