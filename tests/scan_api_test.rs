// ==========================================
// ScanApi 集成测试
// ==========================================
// 测试范围:
// 1. 扫码分配: 最后一箱、未知前缀、角色校验、解码版本切换
// 2. 人工分配 / 移除分配: 全有或全无
// 3. 托盘位、历史、完成托盘
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use helpers::test_data_builder::{units, InventoryBuilder, MasterDataBuilder};

use pallet_tracker::api::ApiError;
use pallet_tracker::domain::action_log::ActionType;
use pallet_tracker::domain::pallet::SlotStatus;
use pallet_tracker::domain::types::Role;
use pallet_tracker::engine::ReconcileError;

fn env_with_sku(count: usize) -> ApiTestEnv {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_master(&[MasterDataBuilder::new("SKU-A", "12345").build()]);
    env.seed_inventory(&units(JOB, "SKU-A", count));
    env
}

// ==========================================
// 扫码
// ==========================================

#[test]
fn test_scan_claims_last_unit_then_reports_none_left() {
    let env = env_with_sku(1);
    let ctx = env.ctx(Role::Scanner);

    let outcome = env
        .state
        .scan_api
        .scan(&ctx, BARCODE, JOB, "3", "EURO")
        .expect("扫码应成功");
    assert_eq!(outcome.sku, "SKU-A");
    assert_eq!(outcome.pallet.get(), 3);
    assert_eq!(outcome.pallet_count, 1);
    assert_eq!(outcome.counts.total, 1);
    assert_eq!(outcome.counts.assigned, 1);
    assert_eq!(outcome.counts.remaining, 0);

    let err = env
        .state
        .scan_api
        .scan(&ctx, BARCODE, JOB, "3", "EURO")
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Reconcile(ReconcileError::NoAvailableUnit { ref sku, .. }) if sku == "SKU-A"
    ));
}

#[test]
fn test_scan_unknown_prefix_leaves_inventory_unchanged() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_inventory(&units(JOB, "SKU-A", 2));

    let err = env
        .state
        .scan_api
        .scan(&env.ctx(Role::Scanner), BARCODE, JOB, "1", "EURO")
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Reconcile(ReconcileError::UnknownPrefix { ref prefix }) if prefix == "12345"
    ));

    let counts = env.inventory_repo.job_counts(JOB).unwrap();
    assert_eq!(counts.assigned, 0);
    assert_eq!(counts.remaining, 2);
}

#[test]
fn test_scan_short_barcode_rejected() {
    let env = env_with_sku(1);
    let err = env
        .state
        .scan_api
        .scan(&env.ctx(Role::Admin), "0000123", JOB, "1", "EURO")
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Reconcile(ReconcileError::InvalidBarcode { min_len: 14, .. })
    ));

    // 只读取了解码配置: 箱号与操作日志均未改动
    assert_eq!(env.inventory_repo.job_counts(JOB).unwrap().assigned, 0);
    assert!(env.action_log_repo.find_recent(10, false).unwrap().is_empty());
}

#[test]
fn test_printer_cannot_scan() {
    let env = env_with_sku(1);
    let err = env
        .state
        .scan_api
        .scan(&env.ctx(Role::Printer), BARCODE, JOB, "1", "EURO")
        .unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied { role: Role::Printer, .. }));
    assert_eq!(env.inventory_repo.job_counts(JOB).unwrap().assigned, 0);
}

#[test]
fn test_scan_rejects_pallet_out_of_range() {
    let env = env_with_sku(1);
    let err = env
        .state
        .scan_api
        .scan(&env.ctx(Role::Scanner), BARCODE, JOB, "26", "EURO")
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidPalletNo(ref p) if p == "26"));
}

#[test]
fn test_decoder_variant_switch_applies_to_next_scan() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_master(&[
        MasterDataBuilder::new("SKU-A", "12345").build(),
        MasterDataBuilder::new("SKU-B", "23456").build(),
    ]);
    env.seed_inventory(&units(JOB, "SKU-A", 1));
    env.seed_inventory(&units(JOB, "SKU-B", 1));

    env.state
        .config_api
        .update_config(&env.ctx(Role::Admin), "barcode_decoder_variant", "v2")
        .expect("更新配置失败");

    let outcome = env
        .state
        .scan_api
        .scan(&env.ctx(Role::Scanner), BARCODE, JOB, "1", "EURO")
        .unwrap();
    assert_eq!(outcome.sku, "SKU-B");
}

// ==========================================
// 人工分配 / 移除
// ==========================================

#[test]
fn test_manual_assign_is_all_or_nothing() {
    let env = env_with_sku(3);
    let ctx = env.ctx(Role::Scanner);

    let err = env
        .state
        .scan_api
        .manual_assign(&ctx, JOB, "SKU-A", "EURO", "2", 5)
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Reconcile(ReconcileError::InsufficientAvailability {
            requested: 5,
            available: 3,
            ..
        })
    ));
    assert_eq!(env.inventory_repo.job_counts(JOB).unwrap().assigned, 0);

    let outcome = env
        .state
        .scan_api
        .manual_assign(&ctx, JOB, "SKU-A", "EURO", "2", 2)
        .unwrap();
    assert_eq!(outcome.assigned, 2);
    assert_eq!(outcome.pallet_count, 2);
    assert_eq!(outcome.counts.remaining, 1);
}

#[test]
fn test_manual_assign_rejects_non_positive_quantity() {
    let env = env_with_sku(1);
    let err = env
        .state
        .scan_api
        .manual_assign(&env.ctx(Role::Scanner), JOB, "SKU-A", "EURO", "2", 0)
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Reconcile(ReconcileError::InvalidQuantity { quantity: 0 })
    ));
}

#[test]
fn test_assign_unassign_assign_again() {
    let env = env_with_sku(2);
    let ctx = env.ctx(Role::Scanner);
    let api = &env.state.scan_api;

    api.manual_assign(&ctx, JOB, "SKU-A", "EURO", "4", 2).unwrap();

    let cleared = api.unassign(&ctx, JOB, "4", "SKU-A", None).unwrap();
    assert_eq!(cleared.cleared, 2);
    assert_eq!(env.inventory_repo.count_on_pallet(JOB, "4").unwrap(), 0);

    let again = api.manual_assign(&ctx, JOB, "SKU-A", "EURO", "5", 2).unwrap();
    assert_eq!(again.assigned, 2);
    assert_eq!(again.counts.remaining, 0);
}

#[test]
fn test_unassign_partial_and_nothing_left() {
    let env = env_with_sku(3);
    let ctx = env.ctx(Role::Scanner);
    let api = &env.state.scan_api;

    api.manual_assign(&ctx, JOB, "SKU-A", "EURO", "1", 3).unwrap();
    let partial = api.unassign(&ctx, JOB, "1", "SKU-A", Some(1)).unwrap();
    assert_eq!(partial.cleared, 1);
    assert_eq!(env.inventory_repo.count_on_pallet(JOB, "1").unwrap(), 2);

    let err = api.unassign(&ctx, JOB, "9", "SKU-A", None).unwrap_err();
    assert!(matches!(
        err,
        ApiError::Reconcile(ReconcileError::NothingToUnassign { .. })
    ));
}

// ==========================================
// 查询与完成托盘
// ==========================================

#[test]
fn test_pallet_slots_and_summary() {
    let env = env_with_sku(3);
    env.seed_inventory(&[InventoryBuilder::new("PRE-1", "SKU-A", JOB)
        .pallet("7", "EURO")
        .build()]);
    let ctx = env.ctx(Role::Scanner);

    env.state
        .scan_api
        .manual_assign(&ctx, JOB, "SKU-A", "EURO", "3", 2)
        .unwrap();

    let slots = env.state.scan_api.pallet_slots(&ctx, JOB).unwrap();
    assert_eq!(slots.len(), 25);
    assert_eq!(slots[2].status, SlotStatus::Used);
    assert_eq!(slots[2].unit_count, 2);
    assert_eq!(slots[6].unit_count, 1);
    assert_eq!(slots[0].status, SlotStatus::Free);

    let summary = env.state.scan_api.job_summary(&ctx, JOB).unwrap();
    assert_eq!(summary.counts.total, 4);
    assert_eq!(summary.counts.assigned, 3);
    assert_eq!(summary.pallets.len(), 2);

    let err = env.state.scan_api.job_summary(&ctx, "NOPE").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_history_filters_by_pallet() {
    let env = env_with_sku(3);
    let ctx = env.ctx(Role::Scanner);
    let api = &env.state.scan_api;

    api.manual_assign(&ctx, JOB, "SKU-A", "EURO", "1", 1).unwrap();
    api.manual_assign(&ctx, JOB, "SKU-A", "EURO", "2", 2).unwrap();

    assert_eq!(api.history(&ctx, JOB, None, None).unwrap().len(), 3);
    let on_two = api.history(&ctx, JOB, Some("2"), None).unwrap();
    assert_eq!(on_two.len(), 2);
    assert!(on_two.iter().all(|r| r.pallet.as_deref() == Some("2")));

    assert_eq!(api.history(&ctx, JOB, None, Some(1)).unwrap().len(), 1);
    assert!(matches!(
        api.history(&ctx, JOB, None, Some(0)),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_finish_pallet_writes_log() {
    let env = env_with_sku(2);
    let ctx = env.ctx(Role::Scanner);

    let err = env.state.scan_api.finish_pallet(&ctx, JOB, "6").unwrap_err();
    assert!(matches!(err, ApiError::EmptyPallet { .. }));

    env.state
        .scan_api
        .manual_assign(&ctx, JOB, "SKU-A", "EURO", "6", 2)
        .unwrap();
    let result = env.state.scan_api.finish_pallet(&ctx, JOB, "6").unwrap();
    assert_eq!(result.units, 2);

    let log = env
        .action_log_repo
        .find_by_id(result.log_id)
        .unwrap()
        .expect("日志应存在");
    assert_eq!(log.action_type, ActionType::FinishPallet.as_str());
    assert_eq!(log.actor, "scanner_user");
    assert!(log.message.as_deref().unwrap_or_default().contains('6'));

    // 完成托盘不改变箱号分配
    assert_eq!(env.inventory_repo.count_on_pallet(JOB, "6").unwrap(), 2);
}

#[test]
fn test_padded_pallet_value_is_one_pallet_everywhere() {
    let env = env_with_sku(0);
    env.seed_inventory(&[InventoryBuilder::new("PAD-1", "SKU-A", JOB)
        .pallet("07", "EURO")
        .build()]);
    let ctx = env.ctx(Role::Admin);
    let api = &env.state.scan_api;

    let slots = api.pallet_slots(&ctx, JOB).unwrap();
    assert_eq!(slots[6].status, SlotStatus::Used);
    assert_eq!(slots[6].unit_count, 1);

    let summary = api.job_summary(&ctx, JOB).unwrap();
    assert_eq!(summary.pallets.len(), 1);
    assert_eq!(summary.pallets[0].pallet, "7");

    assert_eq!(api.finish_pallet(&ctx, JOB, "7").unwrap().units, 1);
    assert_eq!(api.history(&ctx, JOB, Some("7"), None).unwrap().len(), 1);

    let data = env.state.print_api.print_data(&ctx, JOB, "7").unwrap();
    assert_eq!(data.total_cartons, 1);

    let cleared = api.unassign(&ctx, JOB, "7", "SKU-A", None).unwrap();
    assert_eq!(cleared.cleared, 1);
    assert_eq!(api.pallet_slots(&ctx, JOB).unwrap()[6].status, SlotStatus::Free);
}

#[test]
fn test_manual_assign_more_units_than_sql_variable_limit() {
    let env = env_with_sku(33_000);
    let ctx = env.ctx(Role::Scanner);

    let outcome = env
        .state
        .scan_api
        .manual_assign(&ctx, JOB, "SKU-A", "EURO", "8", 33_000)
        .expect("可用数量足够时应全部分配");
    assert_eq!(outcome.assigned, 33_000);
    assert_eq!(outcome.pallet_count, 33_000);
    assert_eq!(outcome.counts.remaining, 0);

    let cleared = env
        .state
        .scan_api
        .unassign(&ctx, JOB, "8", "SKU-A", None)
        .unwrap();
    assert_eq!(cleared.cleared, 33_000);
}
