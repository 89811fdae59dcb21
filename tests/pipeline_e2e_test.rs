// ==========================================
// 分析流水线端到端测试
// ==========================================
// 测试目标: 原始事件 → AnalyticsReport 全流程
// 场景日期: 2024-03-04（周一）
// ==========================================


use shift_analytics::domain::report::DiagnosticCode;
use shift_analytics::domain::speed::SpeedKey;
use shift_analytics::domain::types::{DurationUnit, EfficiencyBand, Shift};
use shift_analytics::{logging, EngineConfig, RawEvent, ShiftAnalyticsPipeline};
use test_helpers::{assert_close, date, dt, make_production, make_speed_table, make_stop};

fn standard_events() -> Vec<RawEvent> {
    let mut without_timestamp = make_production(
        "CA03",
        Some("R1"),
        "CAIXA Z",
        10.0,
        dt(2024, 3, 4, 7, 0),
        dt(2024, 3, 4, 8, 0),
    );
    without_timestamp.start = None;

    vec![
        make_production("CA03", Some("R1"), "CAIXA A", 120000.0, dt(2024, 3, 4, 7, 0), dt(2024, 3, 4, 8, 0)),
        make_production("CA03", Some("R1"), "CAIXA B", 90000.0, dt(2024, 3, 4, 9, 0), dt(2024, 3, 4, 10, 0)),
        make_stop("CA03", "ACERTO", "30", dt(2024, 3, 4, 10, 0), dt(2024, 3, 4, 10, 30)),
        make_stop("CA03", "QUEBRA", "50", dt(2024, 3, 4, 11, 0), dt(2024, 3, 4, 11, 50)),
        make_production("CA05", None, "CX5", 15000.0, dt(2024, 3, 4, 15, 0), dt(2024, 3, 4, 16, 0)),
        make_production("GR01", Some("G1"), "GR ITEM", 500.0, dt(2024, 3, 4, 8, 0), dt(2024, 3, 4, 9, 0)),
        make_production("CA03", Some("R1"), "CAIXA C", 1000.0, dt(2024, 3, 5, 8, 0), dt(2024, 3, 5, 9, 0)),
        without_timestamp,
    ]
}

#[test]
fn test_full_run_shift_metrics() {
    logging::init_test();
    let pipeline = ShiftAnalyticsPipeline::new(EngineConfig::default());
    let speeds = make_speed_table(&[("CA03-R1", 30000.0)]);

    let report = pipeline.run(standard_events(), &speeds, None);

    assert_eq!(report.production_day, Some(date(2024, 3, 4)));
    assert_eq!(report.duration_unit, DurationUnit::Minutes);
    assert_eq!(report.shift_summaries.len(), 2);

    // CA03 第一班: 8h20 班次，停机 80 分钟（其中 ACERTO 30 分钟为必要停机）
    let ca03 = &report.shift_summaries[0];
    assert_eq!(ca03.center, "CA03");
    assert_eq!(ca03.shift, Shift::Shift1);
    assert_close(ca03.produced, 210000.0);
    assert_close(ca03.standard_speed_avg, 30000.0);
    assert_close(ca03.stop_minutes, 80.0);
    assert_close(ca03.shift_duration_hours, 25.0 / 3.0);
    assert_close(ca03.net_time_hours, 7.0);
    assert_close(ca03.mandatory_stop_hours, 0.5);
    assert_close(ca03.available_time_hours, 25.0 / 3.0 - 0.5);
    assert_close(ca03.real_speed.unwrap(), 30000.0);
    assert_close(ca03.efficiency_pct.unwrap(), 100.0);
    assert_close(ca03.efficiency_general_pct.unwrap(), 100.0);
    assert_close(
        ca03.efficiency_adjusted_pct.unwrap(),
        210000.0 / (30000.0 * (25.0 / 3.0 - 0.5)) * 100.0,
    );
    assert_eq!(ca03.items, vec!["CAIXA A".to_string(), "CAIXA B".to_string()]);

    // CA05 经数量分档补全为 RAPIDO（15000 ≤ 18000）
    let ca05 = &report.shift_summaries[1];
    assert_eq!(ca05.center, "CA05");
    assert_eq!(ca05.shift, Shift::Shift2);
    assert_close(ca05.standard_speed_avg, 50000.0);
    assert!(!ca05.speed_floor_applied);
}

#[test]
fn test_full_run_stop_details_and_rollups() {
    let pipeline = ShiftAnalyticsPipeline::new(EngineConfig::default());
    let speeds = make_speed_table(&[("CA03-R1", 30000.0)]);

    let report = pipeline.run(standard_events(), &speeds, None);

    // 停机明细按时长降序
    let reasons: Vec<&str> = report.stop_details.iter().map(|d| d.reason.as_str()).collect();
    assert_eq!(reasons, vec!["QUEBRA", "ACERTO"]);
    assert_eq!(report.stop_details[0].formatted, "00:50");

    assert_eq!(report.center_summaries.len(), 2);
    let ca03 = report
        .center_summaries
        .iter()
        .find(|c| c.center == "CA03")
        .unwrap();
    assert_eq!(ca03.band, EfficiencyBand::Good);
    assert!(ca03.top_stop_reasons.starts_with("QUEBRA (00:50)"));

    let ca05 = report
        .center_summaries
        .iter()
        .find(|c| c.center == "CA05")
        .unwrap();
    assert_eq!(ca05.band, EfficiencyBand::Poor);

    assert_eq!(report.rankings.efficiency_top[0].center, "CA03");
    assert_eq!(report.rankings.efficiency_bottom[0].center, "CA05");
    assert_eq!(report.rankings.production_top[0].position, 1);
    assert_close(report.overall.produced_total, 225000.0);
}

#[test]
fn test_full_run_counters() {
    logging::init_test();
    let pipeline = ShiftAnalyticsPipeline::new(EngineConfig::default());
    let speeds = make_speed_table(&[("CA03-R1", 30000.0)]);

    let report = pipeline.run(standard_events(), &speeds, None);
    let diagnostics = &report.diagnostics;

    assert_eq!(diagnostics.non_line_events_dropped, 1);
    assert_eq!(diagnostics.events_outside_day, 1);
    assert_eq!(diagnostics.events_without_timestamp, 1);
    assert_eq!(diagnostics.auto_routed_events, 1);
    assert_eq!(diagnostics.missing_speed_groups, 0);
    assert_eq!(diagnostics.count_of(DiagnosticCode::RouteAutoAssigned), 1);

    // 补全的速度只进入本次运行的副本
    assert_eq!(
        report.speed_table.get(&SpeedKey::from_raw("CA05-RAPIDO")),
        Some(50000.0)
    );
    assert_eq!(speeds.len(), 1);

    let tier = report
        .rule_applications
        .iter()
        .find(|a| a.rule == "CA05:QUANTITY_TIER")
        .unwrap();
    assert_eq!(tier.events_touched, 1);
    assert_eq!(tier.keys_inserted, vec!["CA05-RAPIDO".to_string()]);
}

#[test]
fn test_explicit_day_selection() {
    let pipeline = ShiftAnalyticsPipeline::new(EngineConfig::default());
    let speeds = make_speed_table(&[("CA03-R1", 30000.0)]);

    let report = pipeline.run(standard_events(), &speeds, Some(date(2024, 3, 5)));

    assert_eq!(report.production_day, Some(date(2024, 3, 5)));
    assert_eq!(report.shift_summaries.len(), 1);
    assert_close(report.shift_summaries[0].produced, 1000.0);
    assert_eq!(report.diagnostics.events_outside_day, 5);
    // 当日无停机记录
    assert!(report.stop_details.is_empty());
}

#[test]
fn test_missing_speed_applies_floor() {
    logging::init_test();
    let pipeline = ShiftAnalyticsPipeline::new(EngineConfig::default());
    let events = vec![make_production(
        "CA99",
        Some("X"),
        "ITEM",
        1000.0,
        dt(2024, 3, 4, 7, 0),
        dt(2024, 3, 4, 8, 0),
    )];

    let report = pipeline.run(events, &make_speed_table(&[]), None);

    let row = &report.shift_summaries[0];
    assert!(row.speed_floor_applied);
    assert_close(row.standard_speed_avg, 20000.0);
    assert_eq!(report.diagnostics.missing_speed_groups, 1);
    assert_eq!(report.diagnostics.unmatched_speed_keys, vec!["CA99-X".to_string()]);
    assert_eq!(report.diagnostics.speed_floor_applied, 1);
    assert_eq!(report.diagnostics.count_of(DiagnosticCode::SpeedFloorApplied), 1);
}

#[test]
fn test_speed_correction_center() {
    let pipeline = ShiftAnalyticsPipeline::new(EngineConfig::default());
    let events = vec![
        make_production("CA12", Some("R"), "A", 100.0, dt(2024, 3, 4, 7, 0), dt(2024, 3, 4, 8, 0)),
        make_production("CA12", Some("R"), "B", 100.0, dt(2024, 3, 4, 9, 0), dt(2024, 3, 4, 10, 0)),
    ];

    let report = pipeline.run(events, &make_speed_table(&[("CA12-R", 10000.0)]), None);

    // 两个分组均值 10000，修正一次后为 20000
    assert_close(report.shift_summaries[0].standard_speed_avg, 20000.0);
}

#[test]
fn test_hours_batch_with_decimal_comma() {
    let pipeline = ShiftAnalyticsPipeline::new(EngineConfig::default());
    let events = vec![
        make_production("CA03", Some("R1"), "A", 1000.0, dt(2024, 3, 4, 7, 0), dt(2024, 3, 4, 8, 0)),
        make_stop("CA03", "REFEIÇÕES", "1,5", dt(2024, 3, 4, 12, 0), dt(2024, 3, 4, 13, 30)),
        make_stop("CA03", "FALTA MATERIAL", "0,5", dt(2024, 3, 4, 13, 30), dt(2024, 3, 4, 14, 0)),
        make_stop("CA03", "FALTA MATERIAL", "n/d", dt(2024, 3, 4, 14, 0), dt(2024, 3, 4, 14, 10)),
    ];

    let report = pipeline.run(events, &make_speed_table(&[("CA03-R1", 30000.0)]), None);

    assert_eq!(report.duration_unit, DurationUnit::Hours);
    assert_eq!(report.diagnostics.unparsable_values, 1);
    let meal = report
        .stop_details
        .iter()
        .find(|d| d.reason == "REFEIÇÕES")
        .unwrap();
    assert_close(meal.stop_minutes, 90.0);
    assert_close(report.shift_summaries[0].mandatory_stop_hours, 1.5);
}

#[test]
fn test_empty_input() {
    let pipeline = ShiftAnalyticsPipeline::new(EngineConfig::default());
    let report = pipeline.run(Vec::new(), &make_speed_table(&[]), None);

    assert_eq!(report.production_day, None);
    assert_eq!(report.duration_unit, DurationUnit::Hours);
    assert!(report.shift_summaries.is_empty());
    assert!(report.stop_details.is_empty());
    assert!(report.center_summaries.is_empty());
    assert!(report.rankings.efficiency_top.is_empty());
    assert_close(report.overall.produced_total, 0.0);
}

#[test]
fn test_rerun_is_deterministic() {
    let pipeline = ShiftAnalyticsPipeline::new(EngineConfig::default());
    let speeds = make_speed_table(&[("CA03-R1", 30000.0)]);

    let first = pipeline.run(standard_events(), &speeds, None);
    let second = pipeline.run(standard_events(), &speeds, None);

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.shift_summaries, second.shift_summaries);
    assert_eq!(first.stop_details, second.stop_details);
    assert_eq!(first.speed_table, second.speed_table);
}
