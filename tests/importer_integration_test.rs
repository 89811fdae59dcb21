// ==========================================
// 导入层集成测试
// ==========================================
// 测试目标: CSV 文件 → EventDataset / SpeedTableImport → 分析报告
// ==========================================


use shift_analytics::domain::report::DiagnosticCode;
use shift_analytics::domain::speed::SpeedKey;
use shift_analytics::domain::types::{DiagnosticLevel, RecordKind};
use shift_analytics::importer::{ImportError, ShiftDataImporter, ShiftDataImporterImpl};
use shift_analytics::logging;
use shift_analytics::{EngineConfig, ShiftAnalyticsPipeline};
use std::path::Path;
use test_helpers::{
    date, dt, event_row, standard_event_rows, write_csv, write_events_csv, write_speeds_csv,
};

#[tokio::test]
async fn test_import_events_csv() {
    logging::init_test();
    let file = write_events_csv(&standard_event_rows()).expect("写入事件 CSV 失败");
    let importer = ShiftDataImporterImpl::default();

    let dataset = importer.import_events(file.path()).await.unwrap();

    assert_eq!(dataset.total_rows, 7);
    assert_eq!(dataset.events.len(), 7);
    assert!(dataset.diagnostics.is_empty());

    let first = &dataset.events[0];
    assert_eq!(first.row_number, 2);
    assert_eq!(first.center, "CA03");
    assert_eq!(first.route.as_deref(), Some("R1"));
    assert_eq!(first.kind, RecordKind::Production);
    assert_eq!(first.approved_quantity, Some(120000.0));
    assert_eq!(first.start, Some(dt(2024, 3, 4, 7, 0)));

    let stop = &dataset.events[2];
    assert_eq!(stop.kind, RecordKind::StopReport);
    assert_eq!(stop.route, None);
    assert_eq!(stop.stop_duration_raw, "30");
    assert_eq!(stop.stop_reason, "ACERTO");
}

#[tokio::test]
async fn test_import_events_unparsable_values_are_reported() {
    logging::init_test();
    let rows = vec![event_row(
        "CA03",
        "R1",
        "Reporte de Produção",
        "CAIXA A",
        "",
        "mil",
        "04/03/2024 07:00",
        "04/03/2024 99:99",
        "",
        "",
    )];
    let file = write_events_csv(&rows).unwrap();

    let dataset = ShiftDataImporterImpl::default()
        .import_events(file.path())
        .await
        .unwrap();

    assert_eq!(dataset.events.len(), 1);
    assert_eq!(dataset.unparsable_values, 2);
    assert_eq!(dataset.events[0].approved_quantity, None);
    assert_eq!(dataset.events[0].end, None);
    assert!(dataset
        .diagnostics
        .iter()
        .all(|d| d.code == DiagnosticCode::UnparsableValue && d.row_number == Some(2)));
}

#[tokio::test]
async fn test_import_events_missing_columns_gives_empty_dataset() {
    logging::init_test();
    let file = write_csv(
        &["Centro Trabalho", "Qtd Aprovada"],
        &[vec!["CA03".to_string(), "10".to_string()]],
    )
    .unwrap();

    let dataset = ShiftDataImporterImpl::default()
        .import_events(file.path())
        .await
        .unwrap();

    assert!(dataset.is_empty());
    assert_eq!(dataset.diagnostics.len(), 1);
    assert_eq!(dataset.diagnostics[0].level, DiagnosticLevel::Error);
    assert_eq!(dataset.diagnostics[0].code, DiagnosticCode::MissingInput);
    assert!(dataset.diagnostics[0].message.contains("Hora Fim"));
}

#[tokio::test]
async fn test_import_missing_file_is_error() {
    logging::init_test();
    let result = ShiftDataImporterImpl::default()
        .import_events(Path::new("/nonexistent/eventos.csv"))
        .await;
    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
}

#[tokio::test]
async fn test_import_event_files_merges_in_order() {
    logging::init_test();
    let rows = standard_event_rows();
    let first = write_events_csv(&rows[..3]).unwrap();
    let second = write_events_csv(&rows[3..]).unwrap();

    let dataset = ShiftDataImporterImpl::default()
        .import_event_files(vec![first.path().to_path_buf(), second.path().to_path_buf()])
        .await
        .unwrap();

    assert_eq!(dataset.total_rows, 7);
    assert_eq!(dataset.events.len(), 7);
    assert_eq!(dataset.events[0].item, "CAIXA A");
    assert_eq!(dataset.events[3].stop_reason, "QUEBRA");
}

#[tokio::test]
async fn test_import_speed_table_csv() {
    logging::init_test();
    let file = write_speeds_csv(&[("CA03-R1", "30000"), ("CA03-R1", "1"), ("CA07-R2", "12500,5")])
        .unwrap();

    let import = ShiftDataImporterImpl::default()
        .import_speed_table(file.path())
        .await
        .unwrap();

    assert_eq!(import.rows, 3);
    assert_eq!(import.table.get(&SpeedKey::from_raw("CA03-R1")), Some(30000.0));
    assert_eq!(import.table.get(&SpeedKey::from_raw("CA07-R2")), Some(12500.5));
    assert_eq!(import.diagnostics.len(), 1);
    assert_eq!(import.diagnostics[0].code, DiagnosticCode::DuplicateSpeedKey);
}

#[tokio::test]
async fn test_imported_files_through_pipeline() {
    logging::init_test();
    let events_file = write_events_csv(&standard_event_rows()).unwrap();
    let speeds_file = write_speeds_csv(&[("CA03-R1", "30000")]).unwrap();
    let importer = ShiftDataImporterImpl::default();

    let (dataset, speeds) = tokio::join!(
        importer.import_events(events_file.path()),
        importer.import_speed_table(speeds_file.path())
    );
    let speeds = speeds.unwrap();

    let pipeline = ShiftAnalyticsPipeline::new(EngineConfig::default());
    let report = pipeline.run_dataset(dataset.unwrap(), &speeds.table, None);

    assert_eq!(report.production_day, Some(date(2024, 3, 4)));
    assert_eq!(report.shift_summaries.len(), 2);
    assert_eq!(report.shift_summaries[0].center, "CA03");
    assert_eq!(report.diagnostics.non_line_events_dropped, 1);
    assert_eq!(report.diagnostics.auto_routed_events, 1);
}
