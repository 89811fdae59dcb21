// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: config_kv 覆写、默认值回退、格式错误容忍
// ==========================================


use shift_analytics::config::{config_keys, ConfigManager, EngineConfigReader};
use shift_analytics::EngineConfig;
use test_helpers::create_test_db;

#[tokio::test]
async fn test_empty_db_loads_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    let config = manager.load_engine_config().await.unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[tokio::test]
async fn test_overrides_are_applied() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    manager.set_config_value(config_keys::LINE_PREFIX, "GR").unwrap();
    manager.set_config_value(config_keys::FALLBACK_SPEED, "15000").unwrap();
    manager
        .set_config_value(config_keys::MANDATORY_STOP_REASONS, "REFEIÇÕES, SETUP ,")
        .unwrap();
    manager.set_config_value(config_keys::RANKING_SIZE, "5").unwrap();

    let config = manager.load_engine_config().await.unwrap();
    assert_eq!(config.line_prefix, "GR");
    assert_eq!(config.fallback_speed, 15000.0);
    assert_eq!(
        config.mandatory_stop_reasons,
        vec!["REFEIÇÕES".to_string(), "SETUP".to_string()]
    );
    assert_eq!(config.ranking_size, 5);
    // 未覆写项保持默认
    assert_eq!(config.speed_correction_center, "CA12");
}

#[tokio::test]
async fn test_invalid_values_fall_back_to_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    manager.set_config_value(config_keys::EFFICIENCY_CAP, "muito").unwrap();
    manager.set_config_value(config_keys::FALLBACK_SPEED, "-5").unwrap();
    manager.set_config_value(config_keys::LINE_PREFIX, "   ").unwrap();
    manager.set_config_value(config_keys::MANDATORY_STOP_REASONS, " , ").unwrap();

    let config = manager.load_engine_config().await.unwrap();
    let defaults = EngineConfig::default();
    assert_eq!(config.efficiency_cap, defaults.efficiency_cap);
    assert_eq!(config.fallback_speed, defaults.fallback_speed);
    assert_eq!(config.line_prefix, defaults.line_prefix);
    assert_eq!(config.mandatory_stop_reasons, defaults.mandatory_stop_reasons);
}

#[tokio::test]
async fn test_upsert_and_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    manager.set_config_value(config_keys::TOP_STOP_REASONS, "4").unwrap();
    manager.set_config_value(config_keys::TOP_STOP_REASONS, "6").unwrap();

    assert_eq!(manager.get_top_stop_reasons().await.unwrap(), 6);
    let snapshot = manager.get_config_snapshot().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("top_stop_reasons").map(String::as_str), Some("6"));
}
