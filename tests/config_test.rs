// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证配置读取、覆写与默认值
// ==========================================


use demand_planner::api::{LineOverrides, PlanningApi};
use demand_planner::config::{config_keys, ConfigError, ConfigManager, PlannerConfigReader};
use test_helpers::{create_test_db, insert_config, open_test_connection};

#[tokio::test]
async fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[tokio::test]
async fn test_defaults_when_empty() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    let scheduler = config_manager.get_scheduler_defaults().await.unwrap();
    assert_eq!(scheduler.machines, 5);
    assert_eq!(scheduler.throughput_per_machine, 100);
    assert_eq!(scheduler.labor_per_shift, 5);

    let forecast = config_manager.get_forecast_settings().await.unwrap();
    assert_eq!(forecast.arima_order, (2, 1, 2));
    assert_eq!(forecast.timeout_ms, 30_000);
}

#[tokio::test]
async fn test_overrides_from_config_kv() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_config(&conn, config_keys::SCHEDULER_MACHINES, "8").unwrap();
    insert_config(&conn, config_keys::SCHEDULER_LABOR, " 2 ").unwrap();
    insert_config(&conn, config_keys::FORECAST_ARIMA_ORDER, "1,1,0").unwrap();
    insert_config(&conn, config_keys::ARTIFACT_DIR, "/tmp/planner-artifacts").unwrap();

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    let config = config_manager.load_planner_config().await.unwrap();

    assert_eq!(config.scheduler.machines, 8);
    assert_eq!(config.scheduler.throughput_per_machine, 100);
    assert_eq!(config.scheduler.labor_per_shift, 2);
    assert_eq!(config.forecast.arima_order, (1, 1, 0));
    assert_eq!(
        config.artifact_dir,
        std::path::PathBuf::from("/tmp/planner-artifacts")
    );
}

#[tokio::test]
async fn test_malformed_value_names_key() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    config_manager
        .set_global_config_value(config_keys::SCHEDULER_MACHINES, "many")
        .unwrap();

    match config_manager.get_scheduler_defaults().await {
        Err(ConfigError::ValueError { key, value, .. }) => {
            assert_eq!(key, config_keys::SCHEDULER_MACHINES);
            assert_eq!(value, "many");
        }
        other => panic!("期望 ValueError，实际 {:?}", other),
    }
}

#[tokio::test]
async fn test_zero_throughput_rejected() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    config_manager
        .set_global_config_value(config_keys::SCHEDULER_THROUGHPUT, "0")
        .unwrap();

    assert!(config_manager.get_scheduler_defaults().await.is_err());
}

#[tokio::test]
async fn test_set_overwrites_and_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config_manager
        .set_global_config_value(config_keys::FORECAST_TIMEOUT_MS, "1000")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::FORECAST_TIMEOUT_MS, "2500")
        .unwrap();

    assert_eq!(
        config_manager
            .get_global_config_value(config_keys::FORECAST_TIMEOUT_MS)
            .unwrap(),
        Some("2500".to_string())
    );

    let snapshot: serde_json::Value =
        serde_json::from_str(&config_manager.get_config_snapshot().unwrap()).unwrap();
    assert_eq!(snapshot[config_keys::FORECAST_TIMEOUT_MS], "2500");
}

#[tokio::test]
async fn test_api_from_config_reader_uses_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    config_manager
        .set_global_config_value(config_keys::SCHEDULER_MACHINES, "2")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::ARTIFACT_DIR, temp_dir.path().to_str().unwrap())
        .unwrap();

    let api = PlanningApi::from_config_reader(&config_manager).await.unwrap();
    assert_eq!(api.scheduler_defaults().machines, 2);

    let result = api
        .try_schedule_single_day("2025-01-01", 450.0, LineOverrides::default())
        .unwrap();
    assert_eq!(result.summary.machines_running, 2);
    assert_eq!(result.summary.backlog_end, 250.0);

    let artifact = result.schedule_artifact.unwrap();
    assert!(artifact.starts_with(temp_dir.path().to_str().unwrap()));
}

#[tokio::test]
async fn test_invalid_arima_order_fails_api_build() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    config_manager
        .set_global_config_value(config_keys::FORECAST_ARIMA_ORDER, "2,5,2")
        .unwrap();

    let result = PlanningApi::from_config_reader(&config_manager).await;
    assert!(result.is_err());
}
