// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: config_kv 中的运行参数进入数据泵上下文
// ==========================================

mod test_helpers;

use data_pump::config::{config_keys, ConfigManager, DataPumpConfig, DataPumpConfigReader};
use data_pump::{DataPumpApi, DataPumpError};
use test_helpers::{create_test_db, insert_test_config, lease_templates_sheet, open_test_connection};

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
async fn test_defaults_without_rows() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    let config = config_manager.load_data_pump_config().await.unwrap();
    assert_eq!(config, DataPumpConfig::default());
}

#[tokio::test]
async fn test_api_reads_config_values() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn, config_keys::SHEET_CONCURRENCY, "1").unwrap();
    insert_test_config(&conn, config_keys::PERSIST_PARALLELISM, "4").unwrap();
    insert_test_config(&conn, config_keys::DEFAULT_TIMEZONE, "Asia/Tokyo").unwrap();
    drop(conn);

    let api = DataPumpApi::open(&db_path).await.expect("Failed to open api");
    let ctx = api.context();
    assert_eq!(ctx.config.sheet_concurrency, 1);
    assert_eq!(ctx.config.persist_parallelism, 4);
    assert_eq!(ctx.config.default_timezone, "Asia/Tokyo");
    assert_eq!(ctx.default_timezone, chrono_tz::Asia::Tokyo);

    // 并行落库不影响结果
    let report = api.import_workbook(&[lease_templates_sheet()]).await.unwrap();
    assert!(!report.has_errors());
    assert_eq!(report.entity_counts.get("Lease Templates"), Some(&2));
}

#[tokio::test]
async fn test_invalid_default_timezone_is_configuration_error() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn, config_keys::DEFAULT_TIMEZONE, "Mars/Olympus").unwrap();
    drop(conn);

    let result = DataPumpApi::open(&db_path).await;
    assert!(matches!(result, Err(DataPumpError::Configuration(_))));
}

#[tokio::test]
async fn test_set_and_get_global_value() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config_manager
        .set_global_config_value(config_keys::ROW_TIMEOUT_MS, "2500")
        .unwrap();
    assert_eq!(
        config_manager
            .get_global_config_value(config_keys::ROW_TIMEOUT_MS)
            .unwrap(),
        Some("2500".to_string())
    );
    assert_eq!(
        config_manager.get_row_timeout_ms().await.unwrap(),
        Some(2500)
    );
}
