// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证配置读取、快照与恢复
// ==========================================


use furniture_quote::config::{config_keys, ConfigManager, QuoteConfigReader};
use furniture_quote::engine::FormulaId;
use test_helpers::{create_test_db, insert_test_config, open_test_connection};

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
async fn test_quotation_number_settings() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn, config_keys::QUOTATION_NUMBER_PREFIX, "INV-").unwrap();
    insert_test_config(&conn, config_keys::QUOTATION_NUMBER_WIDTH, " 3 ").unwrap();

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(
        config_manager.get_quotation_number_prefix().await.unwrap(),
        "INV-"
    );
    assert_eq!(config_manager.get_quotation_number_width().await.unwrap(), 3);
}

#[tokio::test]
async fn test_formula_aliases() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn, "formula_alias/Teak Edge", "LIPPING").unwrap();
    insert_test_config(&conn, "formula_alias/Rosewood", "solid_wood").unwrap();
    insert_test_config(&conn, "formula_alias/Broken", "not-a-formula").unwrap();
    insert_test_config(&conn, "unrelated_key", "board").unwrap();

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    let aliases = config_manager.get_formula_aliases().await.unwrap();

    assert_eq!(
        aliases,
        vec![
            ("Rosewood".to_string(), FormulaId::SolidWood),
            ("Teak Edge".to_string(), FormulaId::Lipping),
        ]
    );
}

#[tokio::test]
async fn test_snapshot_and_restore() {
    let (_temp_a, db_a) = create_test_db().expect("Failed to create test db");
    let (_temp_b, db_b) = create_test_db().expect("Failed to create test db");

    let source = ConfigManager::new(&db_a).unwrap();
    source
        .set_global_config_value(config_keys::QUOTATION_NUMBER_PREFIX, "FQ-")
        .unwrap();
    source
        .set_global_config_value("formula_alias/Teak Panel", "board")
        .unwrap();
    let snapshot = source.get_config_snapshot().unwrap();

    let target = ConfigManager::new(&db_b).unwrap();
    target
        .set_global_config_value(config_keys::QUOTATION_NUMBER_PREFIX, "OLD-")
        .unwrap();
    let restored = target.restore_config_from_snapshot(&snapshot).unwrap();

    assert_eq!(restored, 2);
    assert_eq!(target.get_quotation_number_prefix().await.unwrap(), "FQ-");
    assert_eq!(
        target.get_global_config_value("formula_alias/Teak Panel").unwrap(),
        Some("board".to_string())
    );
}

#[tokio::test]
async fn test_restore_rejects_malformed_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();
    assert!(config_manager.restore_config_from_snapshot("not json").is_err());
}
