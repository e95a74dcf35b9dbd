// ==========================================
// 导出集成测试
// ==========================================
// 测试目标: 表头顺序、单元格转换、物业范围过滤、xlsx 写出
// ==========================================

mod test_helpers;

use data_pump::workbook::read_workbook;
use data_pump::{get_schema, CellValue, DataPump, DataPumpApi, Storage};
use std::collections::BTreeMap;
use test_helpers::*;

async fn seeded_api(db_path: &str) -> DataPumpApi {
    let api = open_api(db_path).await;
    let report = api.import_workbook(&full_workbook()).await.unwrap();
    assert!(!report.has_errors(), "fixture import failed: {:?}", report);
    api
}

async fn property_id(api: &DataPumpApi, name: &str) -> String {
    let schema = get_schema("Properties").unwrap();
    api.context()
        .storage
        .query(schema, None)
        .await
        .unwrap()
        .into_iter()
        .find(|p| p["name"] == name)
        .and_then(|p| p["id"].as_str().map(|s| s.to_string()))
        .expect("物业未落库")
}

fn cell(pump: &DataPump, row: usize, header: &str) -> CellValue {
    let col = pump
        .column_headers
        .iter()
        .position(|h| h == header)
        .expect("表头不存在");
    pump.data[row][col].clone()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_export_uses_schema_header_order() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = seeded_api(&db_path).await;

    let batch = api
        .export_data_by_workbook_sheet(&names(&["Properties"]), None)
        .await;

    assert!(batch.errors.is_empty());
    assert_eq!(batch.data_pumps.len(), 1);
    let pump = &batch.data_pumps[0];
    let expected: Vec<String> = get_schema("Properties")
        .unwrap()
        .headers()
        .iter()
        .map(|h| h.to_string())
        .collect();
    assert_eq!(pump.column_headers, expected);
    assert!(pump.data.iter().all(|row| row.len() == expected.len()));
}

#[tokio::test]
async fn test_export_coerces_cells() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = seeded_api(&db_path).await;

    let batch = api
        .export_data_by_workbook_sheet(&names(&["Properties"]), None)
        .await;
    let pump = &batch.data_pumps[0];

    // 按 name 排序: lakeside, parkmerced
    assert_eq!(cell(pump, 0, "name"), CellValue::text("lakeside"));
    assert_eq!(cell(pump, 1, "name"), CellValue::text("parkmerced"));

    assert_eq!(cell(pump, 1, "owner"), CellValue::text("Acme"));
    assert_eq!(cell(pump, 1, "operator"), CellValue::text("Keystone"));
    assert_eq!(cell(pump, 1, "startDate"), CellValue::text("03/15/2024"));
    assert_eq!(cell(pump, 1, "inactiveFlag"), CellValue::text("FALSE"));
    assert_eq!(cell(pump, 1, "APN"), CellValue::Number(1200.0));
    assert_eq!(cell(pump, 0, "operator"), CellValue::Empty);
    assert_eq!(cell(pump, 0, "startDate"), CellValue::Empty);
}

#[tokio::test]
async fn test_export_resolves_reference_lists() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = seeded_api(&db_path).await;

    let batch = api
        .export_data_by_workbook_sheet(&names(&["Teams", "Buildings", "Team Members"]), None)
        .await;
    assert!(batch.errors.is_empty());
    let sheet_names: Vec<&str> = batch.data_pumps.iter().map(|p| p.sheet_name.as_str()).collect();
    assert_eq!(sheet_names, vec!["Teams", "Buildings", "Team Members"]);

    let teams = &batch.data_pumps[0];
    assert_eq!(cell(teams, 0, "properties"), CellValue::text("parkmerced, lakeside"));

    let buildings = &batch.data_pumps[1];
    let tower = buildings
        .data
        .iter()
        .position(|row| row.contains(&CellValue::text("Tower A")))
        .expect("Tower A 未导出");
    assert_eq!(cell(buildings, tower, "amenities"), CellValue::text("Gym"));
    assert_eq!(cell(buildings, tower, "property"), CellValue::text("parkmerced"));
    assert_eq!(cell(buildings, tower, "floorCount"), CellValue::Number(12.0));

    let members = &batch.data_pumps[2];
    let alex = members
        .data
        .iter()
        .position(|row| row.contains(&CellValue::text("u-alex")))
        .expect("u-alex 未导出");
    assert_eq!(cell(members, alex, "team"), CellValue::text("leasing-west"));
    assert_eq!(cell(members, alex, "roles"), CellValue::text("LA, LM"));
}

#[tokio::test]
async fn test_export_respects_requested_headers() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = seeded_api(&db_path).await;

    let mut headers = BTreeMap::new();
    headers.insert(
        "Lease Templates".to_string(),
        names(&["prodTemplateId", "name", "notAColumn"]),
    );
    let batch = api
        .export_selected(&names(&["Lease Templates"]), None, Some(&headers))
        .await;

    let pump = &batch.data_pumps[0];
    assert_eq!(pump.column_headers, names(&["prodTemplateId", "name", "notAColumn"]));
    assert_eq!(
        pump.data[0],
        vec![CellValue::Empty, CellValue::text("Renewal"), CellValue::Empty]
    );
    assert_eq!(
        pump.data[1],
        vec![CellValue::text("PRD-1"), CellValue::text("Standard"), CellValue::Empty]
    );
}

#[tokio::test]
async fn test_export_scoped_to_properties() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = seeded_api(&db_path).await;
    let parkmerced = property_id(&api, "parkmerced").await;
    let lakeside = property_id(&api, "lakeside").await;

    let scope = vec![parkmerced];
    let batch = api
        .export_data_by_workbook_sheet(
            &names(&["Properties", "Amenities", "Property Close Schedule", "Lease Templates"]),
            Some(&scope),
        )
        .await;
    assert!(batch.errors.is_empty());
    assert_eq!(batch.data_pumps[0].data.len(), 1);
    assert_eq!(batch.data_pumps[1].data.len(), 2);
    assert_eq!(batch.data_pumps[2].data.len(), 2);
    // 无物业维度的表不过滤
    assert_eq!(batch.data_pumps[3].data.len(), 2);

    let scope = vec![lakeside];
    let batch = api
        .export_data_by_workbook_sheet(&names(&["Teams", "Buildings"]), Some(&scope))
        .await;
    assert_eq!(batch.data_pumps[0].data.len(), 1);
    assert_eq!(batch.data_pumps[1].data.len(), 1);
    assert_eq!(cell(&batch.data_pumps[1], 0, "name"), CellValue::text("Boathouse"));
}

#[tokio::test]
async fn test_unknown_sheet_is_skipped_on_export() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = seeded_api(&db_path).await;

    let batch = api
        .export_data_by_workbook_sheet(&names(&["Read Me", "Lease Templates"]), None)
        .await;
    assert!(batch.errors.is_empty());
    assert_eq!(batch.data_pumps.len(), 1);
    assert_eq!(batch.data_pumps[0].sheet_name, "Lease Templates");
}

#[tokio::test]
async fn test_export_to_file_writes_xlsx() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = seeded_api(&db_path).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.xlsx");

    let batch = api
        .export_to_file(&path, &names(&["Properties", "Lease Templates"]), None, None)
        .await
        .unwrap();
    assert_eq!(batch.data_pumps.len(), 2);

    let sheets = read_workbook(&path).unwrap();
    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[0].name, "Properties");
    assert_eq!(sheets[0].rows.len(), 2);
    assert_eq!(sheets[0].rows[1].text("owner"), "Acme");
    assert_eq!(sheets[0].rows[1].text("startDate"), "03/15/2024");
    assert_eq!(sheets[1].name, "Lease Templates");
}
