// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、工作表构造、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use data_pump::db::init_base_schema;
use data_pump::{DataPump, DataPumpApi, RawSheet, SheetRow};
use rusqlite::{params, Connection};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化基础表
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = Connection::open(&db_path)?;
    init_base_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(Connection::open(db_path)?)
}

/// 写入一条 global 配置
pub fn insert_test_config(conn: &Connection, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

/// 测试使用的固定当前时刻
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()
}

/// 打开数据泵并固定当前时刻
pub async fn open_api(db_path: &str) -> DataPumpApi {
    open_api_at(db_path, fixed_now()).await
}

pub async fn open_api_at(db_path: &str, now: DateTime<Utc>) -> DataPumpApi {
    data_pump::logging::init_test();
    let api = DataPumpApi::open(db_path).await.expect("打开数据泵失败");
    DataPumpApi::new(api.context().clone().with_now(now))
}

/// 按表头顺序构造工作表（每行的值与表头逐位对应，空串即空单元格）
pub fn sheet(name: &str, headers: &[&str], rows: &[&[&str]]) -> RawSheet {
    let rows = rows
        .iter()
        .map(|values| {
            SheetRow::from_pairs(
                headers
                    .iter()
                    .zip(values.iter())
                    .map(|(h, v)| (h.to_string(), v.to_string())),
            )
        })
        .collect();
    RawSheet::new(name, headers.iter().map(|h| h.to_string()).collect(), rows)
}

/// 导出结果转回可导入的工作表
pub fn to_raw_sheet(pump: &DataPump) -> RawSheet {
    let rows = pump
        .data
        .iter()
        .map(|row| SheetRow::from_pairs(pump.column_headers.iter().cloned().zip(row.iter().cloned())))
        .collect();
    RawSheet::new(pump.sheet_name.clone(), pump.column_headers.clone(), rows)
}

// ==========================================
// 测试数据
// ==========================================

pub fn business_entities_sheet() -> RawSheet {
    sheet(
        "Business Entities",
        &["name", "type", "contactName", "contactEmail"],
        &[
            &["Acme", "owner", "Jordan Lee", "jordan@acme.com"],
            &["Keystone", "operator", "", ""],
        ],
    )
}

pub fn properties_sheet() -> RawSheet {
    sheet(
        "Properties",
        &["name", "displayName", "owner", "operator", "timeZone", "startDate", "inactiveFlag", "APN"],
        &[
            &["parkmerced", "Parkmerced", "Acme", "Keystone", "America/Los_Angeles", "3/15/2024", "FALSE", "1200"],
            &["lakeside", "Lakeside", "Acme", "", "America/Chicago", "", "", ""],
        ],
    )
}

pub fn amenities_sheet() -> RawSheet {
    sheet(
        "Amenities",
        &["name", "property", "category", "displayName"],
        &[
            &["Pool", "parkmerced", "property", "Pool"],
            &["Gym", "parkmerced", "building", "Gym"],
            &["Dock", "lakeside", "property", "Dock"],
        ],
    )
}

pub fn buildings_sheet() -> RawSheet {
    sheet(
        "Buildings",
        &["name", "displayName", "property", "amenities", "floorCount"],
        &[
            &["Tower A", "Tower A", "parkmerced", "Gym", "12"],
            &["Boathouse", "Boathouse", "lakeside", "", "2"],
        ],
    )
}

pub fn close_schedule_sheet() -> RawSheet {
    sheet(
        "Property Close Schedule",
        &["propertyName", "month", "year", "rollForwardDate"],
        &[
            &["parkmerced", "1", "2031", "1/20/2031"],
            &["parkmerced", "2", "2031", "2/20/2031"],
            &["lakeside", "6", "2031", "6/25/2031"],
        ],
    )
}

pub fn lease_templates_sheet() -> RawSheet {
    sheet(
        "Lease Templates",
        &["name", "category", "sandboxTemplateId", "prodTemplateId"],
        &[
            &["Standard", "Leasing", "SBX-1", "PRD-1"],
            &["Renewal", "Renewals", "", ""],
        ],
    )
}

pub fn teams_sheet() -> RawSheet {
    sheet(
        "Teams",
        &["name", "displayName", "module", "properties", "timeZone"],
        &[&["leasing-west", "Leasing West", "leasing", "parkmerced, lakeside", "America/Los_Angeles"]],
    )
}

pub fn employees_sheet() -> RawSheet {
    sheet(
        "Employees",
        &["userUniqueId", "registrationEmail", "fullName"],
        &[
            &["u-alex", "alex@example.com", "Alex Kim"],
            &["u-sam", "sam@example.com", "Sam Ortiz"],
        ],
    )
}

pub fn team_members_sheet() -> RawSheet {
    sheet(
        "Team Members",
        &["team", "userUniqueId", "roles"],
        &[
            &["leasing-west", "u-alex", "LA, LM"],
            &["leasing-west", "u-sam", "LA"],
        ],
    )
}

pub fn global_settings_sheet() -> RawSheet {
    sheet(
        "Global Settings",
        &[
            "communications\ncontactUsLink",
            "communications\nfooterNotice",
            "preferences\nhidePropertyLifestyles",
            "screening\noriginatorId",
        ],
        &[&["https://example.com/contact", "Acme Living", "FALSE", "42"]],
    )
}

pub fn property_groups_sheet() -> RawSheet {
    sheet(
        "Property Groups",
        &["name", "displayName", "owner"],
        &[&["west", "West Portfolio", "Acme"]],
    )
}

pub fn party_cohorts_sheet() -> RawSheet {
    sheet(
        "Party Cohorts",
        &["name", "description"],
        &[&["Students", ""], &["Families", "Multi-bedroom"]],
    )
}

pub fn property_settings_sheet() -> RawSheet {
    sheet(
        "Property Settings",
        &[
            "property",
            "appointment\nenableSelfServiceEdit",
            "appointment\neditUrl",
            "calendar\nteamSlotDuration",
            "marketing\ntags",
        ],
        &[
            &["parkmerced", "TRUE", "https://tours.example.com", "30", "pet friendly, downtown"],
            &["lakeside", "", "", "", ""],
        ],
    )
}

pub fn voice_messages_sheet() -> RawSheet {
    sheet(
        "Voice Messages",
        &["name", "afterHours"],
        &[&["default", "Office closed"]],
    )
}

pub fn sources_sheet() -> RawSheet {
    sheet(
        "Sources",
        &["name", "displayName", "type"],
        &[&["zillow", "Zillow", "ils"]],
    )
}

pub fn layouts_sheet() -> RawSheet {
    sheet(
        "Layouts",
        &["name", "property", "displayName", "inventoryType", "numBedrooms", "numBathrooms", "amenities"],
        &[&["Studio", "parkmerced", "Studio", "unit", "1", "1.5", "Gym"]],
    )
}

pub fn lease_names_sheet() -> RawSheet {
    sheet(
        "Lease Names",
        &["name", "property", "inventoryType"],
        &[&["Standard Lease", "parkmerced", "unit"]],
    )
}

pub fn lease_terms_sheet() -> RawSheet {
    sheet(
        "Lease Terms",
        &["leaseName", "property", "length", "period", "state"],
        &[&["Standard Lease", "parkmerced", "12", "month", "new, renewal"]],
    )
}

pub fn team_targets_sheet() -> RawSheet {
    sheet(
        "Team Targets",
        &["name", "month", "year", "salesTarget"],
        &[&["leasing-west", "1", "2031", "12"]],
    )
}

/// Rent 的附加费用指向后面一行的 Parking
pub fn fees_sheet() -> RawSheet {
    sheet(
        "Fees",
        &[
            "name",
            "property",
            "displayName",
            "feeType",
            "servicePeriod",
            "absolutePrice",
            "additionalFees",
            "quoteSectionName",
        ],
        &[
            &["Rent", "parkmerced", "Rent", "service", "month", "2500", "Parking", "inventory"],
            &["Parking", "parkmerced", "Parking", "service", "month", "150", "", "parking"],
            &["Unit Group Fee", "parkmerced", "Unit group", "inventoryGroup", "", "", "", ""],
            &["Application", "lakeside", "Application", "application", "oneTime", "50", "", ""],
        ],
    )
}

pub fn inventory_groups_sheet() -> RawSheet {
    sheet(
        "Inventory Groups",
        &["name", "property", "displayName", "inventoryType", "leaseName", "basePriceMonthly", "feeName", "amenities"],
        &[
            &["Studios", "parkmerced", "Studios", "unit", "Standard Lease", "2400", "Unit Group Fee", "Gym"],
            &["Slips", "lakeside", "Boat slips", "parking", "", "", "", ""],
        ],
    )
}

/// 101A 的父级房源在后面一行
pub fn inventory_sheet() -> RawSheet {
    sheet(
        "Inventory",
        &["name", "property", "building", "type", "inventoryGroup", "layout", "parentInventory", "floor"],
        &[
            &["101A", "parkmerced", "Tower A", "unit", "Studios", "Studio", "101", "1"],
            &["101", "parkmerced", "Tower A", "unit", "Studios", "Studio", "", "1"],
            &["S1", "lakeside", "Boathouse", "parking", "Slips", "", "", ""],
        ],
    )
}

pub fn concessions_sheet() -> RawSheet {
    sheet(
        "Concessions",
        &["name", "property", "displayName", "appliedToFees", "absoluteAdjustment", "recurringCount", "startDate", "endDate"],
        &[&["Move-in Special", "parkmerced", "Move-in special", "Rent, Parking", "-100", "1", "3/1/2031", "6/30/2031"]],
    )
}

pub fn team_member_targets_sheet() -> RawSheet {
    sheet(
        "Team Member Targets",
        &["team", "registrationEmail", "month", "year", "salesTarget", "leadsToSalesConv"],
        &[&["leasing-west", "alex@example.com", "1", "2031", "4", "25"]],
    )
}

/// 覆盖全部已注册工作表的完整工作簿（故意打乱顺序）
pub fn full_workbook() -> Vec<RawSheet> {
    vec![
        team_member_targets_sheet(),
        concessions_sheet(),
        inventory_sheet(),
        team_members_sheet(),
        buildings_sheet(),
        close_schedule_sheet(),
        inventory_groups_sheet(),
        amenities_sheet(),
        teams_sheet(),
        team_targets_sheet(),
        fees_sheet(),
        lease_templates_sheet(),
        layouts_sheet(),
        lease_terms_sheet(),
        lease_names_sheet(),
        properties_sheet(),
        property_settings_sheet(),
        employees_sheet(),
        sources_sheet(),
        voice_messages_sheet(),
        party_cohorts_sheet(),
        property_groups_sheet(),
        business_entities_sheet(),
        global_settings_sheet(),
    ]
}
