// ==========================================
// 物业配置数据泵 - 命令行入口
// ==========================================
// 子命令:
// - import: 导入工作簿，输出 JSON 报告
// - export: 导出选中的工作表为 xlsx
// - sheets: 按导入顺序列出已注册的工作表
// ==========================================

use anyhow::Context;
use clap::{Parser, Subcommand};
use data_pump::db::{default_db_path, DB_PATH_ENV};
use data_pump::domain::WorkbookImportReport;
use data_pump::schema::normalize_sheet_name;
use data_pump::workbook::read_workbook;
use data_pump::{logging, registry, DataPumpApi};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "data-pump", version, about = "物业配置工作簿导入导出")]
struct Cli {
    /// 数据库文件路径
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<String>,

    /// 以 JSON 行输出日志
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 导入工作簿（.xlsx/.xls/.ods/.csv）
    Import {
        workbook: PathBuf,
        /// 只导入这些工作表
        #[arg(long, value_delimiter = ',')]
        sheets: Vec<String>,
    },
    /// 导出为 xlsx
    Export {
        output: PathBuf,
        /// 导出的工作表（默认全部）
        #[arg(long, value_delimiter = ',')]
        sheets: Vec<String>,
        /// 只导出这些物业 id 的数据
        #[arg(long = "property", value_delimiter = ',')]
        property_ids: Vec<String>,
        /// 导入报告（JSON），沿用其中记录的表头顺序
        #[arg(long)]
        headers_from: Option<PathBuf>,
    },
    /// 列出已注册的工作表
    Sheets,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    if cli.json_log {
        logging::init_json();
    } else {
        logging::init();
    }

    if let Commands::Sheets = cli.command {
        let order = registry().import_order()?;
        for schema in order {
            println!("{}", schema.sheet_name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let db_path = cli.db.unwrap_or_else(default_db_path);
    tracing::info!("数据泵版本: {}", data_pump::VERSION);
    let api = DataPumpApi::open(&db_path).await?;

    match cli.command {
        Commands::Import { workbook, sheets } => {
            let mut raw_sheets = read_workbook(&workbook)?;
            if !sheets.is_empty() {
                let wanted: Vec<String> = sheets.iter().map(|s| normalize_sheet_name(s)).collect();
                raw_sheets.retain(|raw| wanted.contains(&normalize_sheet_name(&raw.name)));
            }
            let report = api.import_workbook(&raw_sheets).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if report.has_errors() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Export {
            output,
            sheets,
            property_ids,
            headers_from,
        } => {
            let selected: Vec<String> = if sheets.is_empty() {
                registry()
                    .all()
                    .iter()
                    .map(|s| s.sheet_name.to_string())
                    .collect()
            } else {
                sheets
            };
            let captured = match headers_from {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("读取导入报告失败: {}", path.display()))?;
                    let report: WorkbookImportReport = serde_json::from_str(&text)?;
                    Some(report.column_headers)
                }
                None => None,
            };
            let property_ids = if property_ids.is_empty() {
                None
            } else {
                Some(property_ids.as_slice())
            };
            let batch = api
                .export_to_file(&output, &selected, property_ids, captured.as_ref())
                .await?;
            for failure in &batch.errors {
                eprintln!("{}: {}", failure.sheet_name, failure.error);
            }
            Ok(if batch.errors.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }
        Commands::Sheets => Ok(ExitCode::SUCCESS),
    }
}
