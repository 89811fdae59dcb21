// ==========================================
// 班次绩效分析引擎 - 命令行入口
// ==========================================
// 流程: 加载配置 → 并发导入事件日志/速度表 → 分析 → 导出
// 用法:
//   shift-analytics --events eventos.xlsx --speeds velocidade.xlsx \
//       --day 2024-03-04 --output relatorio.json
// ==========================================

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use shift_analytics::domain::report::{Diagnostic, DiagnosticCode};
use shift_analytics::domain::types::DiagnosticLevel;
use shift_analytics::export::{ExportFormat, ReportWriter};
use shift_analytics::importer::{ShiftDataImporter, ShiftDataImporterImpl, SpeedTableImport};
use shift_analytics::{i18n, logging, ConfigManager, EngineConfig, EngineConfigReader};
use shift_analytics::ShiftAnalyticsPipeline;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ExportFormat::Json,
            OutputFormat::Csv => ExportFormat::Csv,
        }
    }
}

/// 产线事件日志 → 班次产量/效率/停机分析报告
#[derive(Parser, Debug)]
#[command(name = "shift-analytics", version)]
struct Args {
    /// 事件日志文件（.xlsx/.xls/.csv），可指定多个
    #[arg(long, required = true, num_args = 1..)]
    events: Vec<PathBuf>,

    /// 标准速度表文件；缺省时全部速度按缺失处理
    #[arg(long)]
    speeds: Option<PathBuf>,

    /// 生产日（YYYY-MM-DD）；缺省取数据中最早的生产日
    #[arg(long)]
    day: Option<NaiveDate>,

    /// 配置数据库（config_kv 表）；缺省使用内置默认值
    #[arg(long)]
    config_db: Option<PathBuf>,

    /// 输出路径：json 为文件，csv 为目录
    #[arg(long, short)]
    output: PathBuf,

    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// 标签语言（pt-BR / en）
    #[arg(long, default_value = i18n::DEFAULT_LOCALE)]
    locale: String,

    /// JSON 格式日志
    #[arg(long)]
    json_log: bool,
}

async fn load_config(config_db: Option<&PathBuf>) -> Result<EngineConfig> {
    let Some(path) = config_db else {
        return Ok(EngineConfig::default());
    };
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow!("配置数据库路径无效: {}", path.display()))?;
    let manager = ConfigManager::new(path_str).map_err(|e| anyhow!("配置数据库打开失败: {}", e))?;
    manager
        .load_engine_config()
        .await
        .map_err(|e| anyhow!("配置加载失败: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.json_log {
        logging::init_json();
    } else {
        logging::init();
    }
    i18n::set_locale(&args.locale);

    info!("==================================================");
    info!("{} v{}", shift_analytics::APP_NAME, shift_analytics::VERSION);
    info!("==================================================");

    let config = load_config(args.config_db.as_ref()).await?;
    let importer = ShiftDataImporterImpl::default();

    // 事件日志与速度表并发导入
    let speeds_future = async {
        match &args.speeds {
            Some(path) => importer.import_speed_table(path).await.map(Some),
            None => Ok(None),
        }
    };
    let (events, speeds) = tokio::join!(importer.import_event_files(args.events.clone()), speeds_future);
    let mut dataset = events.context("事件日志导入失败")?;
    let speeds = speeds.context("速度表导入失败")?;

    let SpeedTableImport {
        table: speed_table,
        diagnostics: speed_diagnostics,
        ..
    } = match speeds {
        Some(import) => import,
        None => {
            warn!("未指定速度表，全部速度按缺失处理");
            SpeedTableImport {
                diagnostics: vec![Diagnostic::new(
                    DiagnosticLevel::Error,
                    DiagnosticCode::MissingInput,
                    "未提供标准速度表",
                )],
                ..Default::default()
            }
        }
    };
    dataset.diagnostics.extend(speed_diagnostics);

    let pipeline = ShiftAnalyticsPipeline::new(config);
    let report = pipeline.run_dataset(dataset, &speed_table, args.day);

    let written = ReportWriter::new(args.format.into())
        .write(&report, &args.output)
        .context("报告导出失败")?;
    for path in &written {
        let shown = path.display().to_string();
        info!("{}", i18n::t_with_args("export.written", &[("path", shown.as_str())]));
    }

    if report.diagnostics.has_errors() {
        warn!(
            errors = report
                .diagnostics
                .entries
                .iter()
                .filter(|d| d.level == DiagnosticLevel::Error)
                .count(),
            "分析完成，但存在错误级诊断"
        );
    }
    Ok(())
}
