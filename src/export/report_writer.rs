// ==========================================
// 班次绩效分析引擎 - 报告导出
// ==========================================
// JSON: 完整 AnalyticsReport（serde_json）
// CSV: 班次汇总 / 停机明细 / 中心汇总 / 排名 / 诊断 各一张表
// 班次与等级标签按当前语言翻译；未定义的比值输出为空单元格
// ==========================================

use crate::domain::report::{AnalyticsReport, Diagnostic};
use crate::domain::summary::{CenterSummary, RankingEntry, ShiftSummary, StopDetail};
use crate::i18n::{band_label, shift_label};
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("文件写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("导出格式不支持: {0}（仅支持 json/csv）")]
    UnsupportedFormat(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

// ==========================================
// CSV 表头
// ==========================================
pub const SHIFT_SUMMARY_HEADER: [&str; 19] = [
    "center",
    "shift",
    "production_day",
    "produced",
    "standard_speed_avg",
    "real_speed",
    "stop_minutes",
    "stop_hours",
    "mandatory_stop_hours",
    "shift_duration_hours",
    "net_time_hours",
    "available_time_hours",
    "expected_production",
    "expected_production_adjusted",
    "efficiency_pct",
    "efficiency_general_pct",
    "efficiency_adjusted_pct",
    "speed_floor_applied",
    "items",
];

pub const STOP_DETAIL_HEADER: [&str; 7] = [
    "center",
    "shift",
    "production_day",
    "reason",
    "stop_minutes",
    "stop_hours",
    "formatted",
];

pub const CENTER_SUMMARY_HEADER: [&str; 13] = [
    "center",
    "band",
    "produced_total",
    "stop_hours_total",
    "net_time_hours_total",
    "expected_production_total",
    "expected_production_adjusted_total",
    "efficiency_mean",
    "efficiency_general_mean",
    "efficiency_adjusted_mean",
    "standard_speed_mean",
    "real_speed_mean",
    "top_stop_reasons",
];

pub const RANKING_HEADER: [&str; 7] = [
    "ranking",
    "position",
    "center",
    "shift",
    "production_day",
    "produced",
    "efficiency_pct",
];

pub const DIAGNOSTIC_HEADER: [&str; 4] = ["level", "code", "row_number", "message"];

fn num(value: f64) -> String {
    format!("{:.2}", value)
}

fn opt_num(value: Option<f64>) -> String {
    value.map(num).unwrap_or_default()
}

// ==========================================
// 行转换
// ==========================================
trait ToRow {
    fn to_row(&self) -> Vec<String>;
}

impl ToRow for ShiftSummary {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.center.clone(),
            shift_label(self.shift),
            self.production_day.to_string(),
            num(self.produced),
            num(self.standard_speed_avg),
            opt_num(self.real_speed),
            num(self.stop_minutes),
            num(self.stop_hours),
            num(self.mandatory_stop_hours),
            num(self.shift_duration_hours),
            num(self.net_time_hours),
            num(self.available_time_hours),
            num(self.expected_production),
            num(self.expected_production_adjusted),
            opt_num(self.efficiency_pct),
            opt_num(self.efficiency_general_pct),
            opt_num(self.efficiency_adjusted_pct),
            self.speed_floor_applied.to_string(),
            self.items.join(" | "),
        ]
    }
}

impl ToRow for StopDetail {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.center.clone(),
            shift_label(self.shift),
            self.production_day.to_string(),
            self.reason.clone(),
            num(self.stop_minutes),
            num(self.stop_hours),
            self.formatted.clone(),
        ]
    }
}

impl ToRow for CenterSummary {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.center.clone(),
            band_label(self.band),
            num(self.produced_total),
            num(self.stop_hours_total),
            num(self.net_time_hours_total),
            num(self.expected_production_total),
            num(self.expected_production_adjusted_total),
            opt_num(self.efficiency_mean),
            opt_num(self.efficiency_general_mean),
            opt_num(self.efficiency_adjusted_mean),
            opt_num(self.standard_speed_mean),
            opt_num(self.real_speed_mean),
            self.top_stop_reasons.clone(),
        ]
    }
}

impl ToRow for Diagnostic {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.level.to_string(),
            self.code.to_string(),
            self.row_number.map(|n| n.to_string()).unwrap_or_default(),
            self.message.clone(),
        ]
    }
}

fn ranking_row(ranking: &str, entry: &RankingEntry) -> Vec<String> {
    vec![
        ranking.to_string(),
        entry.position.to_string(),
        entry.center.clone(),
        shift_label(entry.shift),
        entry.production_day.to_string(),
        num(entry.produced),
        opt_num(entry.efficiency_pct),
    ]
}

fn write_table<W: Write, R: ToRow>(writer: W, header: &[&str], rows: &[R]) -> ExportResult<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(&row.to_row())?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_shift_summaries<W: Write>(writer: W, rows: &[ShiftSummary]) -> ExportResult<()> {
    write_table(writer, &SHIFT_SUMMARY_HEADER, rows)
}

pub fn write_stop_details<W: Write>(writer: W, rows: &[StopDetail]) -> ExportResult<()> {
    write_table(writer, &STOP_DETAIL_HEADER, rows)
}

pub fn write_center_summaries<W: Write>(writer: W, rows: &[CenterSummary]) -> ExportResult<()> {
    write_table(writer, &CENTER_SUMMARY_HEADER, rows)
}

pub fn write_diagnostics<W: Write>(writer: W, rows: &[Diagnostic]) -> ExportResult<()> {
    write_table(writer, &DIAGNOSTIC_HEADER, rows)
}

/// 四个排名合并为一张表，首列区分排名类型
pub fn write_rankings<W: Write>(writer: W, report: &AnalyticsReport) -> ExportResult<()> {
    let rankings = &report.rankings;
    let sections: [(&str, &Vec<RankingEntry>); 4] = [
        ("efficiency_top", &rankings.efficiency_top),
        ("efficiency_bottom", &rankings.efficiency_bottom),
        ("production_top", &rankings.production_top),
        ("production_bottom", &rankings.production_bottom),
    ];

    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(RANKING_HEADER)?;
    for (name, entries) in sections {
        for entry in entries {
            wtr.write_record(&ranking_row(name, entry))?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(writer: W, report: &AnalyticsReport) -> ExportResult<()> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

// ==========================================
// ReportWriter - 写入文件系统
// ==========================================
pub struct ReportWriter {
    format: ExportFormat,
}

impl ReportWriter {
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// 写出报告
    ///
    /// # 参数
    /// - report: 分析报告
    /// - output: json → 目标文件；csv → 目标目录（不存在则创建）
    ///
    /// # 返回
    /// - 已写入的文件列表
    #[instrument(skip(self, report), fields(format = %self.format, run_id = %report.run_id))]
    pub fn write(&self, report: &AnalyticsReport, output: &Path) -> ExportResult<Vec<PathBuf>> {
        let written = match self.format {
            ExportFormat::Json => {
                if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                write_json(File::create(output)?, report)?;
                vec![output.to_path_buf()]
            }
            ExportFormat::Csv => {
                fs::create_dir_all(output)?;
                let shift_path = output.join("shift_summaries.csv");
                let stop_path = output.join("stop_details.csv");
                let center_path = output.join("center_summaries.csv");
                let ranking_path = output.join("rankings.csv");
                let diagnostic_path = output.join("diagnostics.csv");

                write_shift_summaries(File::create(&shift_path)?, &report.shift_summaries)?;
                write_stop_details(File::create(&stop_path)?, &report.stop_details)?;
                write_center_summaries(File::create(&center_path)?, &report.center_summaries)?;
                write_rankings(File::create(&ranking_path)?, report)?;
                write_diagnostics(File::create(&diagnostic_path)?, &report.diagnostics.entries)?;

                vec![shift_path, stop_path, center_path, ranking_path, diagnostic_path]
            }
        };

        info!(files = written.len(), "报告导出完成");
        Ok(written)
    }
}
