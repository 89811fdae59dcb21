// ==========================================
// 班次绩效分析引擎 - 运行报告与诊断
// ==========================================
// 职责: 汇总一次分析运行的全部输出
// 红线: 引擎内异常只记录为诊断，不终止流水线
// ==========================================

use crate::domain::speed::SpeedTable;
use crate::domain::summary::{
    CenterSummary, OverallSummary, Rankings, ShiftSummary, ShiftTotals, StopDetail,
    StopReasonTotal,
};
use crate::domain::types::{DiagnosticLevel, DurationUnit};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 每种诊断代码最多保留的明细条数（计数不受限）
pub const MAX_ENTRIES_PER_CODE: usize = 50;

// ==========================================
// 诊断代码
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    MissingInput,       // 必需列或数据集缺失
    UnresolvableSpeed,  // 速度键在速度表中无匹配
    UnparsableValue,    // 数值/日期无法解析，按 0 或缺失处理
    DegenerateDivision, // 分母为 0，比值未定义
    SpeedFloorApplied,  // 标准速度 ≤ 0，已替换兜底速度
    DuplicateSpeedKey,  // 速度表重复键，保留首个
    RouteAutoAssigned,  // 回退规则补全路线
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticCode::MissingInput => "MISSING_INPUT",
            DiagnosticCode::UnresolvableSpeed => "UNRESOLVABLE_SPEED",
            DiagnosticCode::UnparsableValue => "UNPARSABLE_VALUE",
            DiagnosticCode::DegenerateDivision => "DEGENERATE_DIVISION",
            DiagnosticCode::SpeedFloorApplied => "SPEED_FLOOR_APPLIED",
            DiagnosticCode::DuplicateSpeedKey => "DUPLICATE_SPEED_KEY",
            DiagnosticCode::RouteAutoAssigned => "ROUTE_AUTO_ASSIGNED",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: DiagnosticCode,
    pub row_number: Option<usize>, // 源文件行号（可选）
    pub message: String,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            level,
            code,
            row_number: None,
            message: message.into(),
        }
    }

    pub fn at_row(mut self, row_number: usize) -> Self {
        self.row_number = Some(row_number);
        self
    }
}

// ==========================================
// RuleApplication - 单条回退规则的执行结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleApplication {
    pub rule: String,
    pub events_touched: usize,
    pub keys_inserted: Vec<String>,
}

// ==========================================
// RunDiagnostics - 计数器 + 诊断明细
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    pub missing_speed_groups: usize,        // 无速度匹配的生产分组数
    pub unmatched_speed_keys: Vec<String>,  // 无匹配的速度键（去重）
    pub auto_routed_events: usize,          // 回退规则补全的事件数
    pub speed_floor_applied: usize,         // 兜底速度替换次数
    pub unparsable_values: usize,           // 无法解析的数值（按 0 处理）
    pub non_line_events_dropped: usize,     // 非产线（前缀不匹配）事件
    pub events_outside_day: usize,          // 不属于选定生产日的事件
    pub events_without_timestamp: usize,    // 缺少开始时间的事件
    pub entries: Vec<Diagnostic>,
    #[serde(skip)]
    per_code: BTreeMap<DiagnosticCode, usize>,
}

impl RunDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条诊断；同一代码超过上限后只计数不保留明细
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let count = self.per_code.entry(diagnostic.code).or_insert(0);
        *count += 1;
        if *count <= MAX_ENTRIES_PER_CODE {
            self.entries.push(diagnostic);
        }
    }

    /// 合并导入阶段的诊断
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for d in diagnostics {
            self.push(d);
        }
    }

    /// 某代码累计出现次数（含被截断的明细）
    pub fn count_of(&self, code: DiagnosticCode) -> usize {
        self.per_code.get(&code).copied().unwrap_or(0)
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }
}

// ==========================================
// AnalyticsReport - 单次运行完整输出
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub production_day: Option<NaiveDate>,
    pub duration_unit: DurationUnit,

    pub shift_summaries: Vec<ShiftSummary>,
    pub stop_details: Vec<StopDetail>,
    pub center_summaries: Vec<CenterSummary>,
    pub rankings: Rankings,
    pub overall: OverallSummary,
    pub shift_totals: Vec<ShiftTotals>,
    pub stop_reason_totals: Vec<StopReasonTotal>,

    pub speed_table: SpeedTable, // 补全后的速度表（本次运行副本）
    pub rule_applications: Vec<RuleApplication>,
    pub diagnostics: RunDiagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_caps_entries_but_keeps_count() {
        let mut diagnostics = RunDiagnostics::new();
        for row in 0..(MAX_ENTRIES_PER_CODE + 10) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticLevel::Warning,
                    DiagnosticCode::UnparsableValue,
                    "Qtd Aprovada: 'abc'",
                )
                .at_row(row),
            );
        }
        diagnostics.push(Diagnostic::new(
            DiagnosticLevel::Error,
            DiagnosticCode::MissingInput,
            "missing",
        ));

        assert_eq!(diagnostics.entries.len(), MAX_ENTRIES_PER_CODE + 1);
        assert_eq!(
            diagnostics.count_of(DiagnosticCode::UnparsableValue),
            MAX_ENTRIES_PER_CODE + 10
        );
        assert!(diagnostics.has_errors());
    }
}
