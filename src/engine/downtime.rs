// ==========================================
// 班次绩效分析引擎 - 停机时长归一化
// ==========================================
// 源数据 "Parada Real Útil" 单位不固定（分钟或小时）
// 整批判定: median > 24 或 max > 48 → 分钟，否则小时
// 逗号作为小数点；无法解析/空值 → 0 并计数（不中断）
// ==========================================

use crate::domain::event::{NormalizedEvent, ShiftEvent};
use crate::domain::report::{Diagnostic, DiagnosticCode};
use crate::domain::types::{DiagnosticLevel, DurationUnit, RecordKind};
use tracing::{debug, instrument, warn};

/// 解析数值文本（接受逗号小数点）
///
/// # 返回
/// - None: 空白、无法解析或非有限值
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// 中位数（偶数个取中间两值均值）
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// 判定整批停机时长单位
///
/// # 参数
/// - values: 本批全部停机记录的解析值
/// - median_threshold / max_threshold: 分钟判定阈值
pub fn classify_unit(values: &[f64], median_threshold: f64, max_threshold: f64) -> DurationUnit {
    let Some(med) = median(values) else {
        return DurationUnit::Hours;
    };
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    if med > median_threshold || max > max_threshold {
        DurationUnit::Minutes
    } else {
        DurationUnit::Hours
    }
}

// ==========================================
// 归一化结果
// ==========================================
#[derive(Debug, Clone)]
pub struct DowntimeOutcome {
    pub events: Vec<NormalizedEvent>,
    pub unit: DurationUnit,
    pub unparsable_values: usize,
    pub diagnostics: Vec<Diagnostic>,
}

// ==========================================
// DowntimeNormalizer
// ==========================================
pub struct DowntimeNormalizer {
    median_threshold: f64,
    max_threshold: f64,
}

impl DowntimeNormalizer {
    pub fn new(median_threshold: f64, max_threshold: f64) -> Self {
        Self {
            median_threshold,
            max_threshold,
        }
    }

    /// 归一化选定生产日的事件
    ///
    /// 未归属生产日或班次的事件被丢弃（调用方应已过滤）
    #[instrument(skip(self, events), fields(count = events.len()))]
    pub fn normalize(&self, events: Vec<ShiftEvent>) -> DowntimeOutcome {
        let mut diagnostics = Vec::new();
        let mut unparsable = 0usize;

        // 解析停机记录的原始时长
        let parsed: Vec<f64> = events
            .iter()
            .map(|e| {
                if e.raw.kind != RecordKind::StopReport {
                    return 0.0;
                }
                match parse_decimal(&e.raw.stop_duration_raw) {
                    Some(v) => v,
                    None => {
                        unparsable += 1;
                        diagnostics.push(
                            Diagnostic::new(
                                DiagnosticLevel::Warning,
                                DiagnosticCode::UnparsableValue,
                                format!(
                                    "Parada Real Útil '{}' 无法解析，按 0 处理",
                                    e.raw.stop_duration_raw
                                ),
                            )
                            .at_row(e.raw.row_number),
                        );
                        0.0
                    }
                }
            })
            .collect();

        let stop_values: Vec<f64> = events
            .iter()
            .zip(parsed.iter())
            .filter(|(e, _)| e.raw.kind == RecordKind::StopReport)
            .map(|(_, v)| *v)
            .collect();
        let unit = classify_unit(&stop_values, self.median_threshold, self.max_threshold);

        debug!(
            stop_records = stop_values.len(),
            unit = %unit,
            "停机时长单位判定完成"
        );
        if unparsable > 0 {
            warn!(unparsable, "存在无法解析的停机时长，已按 0 处理");
        }

        let normalized = events
            .into_iter()
            .zip(parsed)
            .filter_map(|(event, value)| {
                let production_day = event.production_day?;
                let shift = event.shift?;
                let stop_minutes = match unit {
                    DurationUnit::Minutes => value,
                    DurationUnit::Hours => value * 60.0,
                };
                let span_minutes = event.raw.span_minutes();
                Some(NormalizedEvent {
                    raw: event.raw,
                    production_day,
                    shift,
                    span_minutes,
                    stop_minutes,
                    stop_hours: stop_minutes / 60.0,
                })
            })
            .collect();

        DowntimeOutcome {
            events: normalized,
            unit,
            unparsable_values: unparsable,
            diagnostics,
        }
    }
}
