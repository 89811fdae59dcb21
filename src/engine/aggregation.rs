// ==========================================
// 班次绩效分析引擎 - 聚合引擎
// ==========================================
// 输入: 选定生产日内已归一的事件 + 补全后的速度表
// 输出:
// - ShiftSummary: (center, shift, day) 班次汇总
// - StopDetail:   (center, shift, day, reason) 停机明细
// 红线:
// - 所有比值在分母为 0 时为未定义（None），不产生 NaN/Inf
// - 效率裁剪至 [0, cap]
// - 速度修正每个班次汇总行只应用一次
// ==========================================

use crate::config::EngineConfig;
use crate::domain::event::NormalizedEvent;
use crate::domain::report::{Diagnostic, DiagnosticCode};
use crate::domain::speed::{SpeedKey, SpeedTable};
use crate::domain::summary::{ShiftSummary, StopDetail};
use crate::domain::types::{DiagnosticLevel, RecordKind, Shift};
use crate::engine::time_window::shift_duration_hours;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument, warn};

type ShiftKey = (String, Shift, NaiveDate);

/// 小时 → "HH:MM"（分钟四舍五入）
pub fn hours_to_hhmm(hours: f64) -> String {
    if !hours.is_finite() {
        return String::new();
    }
    let total_minutes = (hours * 60.0).round().max(0.0) as i64;
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// 安全除法：分母 ≤ 0 或结果非有限 → None
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator).filter(|v| v.is_finite())
    } else {
        None
    }
}

/// 效率裁剪至 [0, cap]
pub fn clip_efficiency(value: Option<f64>, cap: f64) -> Option<f64> {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, cap))
}

// ==========================================
// 聚合结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AggregationOutcome {
    pub shift_summaries: Vec<ShiftSummary>,
    pub stop_details: Vec<StopDetail>,
    pub missing_speed_groups: usize,
    pub unmatched_speed_keys: Vec<String>,
    pub speed_floor_applied: usize,
    pub diagnostics: Vec<Diagnostic>,
}

// 生产分组 (center, shift, day, speedKey, item) 的累计值
struct ProductionGroup {
    quantity: f64,
}

// ==========================================
// AggregationEngine
// ==========================================
pub struct AggregationEngine<'a> {
    config: &'a EngineConfig,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// 聚合班次汇总与停机明细
    #[instrument(skip(self, events, speed_table), fields(count = events.len()))]
    pub fn aggregate(&self, events: &[NormalizedEvent], speed_table: &SpeedTable) -> AggregationOutcome {
        let mut outcome = AggregationOutcome::default();

        // ===== 停机明细 / 停机跨度 =====
        let stop_details = self.build_stop_details(events);
        let mut stop_span_minutes: BTreeMap<ShiftKey, f64> = BTreeMap::new();
        for e in events.iter().filter(|e| e.raw.kind == RecordKind::StopReport) {
            *stop_span_minutes
                .entry((e.raw.center.clone(), e.shift, e.production_day))
                .or_insert(0.0) += e.span_minutes;
        }

        let mut mandatory_hours: BTreeMap<ShiftKey, f64> = BTreeMap::new();
        for detail in stop_details
            .iter()
            .filter(|d| self.config.is_mandatory_stop(&d.reason))
        {
            *mandatory_hours
                .entry((detail.center.clone(), detail.shift, detail.production_day))
                .or_insert(0.0) += detail.stop_hours;
        }

        // ===== 生产分组 =====
        let mut groups: BTreeMap<(ShiftKey, Option<SpeedKey>, String), ProductionGroup> =
            BTreeMap::new();
        let mut items: BTreeMap<ShiftKey, BTreeSet<String>> = BTreeMap::new();
        for e in events.iter().filter(|e| e.raw.kind == RecordKind::Production) {
            let shift_key = (e.raw.center.clone(), e.shift, e.production_day);
            let group = groups
                .entry((shift_key.clone(), e.raw.speed_key(), e.raw.item.clone()))
                .or_insert(ProductionGroup { quantity: 0.0 });
            group.quantity += e.raw.approved_quantity.unwrap_or(0.0);

            let item = e.raw.item.trim();
            if !item.is_empty() {
                items.entry(shift_key).or_default().insert(item.to_string());
            }
        }

        // ===== 分组速度查找 =====
        // 无匹配速度的分组计数，并以 0 参与班次均值
        let mut per_shift: BTreeMap<ShiftKey, (f64, Vec<f64>)> = BTreeMap::new();
        let mut unmatched: BTreeSet<String> = BTreeSet::new();
        for ((shift_key, speed_key, _item), group) in groups {
            let speed = match speed_key.as_ref().and_then(|k| speed_table.get(k)) {
                Some(v) => v,
                None => {
                    outcome.missing_speed_groups += 1;
                    let label = match &speed_key {
                        Some(k) => k.to_string(),
                        None => format!("{}-", shift_key.0),
                    };
                    unmatched.insert(label);
                    0.0
                }
            };
            let entry = per_shift.entry(shift_key).or_insert((0.0, Vec::new()));
            entry.0 += group.quantity;
            entry.1.push(speed);
        }

        if !unmatched.is_empty() {
            warn!(
                missing_groups = outcome.missing_speed_groups,
                keys = ?unmatched,
                "部分生产分组在速度表中无匹配，按速度 0 计入均值"
            );
            for key in &unmatched {
                outcome.diagnostics.push(Diagnostic::new(
                    DiagnosticLevel::Warning,
                    DiagnosticCode::UnresolvableSpeed,
                    format!("速度键 {} 无匹配", key),
                ));
            }
        }
        outcome.unmatched_speed_keys = unmatched.into_iter().collect();

        // ===== 班次汇总 =====
        for (shift_key, (produced, speeds)) in per_shift {
            let (center, shift, day) = shift_key.clone();
            let stop_minutes = stop_span_minutes.get(&shift_key).copied().unwrap_or(0.0);
            let mandatory = mandatory_hours.get(&shift_key).copied().unwrap_or(0.0);
            let item_list = items
                .remove(&shift_key)
                .map(|s| s.into_iter().collect())
                .unwrap_or_default();

            let summary = self.summarize_shift(
                center,
                shift,
                day,
                produced,
                &speeds,
                stop_minutes,
                mandatory,
                item_list,
                &mut outcome,
            );
            outcome.shift_summaries.push(summary);
        }

        outcome.stop_details = stop_details;

        debug!(
            shift_rows = outcome.shift_summaries.len(),
            stop_rows = outcome.stop_details.len(),
            missing_speed_groups = outcome.missing_speed_groups,
            speed_floor_applied = outcome.speed_floor_applied,
            "聚合完成"
        );
        outcome
    }

    /// 停机明细：按 (center, shift, day, reason) 汇总归一后的停机分钟，降序
    fn build_stop_details(&self, events: &[NormalizedEvent]) -> Vec<StopDetail> {
        let mut totals: BTreeMap<(ShiftKey, String), f64> = BTreeMap::new();
        for e in events.iter().filter(|e| e.raw.kind == RecordKind::StopReport) {
            *totals
                .entry((
                    (e.raw.center.clone(), e.shift, e.production_day),
                    e.raw.stop_reason.trim().to_string(),
                ))
                .or_insert(0.0) += e.stop_minutes;
        }

        let mut details: Vec<StopDetail> = totals
            .into_iter()
            .map(|(((center, shift, production_day), reason), minutes)| {
                let hours = minutes / 60.0;
                StopDetail {
                    center,
                    shift,
                    production_day,
                    reason,
                    stop_minutes: minutes,
                    stop_hours: hours,
                    formatted: hours_to_hhmm(hours),
                }
            })
            .collect();

        // 稳定排序，同值保持键序
        details.sort_by(|a, b| b.stop_minutes.total_cmp(&a.stop_minutes));
        details
    }

    #[allow(clippy::too_many_arguments)]
    fn summarize_shift(
        &self,
        center: String,
        shift: Shift,
        production_day: NaiveDate,
        produced: f64,
        speeds: &[f64],
        stop_minutes: f64,
        mandatory_stop_hours: f64,
        items: Vec<String>,
        outcome: &mut AggregationOutcome,
    ) -> ShiftSummary {
        let cap = self.config.efficiency_cap;

        // 标准速度: 均值 → 中心修正 → 兜底
        let mut speed = if speeds.is_empty() {
            0.0
        } else {
            speeds.iter().sum::<f64>() / speeds.len() as f64
        };
        if center == self.config.speed_correction_center {
            speed *= self.config.speed_correction_factor;
        }
        let speed_floor_applied = speed <= 0.0;
        if speed_floor_applied {
            speed = self.config.fallback_speed;
            outcome.speed_floor_applied += 1;
            warn!(
                center = %center,
                shift = %shift,
                day = %production_day,
                fallback = speed,
                "标准速度为 0 或负值，已替换为兜底速度"
            );
            outcome.diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Warning,
                DiagnosticCode::SpeedFloorApplied,
                format!(
                    "{} {} {}: 标准速度 ≤ 0，使用兜底速度 {}",
                    center, shift, production_day, speed
                ),
            ));
        }

        let stop_hours = stop_minutes / 60.0;
        let duration = shift_duration_hours(production_day, shift);
        let net_time_hours = (duration - stop_hours).max(0.0);
        let available_time_hours = (duration - mandatory_stop_hours).max(0.0);

        let expected_production = speed * net_time_hours;
        let expected_production_adjusted = speed * available_time_hours;

        let real_speed = safe_ratio(produced, net_time_hours);
        if real_speed.is_none() {
            outcome.diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Info,
                DiagnosticCode::DegenerateDivision,
                format!("{} {} {}: 净时间为 0，实际速度与效率未定义", center, shift, production_day),
            ));
        }

        let efficiency_pct = clip_efficiency(
            real_speed.and_then(|real| safe_ratio(real, speed)).map(|r| r * 100.0),
            cap,
        );
        let efficiency_general_pct = clip_efficiency(
            safe_ratio(produced, expected_production).map(|r| r * 100.0),
            cap,
        );
        let efficiency_adjusted_pct = clip_efficiency(
            safe_ratio(produced, expected_production_adjusted).map(|r| r * 100.0),
            cap,
        );

        ShiftSummary {
            center,
            shift,
            production_day,
            produced,
            standard_speed_avg: speed,
            real_speed,
            stop_minutes,
            stop_hours,
            mandatory_stop_hours,
            shift_duration_hours: duration,
            net_time_hours,
            available_time_hours,
            expected_production,
            expected_production_adjusted,
            efficiency_pct,
            efficiency_general_pct,
            efficiency_adjusted_pct,
            speed_floor_applied,
            items,
        }
    }
}
