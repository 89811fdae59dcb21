// ==========================================
// 班次绩效分析引擎 - 汇总引擎 (Rollups)
// ==========================================
// 只读消费 ShiftSummary / StopDetail，产出:
// - 工作中心汇总（含效率分级与最大停机原因）
// - 全局汇总
// - 按班次合计、按停机原因合计
// ==========================================

use crate::config::EngineConfig;
use crate::domain::summary::{
    CenterSummary, OverallSummary, ShiftSummary, ShiftTotals, StopDetail, StopReasonTotal,
};
use crate::domain::types::{EfficiencyBand, Shift};
use crate::engine::aggregation::hours_to_hhmm;
use std::collections::BTreeMap;
use tracing::instrument;

/// 有定义值的简单均值；全部未定义 → None
pub fn mean_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub struct RollupEngine<'a> {
    config: &'a EngineConfig,
}

impl<'a> RollupEngine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    // ==========================================
    // 工作中心汇总
    // ==========================================

    /// 按工作中心汇总班次行
    #[instrument(skip(self, summaries, stop_details), fields(count = summaries.len()))]
    pub fn center_summaries(
        &self,
        summaries: &[ShiftSummary],
        stop_details: &[StopDetail],
    ) -> Vec<CenterSummary> {
        let top_reasons = self.top_stop_reasons(stop_details);

        let mut by_center: BTreeMap<&str, Vec<&ShiftSummary>> = BTreeMap::new();
        for s in summaries {
            by_center.entry(s.center.as_str()).or_default().push(s);
        }

        by_center
            .into_iter()
            .map(|(center, rows)| {
                let efficiency_adjusted_mean =
                    mean_defined(rows.iter().map(|r| r.efficiency_adjusted_pct));
                CenterSummary {
                    center: center.to_string(),
                    band: EfficiencyBand::classify(
                        efficiency_adjusted_mean,
                        self.config.band_excellent_threshold,
                        self.config.band_good_threshold,
                    ),
                    produced_total: rows.iter().map(|r| r.produced).sum(),
                    stop_hours_total: rows.iter().map(|r| r.stop_hours).sum(),
                    net_time_hours_total: rows.iter().map(|r| r.net_time_hours).sum(),
                    expected_production_total: rows.iter().map(|r| r.expected_production).sum(),
                    expected_production_adjusted_total: rows
                        .iter()
                        .map(|r| r.expected_production_adjusted)
                        .sum(),
                    efficiency_mean: mean_defined(rows.iter().map(|r| r.efficiency_pct)),
                    efficiency_general_mean: mean_defined(
                        rows.iter().map(|r| r.efficiency_general_pct),
                    ),
                    efficiency_adjusted_mean,
                    standard_speed_mean: mean_defined(
                        rows.iter().map(|r| Some(r.standard_speed_avg)),
                    ),
                    real_speed_mean: mean_defined(rows.iter().map(|r| r.real_speed)),
                    top_stop_reasons: top_reasons.get(center).cloned().unwrap_or_default(),
                }
            })
            .collect()
    }

    /// 每个工作中心的最大 N 个停机原因（跨班次合并）
    ///
    /// # 返回
    /// - center → "REASON (HH:MM) | REASON (HH:MM)"
    pub fn top_stop_reasons(&self, stop_details: &[StopDetail]) -> BTreeMap<String, String> {
        let mut minutes: BTreeMap<(&str, &str), f64> = BTreeMap::new();
        for d in stop_details {
            *minutes
                .entry((d.center.as_str(), d.reason.as_str()))
                .or_insert(0.0) += d.stop_minutes;
        }

        let mut per_center: BTreeMap<&str, Vec<(&str, f64)>> = BTreeMap::new();
        for ((center, reason), total) in minutes {
            per_center.entry(center).or_default().push((reason, total));
        }

        per_center
            .into_iter()
            .map(|(center, mut reasons)| {
                reasons.sort_by(|a, b| b.1.total_cmp(&a.1));
                let text = reasons
                    .iter()
                    .take(self.config.top_stop_reasons)
                    .map(|(reason, total)| format!("{} ({})", reason, hours_to_hhmm(total / 60.0)))
                    .collect::<Vec<_>>()
                    .join(" | ");
                (center.to_string(), text)
            })
            .collect()
    }

    // ==========================================
    // 全局汇总
    // ==========================================

    pub fn overall(&self, summaries: &[ShiftSummary]) -> OverallSummary {
        OverallSummary {
            produced_total: summaries.iter().map(|s| s.produced).sum(),
            net_time_hours_total: summaries.iter().map(|s| s.net_time_hours).sum(),
            stop_hours_total: summaries.iter().map(|s| s.stop_hours).sum(),
            expected_production_total: summaries.iter().map(|s| s.expected_production).sum(),
            expected_production_adjusted_total: summaries
                .iter()
                .map(|s| s.expected_production_adjusted)
                .sum(),
            efficiency_mean: mean_defined(summaries.iter().map(|s| s.efficiency_pct)),
            efficiency_adjusted_mean: mean_defined(
                summaries.iter().map(|s| s.efficiency_adjusted_pct),
            ),
        }
    }

    // ==========================================
    // 图表数据
    // ==========================================

    /// 按班次合计
    pub fn shift_totals(&self, summaries: &[ShiftSummary]) -> Vec<ShiftTotals> {
        let mut by_shift: BTreeMap<Shift, Vec<&ShiftSummary>> = BTreeMap::new();
        for s in summaries {
            by_shift.entry(s.shift).or_default().push(s);
        }

        by_shift
            .into_iter()
            .map(|(shift, rows)| ShiftTotals {
                shift,
                produced_total: rows.iter().map(|r| r.produced).sum(),
                efficiency_mean: mean_defined(rows.iter().map(|r| r.efficiency_pct)),
                stop_hours_total: rows.iter().map(|r| r.stop_hours).sum(),
            })
            .collect()
    }

    /// 按停机原因合计（全部工作中心），小时降序
    pub fn stop_reason_totals(&self, stop_details: &[StopDetail]) -> Vec<StopReasonTotal> {
        let mut by_reason: BTreeMap<&str, f64> = BTreeMap::new();
        for d in stop_details {
            *by_reason.entry(d.reason.as_str()).or_insert(0.0) += d.stop_hours;
        }

        let mut totals: Vec<StopReasonTotal> = by_reason
            .into_iter()
            .map(|(reason, hours)| StopReasonTotal {
                reason: reason.to_string(),
                stop_hours: hours,
                formatted: hours_to_hhmm(hours),
            })
            .collect();
        totals.sort_by(|a, b| b.stop_hours.total_cmp(&a.stop_hours));
        totals
    }
}
