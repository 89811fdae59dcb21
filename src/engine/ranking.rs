// ==========================================
// 班次绩效分析引擎 - 排名引擎
// ==========================================
// 按效率 / 产量对班次行排名，取前 N 与后 N
// 指标未定义的行不参与排名；同值保持 (center, shift, day) 行序
// ==========================================

use crate::domain::summary::{RankingEntry, Rankings, ShiftSummary};
use std::cmp::Ordering;

/// 排名指标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingMetric {
    Efficiency, // efficiency_pct
    Produced,   // produced
}

impl RankingMetric {
    fn value_of(&self, summary: &ShiftSummary) -> Option<f64> {
        match self {
            RankingMetric::Efficiency => summary.efficiency_pct,
            RankingMetric::Produced => Some(summary.produced),
        }
        .filter(|v| v.is_finite())
    }
}

pub struct RankingEngine {
    size: usize,
}

impl RankingEngine {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// 前 N（降序）
    pub fn top(&self, summaries: &[ShiftSummary], metric: RankingMetric) -> Vec<RankingEntry> {
        self.ranked(summaries, metric, |a, b| b.total_cmp(a))
    }

    /// 后 N（升序）
    pub fn bottom(&self, summaries: &[ShiftSummary], metric: RankingMetric) -> Vec<RankingEntry> {
        self.ranked(summaries, metric, |a, b| a.total_cmp(b))
    }

    /// 全部四组排名
    pub fn rank_all(&self, summaries: &[ShiftSummary]) -> Rankings {
        Rankings {
            efficiency_top: self.top(summaries, RankingMetric::Efficiency),
            efficiency_bottom: self.bottom(summaries, RankingMetric::Efficiency),
            production_top: self.top(summaries, RankingMetric::Produced),
            production_bottom: self.bottom(summaries, RankingMetric::Produced),
        }
    }

    fn ranked<F>(&self, summaries: &[ShiftSummary], metric: RankingMetric, order: F) -> Vec<RankingEntry>
    where
        F: Fn(&f64, &f64) -> Ordering,
    {
        let mut rows: Vec<(&ShiftSummary, f64)> = summaries
            .iter()
            .filter_map(|s| metric.value_of(s).map(|v| (s, v)))
            .collect();

        // 稳定排序前先固定行序
        rows.sort_by(|(a, _), (b, _)| {
            (a.center.as_str(), a.shift, a.production_day).cmp(&(
                b.center.as_str(),
                b.shift,
                b.production_day,
            ))
        });
        rows.sort_by(|(_, a), (_, b)| order(a, b));

        rows.into_iter()
            .take(self.size)
            .enumerate()
            .map(|(idx, (s, _))| RankingEntry {
                position: idx + 1,
                center: s.center.clone(),
                shift: s.shift,
                production_day: s.production_day,
                produced: s.produced,
                efficiency_pct: s.efficiency_pct,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Shift;
    use chrono::NaiveDate;

    fn make_summary(center: &str, produced: f64, eff: Option<f64>) -> ShiftSummary {
        ShiftSummary {
            center: center.to_string(),
            shift: Shift::Shift1,
            production_day: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            produced,
            standard_speed_avg: 1000.0,
            real_speed: None,
            stop_minutes: 0.0,
            stop_hours: 0.0,
            mandatory_stop_hours: 0.0,
            shift_duration_hours: 8.0,
            net_time_hours: 8.0,
            available_time_hours: 8.0,
            expected_production: 8000.0,
            expected_production_adjusted: 8000.0,
            efficiency_pct: eff,
            efficiency_general_pct: eff,
            efficiency_adjusted_pct: eff,
            speed_floor_applied: false,
            items: vec![],
        }
    }

    #[test]
    fn test_efficiency_ranking_excludes_undefined() {
        let engine = RankingEngine::new(3);
        let rows = vec![
            make_summary("CA01", 10.0, Some(50.0)),
            make_summary("CA02", 20.0, None),
            make_summary("CA03", 30.0, Some(120.0)),
            make_summary("CA04", 40.0, Some(80.0)),
            make_summary("CA05", 50.0, Some(10.0)),
        ];

        let top = engine.top(&rows, RankingMetric::Efficiency);
        let centers: Vec<&str> = top.iter().map(|e| e.center.as_str()).collect();
        assert_eq!(centers, vec!["CA03", "CA04", "CA01"]);
        assert_eq!(top[0].position, 1);

        let bottom = engine.bottom(&rows, RankingMetric::Efficiency);
        let centers: Vec<&str> = bottom.iter().map(|e| e.center.as_str()).collect();
        assert_eq!(centers, vec!["CA05", "CA01", "CA04"]);
    }

    #[test]
    fn test_ties_keep_row_order() {
        let engine = RankingEngine::new(2);
        let rows = vec![
            make_summary("CA09", 100.0, None),
            make_summary("CA02", 100.0, None),
            make_summary("CA05", 100.0, None),
        ];
        let top = engine.top(&rows, RankingMetric::Produced);
        let centers: Vec<&str> = top.iter().map(|e| e.center.as_str()).collect();
        assert_eq!(centers, vec!["CA02", "CA05"]);
    }

    #[test]
    fn test_fewer_rows_than_size() {
        let engine = RankingEngine::new(3);
        let rows = vec![make_summary("CA01", 1.0, Some(1.0))];
        let rankings = engine.rank_all(&rows);
        assert_eq!(rankings.production_top.len(), 1);
        assert_eq!(rankings.efficiency_bottom.len(), 1);
        assert!(engine.rank_all(&[]).production_top.is_empty());
    }
}
