// ==========================================
// 班次绩效分析引擎 - 引擎编排器
// ==========================================
// 主流程（单线程、同步、确定性）:
// 原始事件 → 时间窗口 → 速度解析 → 产线过滤/生产日选择
//          → 停机归一 → 聚合 → 汇总/排名
// 红线: 引擎内任何异常只记诊断，不终止流水线
// ==========================================

use crate::config::EngineConfig;
use crate::domain::event::{EventDataset, RawEvent, ShiftEvent};
use crate::domain::report::{AnalyticsReport, Diagnostic, DiagnosticCode, RunDiagnostics};
use crate::domain::speed::SpeedTable;
use crate::domain::types::{DiagnosticLevel, DurationUnit};
use crate::engine::aggregation::AggregationEngine;
use crate::engine::downtime::DowntimeNormalizer;
use crate::engine::ranking::RankingEngine;
use crate::engine::rollup::RollupEngine;
use crate::engine::speed_resolution::SpeedResolutionEngine;
use crate::engine::time_window::TimeWindowEngine;
use crate::perf::PerfGuard;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ShiftAnalyticsPipeline - 引擎编排器
// ==========================================
pub struct ShiftAnalyticsPipeline {
    config: EngineConfig,
    time_window: TimeWindowEngine,
    speed_resolution: SpeedResolutionEngine,
}

impl ShiftAnalyticsPipeline {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 引擎参数
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            time_window: TimeWindowEngine::new(),
            speed_resolution: SpeedResolutionEngine::new(),
        }
    }

    /// 使用自定义速度解析引擎（自定义回退规则）
    pub fn with_speed_resolution(mut self, engine: SpeedResolutionEngine) -> Self {
        self.speed_resolution = engine;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 对导入结果执行分析（合并导入阶段诊断）
    pub fn run_dataset(
        &self,
        dataset: EventDataset,
        speed_table: &SpeedTable,
        day: Option<NaiveDate>,
    ) -> AnalyticsReport {
        let mut diagnostics = RunDiagnostics::new();
        diagnostics.unparsable_values += dataset.unparsable_values;
        diagnostics.extend(dataset.diagnostics);
        self.run_with_diagnostics(dataset.events, speed_table, day, diagnostics)
    }

    /// 执行完整分析流程
    ///
    /// # 参数
    /// - events: 原始事件
    /// - speed_table: 调用方速度表（只读；本次运行使用其副本）
    /// - day: 选定生产日；None → 数据中最早的生产日
    ///
    /// # 返回
    /// - AnalyticsReport: 空输入时各表为空
    pub fn run(
        &self,
        events: Vec<RawEvent>,
        speed_table: &SpeedTable,
        day: Option<NaiveDate>,
    ) -> AnalyticsReport {
        self.run_with_diagnostics(events, speed_table, day, RunDiagnostics::new())
    }

    #[instrument(skip(self, events, speed_table, diagnostics), fields(count = events.len()))]
    fn run_with_diagnostics(
        &self,
        events: Vec<RawEvent>,
        speed_table: &SpeedTable,
        day: Option<NaiveDate>,
        mut diagnostics: RunDiagnostics,
    ) -> AnalyticsReport {
        let run_id = Uuid::new_v4().to_string();
        let perf = PerfGuard::new("shift_analytics_run", events.len());
        info!(run_id = %run_id, events = events.len(), "开始班次分析");

        // ===== 1. 时间窗口 =====
        let windowed = self.time_window.window_events(events);

        // ===== 2. 速度解析 =====
        let routing = self.speed_resolution.resolve(windowed, speed_table);
        diagnostics.auto_routed_events = routing.total_touched();
        for application in routing.applications.iter().filter(|a| a.events_touched > 0) {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Info,
                DiagnosticCode::RouteAutoAssigned,
                format!(
                    "规则 {} 补全 {} 条记录路线",
                    application.rule, application.events_touched
                ),
            ));
        }

        // ===== 3. 产线过滤 + 生产日选择 =====
        let (line_events, dropped): (Vec<ShiftEvent>, Vec<ShiftEvent>) = routing
            .events
            .into_iter()
            .partition(|e| e.raw.center.starts_with(&self.config.line_prefix));
        diagnostics.non_line_events_dropped = dropped.len();

        diagnostics.events_without_timestamp = line_events
            .iter()
            .filter(|e| e.production_day.is_none())
            .count();

        let selected_day = day.or_else(|| line_events.iter().filter_map(|e| e.production_day).min());
        let with_day = line_events.len() - diagnostics.events_without_timestamp;
        let day_events: Vec<ShiftEvent> = match selected_day {
            Some(d) => line_events
                .into_iter()
                .filter(|e| e.production_day == Some(d))
                .collect(),
            None => Vec::new(),
        };
        // 已有生产日但不属于选定日的事件
        diagnostics.events_outside_day = with_day - day_events.len();

        debug!(
            selected_day = ?selected_day,
            day_events = day_events.len(),
            dropped_non_line = diagnostics.non_line_events_dropped,
            "生产日筛选完成"
        );

        if selected_day.is_none() {
            warn!("无可用生产日，输出为空");
        }

        // ===== 4. 停机归一 =====
        let downtime = DowntimeNormalizer::new(
            self.config.minutes_median_threshold,
            self.config.minutes_max_threshold,
        )
        .normalize(day_events);
        diagnostics.unparsable_values += downtime.unparsable_values;
        diagnostics.extend(downtime.diagnostics);

        // ===== 5. 聚合 =====
        let aggregation =
            AggregationEngine::new(&self.config).aggregate(&downtime.events, &routing.speed_table);
        diagnostics.missing_speed_groups = aggregation.missing_speed_groups;
        diagnostics.unmatched_speed_keys = aggregation.unmatched_speed_keys.clone();
        diagnostics.speed_floor_applied = aggregation.speed_floor_applied;
        diagnostics.extend(aggregation.diagnostics.iter().cloned());

        // ===== 6. 汇总与排名 =====
        let rollup = RollupEngine::new(&self.config);
        let center_summaries =
            rollup.center_summaries(&aggregation.shift_summaries, &aggregation.stop_details);
        let overall = rollup.overall(&aggregation.shift_summaries);
        let shift_totals = rollup.shift_totals(&aggregation.shift_summaries);
        let stop_reason_totals = rollup.stop_reason_totals(&aggregation.stop_details);
        let rankings = RankingEngine::new(self.config.ranking_size)
            .rank_all(&aggregation.shift_summaries);

        perf.set_output_rows(aggregation.shift_summaries.len());
        info!(
            run_id = %run_id,
            shift_rows = aggregation.shift_summaries.len(),
            stop_rows = aggregation.stop_details.len(),
            centers = center_summaries.len(),
            missing_speed_groups = diagnostics.missing_speed_groups,
            auto_routed = diagnostics.auto_routed_events,
            speed_floor_applied = diagnostics.speed_floor_applied,
            unparsable_values = diagnostics.unparsable_values,
            "班次分析完成"
        );

        AnalyticsReport {
            run_id,
            generated_at: Utc::now(),
            production_day: selected_day,
            duration_unit: if downtime.events.is_empty() {
                DurationUnit::Hours
            } else {
                downtime.unit
            },
            shift_summaries: aggregation.shift_summaries,
            stop_details: aggregation.stop_details,
            center_summaries,
            rankings,
            overall,
            shift_totals,
            stop_reason_totals,
            speed_table: routing.speed_table,
            rule_applications: routing.applications,
            diagnostics,
        }
    }
}
