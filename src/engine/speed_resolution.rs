// ==========================================
// 班次绩效分析引擎 - 速度解析引擎
// ==========================================
// 职责: 为缺少路线的事件按固定顺序的回退规则补全路线，
//       并在速度表中补充对应标准速度
// 红线:
// - 只处理路线为空的事件，已有路线永不覆盖
// - 速度表仅在键不存在时插入
// - 纯函数：输入不变，返回新的事件集合与速度表
// ==========================================

use crate::domain::event::ShiftEvent;
use crate::domain::report::RuleApplication;
use crate::domain::speed::{SpeedKey, SpeedTable};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

// ==========================================
// RouteRule Trait
// ==========================================
// 每条规则是级联中的一个独立步骤
pub trait RouteRule: Send + Sync {
    /// 规则名称（用于计数与日志）
    fn name(&self) -> String;

    /// 在事件副本与速度表副本上执行规则
    ///
    /// # 返回
    /// - RuleApplication: 补全的事件数与新插入的速度键
    fn apply(&self, events: &mut [ShiftEvent], table: &mut SpeedTable) -> RuleApplication;
}

/// 为匹配事件写入路线并登记速度；返回本次新插入的键
fn assign_route(
    events: &mut [ShiftEvent],
    indices: &[usize],
    center: &str,
    route: &str,
    speed: f64,
    table: &mut SpeedTable,
) -> Vec<String> {
    for &idx in indices {
        events[idx].raw.route = Some(route.to_string());
    }

    let key = SpeedKey::new(center, route);
    if !indices.is_empty() && table.insert_if_absent(key.clone(), speed) {
        vec![key.to_string()]
    } else {
        Vec::new()
    }
}

fn is_unrouted_at(event: &ShiftEvent, center: &str) -> bool {
    event.raw.route.is_none() && event.raw.center == center
}

// ==========================================
// QuantityTieredRule - 按物料合格数量分档
// ==========================================
// 同一物料取第一条可解析的合格数量作为代表值；
// 无可解析数量的物料跳过（不视为失败）
pub struct QuantityTieredRule {
    pub center: String,
    pub threshold: f64,              // ≤ threshold → 快档
    pub fast: (String, f64),         // (路线, 速度)
    pub slow: (String, f64),
}

impl RouteRule for QuantityTieredRule {
    fn name(&self) -> String {
        format!("{}:QUANTITY_TIER", self.center)
    }

    fn apply(&self, events: &mut [ShiftEvent], table: &mut SpeedTable) -> RuleApplication {
        // 物料 → (代表数量, 事件下标)
        let mut by_item: BTreeMap<String, (Option<f64>, Vec<usize>)> = BTreeMap::new();
        for (idx, event) in events.iter().enumerate() {
            if !is_unrouted_at(event, &self.center) {
                continue;
            }
            let entry = by_item
                .entry(event.raw.item.clone())
                .or_insert((None, Vec::new()));
            if entry.0.is_none() {
                entry.0 = event.raw.approved_quantity;
            }
            entry.1.push(idx);
        }

        let mut touched = 0;
        let mut keys_inserted = Vec::new();
        for (item, (quantity, indices)) in by_item {
            let Some(quantity) = quantity else {
                debug!(center = %self.center, item = %item, "物料无可解析数量，跳过");
                continue;
            };
            let (route, speed) = if quantity <= self.threshold {
                &self.fast
            } else {
                &self.slow
            };
            keys_inserted.extend(assign_route(
                events,
                &indices,
                &self.center,
                route,
                *speed,
                table,
            ));
            touched += indices.len();
        }

        RuleApplication {
            rule: self.name(),
            events_touched: touched,
            keys_inserted,
        }
    }
}

// ==========================================
// OperationRule - 按工序描述匹配
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum OperationMatch {
    Any,              // 任意工序
    Equals(String),   // 工序等于
    NotEquals(String), // 工序不等于（空工序也视为不等于）
}

impl OperationMatch {
    pub fn matches(&self, operation: &str) -> bool {
        let operation = operation.trim();
        match self {
            OperationMatch::Any => true,
            OperationMatch::Equals(expected) => operation == expected,
            OperationMatch::NotEquals(excluded) => operation != excluded,
        }
    }
}

pub struct OperationRule {
    pub center: String,
    pub operation: OperationMatch,
    pub route: String,
    pub speed: f64,
}

impl RouteRule for OperationRule {
    fn name(&self) -> String {
        format!("{}:{}", self.center, self.route)
    }

    fn apply(&self, events: &mut [ShiftEvent], table: &mut SpeedTable) -> RuleApplication {
        let indices: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| is_unrouted_at(e, &self.center) && self.operation.matches(&e.raw.operation))
            .map(|(idx, _)| idx)
            .collect();

        let keys_inserted = assign_route(
            events,
            &indices,
            &self.center,
            &self.route,
            self.speed,
            table,
        );

        RuleApplication {
            rule: self.name(),
            events_touched: indices.len(),
            keys_inserted,
        }
    }
}

// ==========================================
// 默认级联（顺序固定）
// ==========================================
pub fn default_cascade() -> Vec<Box<dyn RouteRule>> {
    vec![
        // 1. CA05 按合格数量分档
        Box::new(QuantityTieredRule {
            center: "CA05".to_string(),
            threshold: 18000.0,
            fast: ("RAPIDO".to_string(), 50000.0),
            slow: ("LENTO".to_string(), 70000.0),
        }),
        // 2. 预压痕工序（两个工作中心）
        Box::new(OperationRule {
            center: "CA04".to_string(),
            operation: OperationMatch::Equals("Pre Vincagem".to_string()),
            route: "PREVINCAGEM".to_string(),
            speed: 120000.0,
        }),
        Box::new(OperationRule {
            center: "CA16".to_string(),
            operation: OperationMatch::Equals("Pre Vincagem".to_string()),
            route: "PREVINCAGEM".to_string(),
            speed: 100000.0,
        }),
        // 3. 喷码/粘合
        Box::new(OperationRule {
            center: "CA15".to_string(),
            operation: OperationMatch::Equals("Aplic Ink-Jet / Colagem".to_string()),
            route: "INKJET".to_string(),
            speed: 10000.0,
        }),
        // 4. 非粘合工序
        Box::new(OperationRule {
            center: "CA09".to_string(),
            operation: OperationMatch::NotEquals("Colagem".to_string()),
            route: "GERAL".to_string(),
            speed: 12000.0,
        }),
        // 5. 兜底
        Box::new(OperationRule {
            center: "CA01".to_string(),
            operation: OperationMatch::Any,
            route: "GERAL".to_string(),
            speed: 9000.0,
        }),
    ]
}

// ==========================================
// 级联结果
// ==========================================
#[derive(Debug, Clone)]
pub struct RoutingOutcome {
    pub events: Vec<ShiftEvent>,
    pub speed_table: SpeedTable,
    pub applications: Vec<RuleApplication>,
}

impl RoutingOutcome {
    /// 所有规则补全的事件总数（信息性计数）
    pub fn total_touched(&self) -> usize {
        self.applications.iter().map(|a| a.events_touched).sum()
    }
}

// ==========================================
// SpeedResolutionEngine
// ==========================================
pub struct SpeedResolutionEngine {
    rules: Vec<Box<dyn RouteRule>>,
}

impl SpeedResolutionEngine {
    /// 使用默认级联创建
    pub fn new() -> Self {
        Self {
            rules: default_cascade(),
        }
    }

    /// 使用自定义规则序列创建
    pub fn with_rules(rules: Vec<Box<dyn RouteRule>>) -> Self {
        Self { rules }
    }

    /// 执行级联
    ///
    /// # 参数
    /// - events: 已归属班次的事件（消费后返回新集合）
    /// - table: 调用方速度表（只读，内部克隆）
    #[instrument(skip(self, events, table), fields(count = events.len(), table_size = table.len()))]
    pub fn resolve(&self, events: Vec<ShiftEvent>, table: &SpeedTable) -> RoutingOutcome {
        let mut events = events;
        let mut speed_table = table.clone();

        let applications: Vec<RuleApplication> = self
            .rules
            .iter()
            .map(|rule| {
                let application = rule.apply(&mut events, &mut speed_table);
                if application.events_touched > 0 {
                    debug!(
                        rule = %application.rule,
                        touched = application.events_touched,
                        keys_inserted = ?application.keys_inserted,
                        "回退规则已应用"
                    );
                }
                application
            })
            .collect();

        let outcome = RoutingOutcome {
            events,
            speed_table,
            applications,
        };

        let total = outcome.total_touched();
        if total > 0 {
            info!(auto_routed = total, "已为缺少路线的记录补全路线");
        }
        outcome
    }
}

impl Default for SpeedResolutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 以默认级联解析路线与速度
pub fn resolve_routes_and_speeds(events: Vec<ShiftEvent>, table: &SpeedTable) -> RoutingOutcome {
    SpeedResolutionEngine::new().resolve(events, table)
}
