// ==========================================
// 班次绩效分析引擎 - 事件记录
// ==========================================
// 职责: 产线事件日志的类型化记录
// 流转: RawEvent → ShiftEvent (班次归属) → NormalizedEvent (停机时长归一)
// ==========================================

use crate::domain::report::Diagnostic;
use crate::domain::speed::SpeedKey;
use crate::domain::types::{RecordKind, Shift};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// RawEvent - 原始事件
// ==========================================
// 导入后不可变；路线补全由 Speed Resolution 在副本上完成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub row_number: usize,                 // 源文件行号（诊断用）
    pub center: String,                    // Centro Trabalho
    pub route: Option<String>,             // Roteiro（空 → None）
    pub kind: RecordKind,                  // Tipo Registro
    pub item: String,                      // Descrição Item
    pub operation: String,                 // Descrição Operação（缺列时为空）
    pub approved_quantity: Option<f64>,    // Qtd Aprovada（无法解析 → None）
    pub start: Option<NaiveDateTime>,      // Data Início + Hora Início
    pub end: Option<NaiveDateTime>,        // Data Término + Hora Fim
    pub stop_duration_raw: String,         // Parada Real Útil（原始文本）
    pub stop_reason: String,               // Descrição Parada
}

impl RawEvent {
    /// 速度键 "{center}-{route}"；无路线时为 None
    pub fn speed_key(&self) -> Option<SpeedKey> {
        self.route
            .as_deref()
            .map(|route| SpeedKey::new(&self.center, route))
    }

    /// 事件跨度（分钟）
    ///
    /// 缺少起止时间 → 0；结束早于开始 → 0
    pub fn span_minutes(&self) -> f64 {
        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                let minutes = (end - start).num_seconds() as f64 / 60.0;
                minutes.max(0.0)
            }
            _ => 0.0,
        }
    }

    pub fn has_route(&self) -> bool {
        self.route.is_some()
    }
}

// ==========================================
// ShiftEvent - 已归属生产日与班次的事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftEvent {
    pub raw: RawEvent,
    pub production_day: Option<NaiveDate>, // 缺少开始时间 → None
    pub shift: Option<Shift>,              // 生产日或开始时间缺失 → None
}

// ==========================================
// NormalizedEvent - 选定生产日内、停机时长已归一的事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub raw: RawEvent,
    pub production_day: NaiveDate,
    pub shift: Shift,
    pub span_minutes: f64, // 事件跨度（分钟）
    pub stop_minutes: f64, // 停机时长（分钟），非停机记录为 0
    pub stop_hours: f64,   // 停机时长（小时）
}

// ==========================================
// EventDataset - 导入结果（事件 + 诊断）
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDataset {
    pub events: Vec<RawEvent>,
    pub total_rows: usize,
    pub unparsable_values: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl EventDataset {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_event(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> RawEvent {
        RawEvent {
            row_number: 2,
            center: "CA03".to_string(),
            route: Some("R1".to_string()),
            kind: RecordKind::StopReport,
            item: "CAIXA 01".to_string(),
            operation: String::new(),
            approved_quantity: None,
            start,
            end,
            stop_duration_raw: String::new(),
            stop_reason: "ACERTO".to_string(),
        }
    }

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_span_minutes() {
        assert_eq!(make_event(Some(dt(8, 0)), Some(dt(8, 45))).span_minutes(), 45.0);
        assert_eq!(make_event(Some(dt(8, 0)), None).span_minutes(), 0.0);
        assert_eq!(make_event(None, Some(dt(8, 0))).span_minutes(), 0.0);
        // 结束早于开始
        assert_eq!(make_event(Some(dt(9, 0)), Some(dt(8, 0))).span_minutes(), 0.0);
    }

    #[test]
    fn test_speed_key() {
        let mut event = make_event(None, None);
        assert_eq!(event.speed_key().unwrap().as_str(), "CA03-R1");
        event.route = None;
        assert!(event.speed_key().is_none());
    }
}
