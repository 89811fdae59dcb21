// ==========================================
// 班次绩效分析引擎 - 时间窗口引擎
// ==========================================
// 生产日: [06:00 当日, 06:00 次日)
// 三班制: 06:00-14:20 / 14:20-22:40 / 22:40-次日06:00
//         周六（按生产日判定）第二/三班分界为 22:13
// 两班制 (GR): 06:00-18:00 / 18:00-次日06:00
// 区间均为左闭右开
// ==========================================

use crate::domain::event::{RawEvent, ShiftEvent};
use crate::domain::types::Shift;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use tracing::{debug, instrument};

/// 两班制工作中心前缀
pub const TWO_SHIFT_PREFIX: &str = "GR";

// 以距零点秒数表示的边界
const DAY_START_SECS: u32 = 6 * 3600;
const SHIFT1_END_SECS: u32 = 14 * 3600 + 20 * 60;
const SHIFT2_END_SECS: u32 = 22 * 3600 + 40 * 60;
const SHIFT2_END_SATURDAY_SECS: u32 = 22 * 3600 + 13 * 60;
const GR_DAY_END_SECS: u32 = 18 * 3600;

/// 生产日
///
/// # 返回
/// - None: 缺少时间戳
/// - Some(date): 06:00 及之后为当日，否则为前一日
pub fn production_day(start: Option<NaiveDateTime>) -> Option<NaiveDate> {
    let start = start?;
    if start.time().num_seconds_from_midnight() >= DAY_START_SECS {
        Some(start.date())
    } else {
        start.date().pred_opt()
    }
}

/// 第二班结束（= 第三班开始）时刻
fn shift2_end_secs(production_day: NaiveDate) -> u32 {
    if production_day.weekday() == Weekday::Sat {
        SHIFT2_END_SATURDAY_SECS
    } else {
        SHIFT2_END_SECS
    }
}

/// 班次归属
///
/// # 参数
/// - start: 事件开始时间
/// - center: 工作中心
/// - production_day: 事件所属生产日（决定周六规则）
///
/// # 返回
/// - None: 开始时间或生产日缺失
pub fn assign_shift(
    start: Option<NaiveDateTime>,
    center: &str,
    production_day: Option<NaiveDate>,
) -> Option<Shift> {
    let start = start?;
    let day = production_day?;
    let secs = start.time().num_seconds_from_midnight();

    if center.starts_with(TWO_SHIFT_PREFIX) {
        return Some(if (DAY_START_SECS..GR_DAY_END_SECS).contains(&secs) {
            Shift::DayGr
        } else {
            Shift::NightGr
        });
    }

    if (DAY_START_SECS..SHIFT1_END_SECS).contains(&secs) {
        Some(Shift::Shift1)
    } else if (SHIFT1_END_SECS..shift2_end_secs(day)).contains(&secs) {
        Some(Shift::Shift2)
    } else {
        Some(Shift::Shift3)
    }
}

/// 班次绝对时间区间 [start, end)
///
/// 不接收工作中心参数: 中心类别已在 `assign_shift` 中编码进班次枚举，
/// GR 中心只会得到 `DayGr`/`NightGr`，CA 等三班制中心只会得到 `Shift1..Shift3`
///
/// # 参数
/// - production_day: 生产日
/// - shift: `assign_shift` 的结果
pub fn shift_interval(production_day: NaiveDate, shift: Shift) -> (NaiveDateTime, NaiveDateTime) {
    let at = |secs: u32| -> NaiveDateTime {
        production_day.and_time(NaiveTime::MIN) + Duration::seconds(i64::from(secs))
    };
    let next_day_start = at(DAY_START_SECS) + Duration::days(1);
    let end2 = shift2_end_secs(production_day);

    match shift {
        Shift::Shift1 => (at(DAY_START_SECS), at(SHIFT1_END_SECS)),
        Shift::Shift2 => (at(SHIFT1_END_SECS), at(end2)),
        Shift::Shift3 => (at(end2), next_day_start),
        Shift::DayGr => (at(DAY_START_SECS), at(GR_DAY_END_SECS)),
        Shift::NightGr => (at(GR_DAY_END_SECS), next_day_start),
    }
}

/// 班次时长（小时）
pub fn shift_duration_hours(production_day: NaiveDate, shift: Shift) -> f64 {
    let (start, end) = shift_interval(production_day, shift);
    (end - start).num_seconds() as f64 / 3600.0
}

// ==========================================
// TimeWindowEngine - 批量归属
// ==========================================
pub struct TimeWindowEngine;

impl TimeWindowEngine {
    pub fn new() -> Self {
        Self
    }

    /// 为每个事件附加生产日与班次
    #[instrument(skip(self, events), fields(count = events.len()))]
    pub fn window_events(&self, events: Vec<RawEvent>) -> Vec<ShiftEvent> {
        let windowed: Vec<ShiftEvent> = events
            .into_iter()
            .map(|raw| {
                let day = production_day(raw.start);
                let shift = assign_shift(raw.start, &raw.center, day);
                ShiftEvent {
                    raw,
                    production_day: day,
                    shift,
                }
            })
            .collect();

        debug!(
            unassigned = windowed.iter().filter(|e| e.shift.is_none()).count(),
            "时间窗口归属完成"
        );
        windowed
    }
}

impl Default for TimeWindowEngine {
    fn default() -> Self {
        Self::new()
    }
}
