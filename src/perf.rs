// ==========================================
// 班次绩效分析引擎 - 阶段耗时统计
// ==========================================
// target: "perf"，RUST_LOG=perf=info 查看
// ==========================================

use std::cell::Cell;
use std::time::Instant;

/// 性能统计 Guard：记录 elapsed_ms + 输入/输出行数
///
/// 使用方式：
/// ```ignore
/// let perf = shift_analytics::perf::PerfGuard::new("aggregate", events.len());
/// // do work...
/// perf.set_output_rows(summaries.len());
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    input_rows: usize,
    output_rows: Cell<usize>,
}

impl PerfGuard {
    pub fn new(op: &'static str, input_rows: usize) -> Self {
        Self {
            op,
            start: Instant::now(),
            input_rows,
            output_rows: Cell::new(0),
        }
    }

    pub fn set_output_rows(&self, rows: usize) {
        self.output_rows.set(rows);
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            input_rows = self.input_rows,
            output_rows = self.output_rows.get(),
            "done"
        );
    }
}
