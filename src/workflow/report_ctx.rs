//! 报告处理上下文
//!
//! 封装"我正在处理第几个报告、它的日期是什么"这一信息

use std::fmt::Display;

/// 报告处理上下文
#[derive(Debug, Clone)]
pub struct ReportCtx {
    /// 报告在派发列表中的位置（从1开始，仅用于日志显示）
    pub report_index: usize,

    /// 报告总数
    pub report_total: usize,

    /// 报告日期键（DD.MM.YYYY）
    pub date: String,
}

impl ReportCtx {
    /// 创建新的报告上下文
    pub fn new(report_index: usize, report_total: usize, date: impl Into<String>) -> Self {
        Self {
            report_index,
            report_total,
            date: date.into(),
        }
    }
}

impl Display for ReportCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[报告 {}/{} 日期 {}]",
            self.report_index, self.report_total, self.date
        )
    }
}
