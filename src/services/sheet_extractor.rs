//! 工作表提取 - 业务能力层
//!
//! 只负责把工作簿拆成"日期 → 报告文本"，不关心 LLM 和流程。
//!
//! 工作簿结构：
//! - 第 0 个工作表：当前状态（不使用）
//! - 第 1 个工作表：汇总，第 0 列是日期，第 3 列是说明
//! - 第 2 个及之后：每个报告日期一张表，表名就是日期

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::{AnalysisError, DateParseError};
use crate::models::{Report, Sheet, Workbook};
use crate::utils::{format_report_date, parse_day_first};

/// 至少需要的工作表数量
pub const MIN_SHEET_COUNT: usize = 3;
pub const SUMMARY_SHEET_INDEX: usize = 1;
pub const FIRST_REPORT_SHEET_INDEX: usize = 2;

const SUMMARY_DATE_COLUMN: usize = 0;
const SUMMARY_TEXT_COLUMN: usize = 3;

/// 提取所有按日期的报告
///
/// 报告顺序与工作表顺序一致；两张表解析出同一日期时，后者的内容覆盖前者，
/// 位置保留第一次出现的位置。
pub fn extract_reports(workbook: &Workbook) -> Result<Vec<Report>, AnalysisError> {
    let sheet_count = workbook.sheet_count();
    if sheet_count < MIN_SHEET_COUNT {
        return Err(AnalysisError::Structural { sheet_count });
    }

    let summary = extract_summary(&workbook.sheets[SUMMARY_SHEET_INDEX]);
    debug!("汇总表解析出 {} 条记录", summary.len());

    let mut reports: Vec<Report> = Vec::new();

    for sheet in &workbook.sheets[FIRST_REPORT_SHEET_INDEX..] {
        let date = match parse_report_date(&sheet.name) {
            Ok(date) => date,
            Err(e) => {
                warn!("⚠️ 跳过工作表 '{}': 表名不是日期 ({})", sheet.name, e);
                continue;
            }
        };

        let sheet_body = sheet_text(sheet);
        let summary_text = summary.get(&date).map(String::as_str).unwrap_or("");
        let text = format!("{}\n{}", summary_text, sheet_body).trim().to_string();

        match reports.iter_mut().find(|report| report.date == date) {
            Some(existing) => {
                warn!("⚠️ 工作表 '{}' 的日期 {} 重复，覆盖之前的内容", sheet.name, date);
                existing.text = text;
            }
            None => reports.push(Report::new(date, text)),
        }
    }

    info!("✓ 从 {} 个工作表中提取到 {} 个报告", sheet_count, reports.len());

    Ok(reports)
}

/// 解析汇总表
///
/// 第 0 列和第 3 列都非空的行才会被使用；日期解析失败的行直接跳过。
pub fn extract_summary(sheet: &Sheet) -> BTreeMap<String, String> {
    let mut summary = BTreeMap::new();

    for row_index in 0..sheet.rows.len() {
        let date_cell = sheet.cell(row_index, SUMMARY_DATE_COLUMN);
        let text_cell = sheet.cell(row_index, SUMMARY_TEXT_COLUMN);
        if date_cell.is_blank() || text_cell.is_blank() {
            continue;
        }

        match date_cell.to_date() {
            Ok(date) => {
                summary.insert(format_report_date(date), text_cell.render().trim().to_string());
            }
            Err(e) => {
                debug!("汇总表第 {} 行日期无法解析，已跳过: {}", row_index + 1, e);
            }
        }
    }

    summary
}

/// 工作表中所有非空文本单元格，按行优先顺序用换行连接
pub fn sheet_text(sheet: &Sheet) -> String {
    sheet
        .cells()
        .filter_map(|cell| cell.as_text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// 工作表名 → 报告日期键
fn parse_report_date(sheet_name: &str) -> Result<String, DateParseError> {
    parse_day_first(sheet_name).map(format_report_date)
}
