//! 日期解析（日在前）
//!
//! 工作表名和汇总表第一列中的日期写法不统一：`01.03.2024`、`1/3/24`、
//! `2024-03-01 00:00:00` 都会出现。这里统一解析为 `NaiveDate`，
//! 并规范化为 `DD.MM.YYYY`。

use chrono::NaiveDate;
use regex::Regex;

use crate::error::DateParseError;

/// 报告日期键的格式
pub const REPORT_DATE_FORMAT: &str = "%d.%m.%Y";

const TIME_SUFFIX: &str = r"(?:[ T]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)?";

const YEAR_FIRST_PATTERN: &str = r"^(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})";
const DAY_FIRST_PATTERN: &str = r"^(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})";

fn compile(pattern: &str) -> Result<Regex, DateParseError> {
    Regex::new(&format!("{}{}$", pattern, TIME_SUFFIX))
        .map_err(|e| DateParseError::Pattern(e.to_string()))
}

/// 按"日在前"的规则解析日期字符串
///
/// - 四位年份开头时按 `YYYY-M-D` 解析
/// - 否则按 `D.M.Y` 解析，两位年份 < 70 视为 20xx，其余视为 19xx
/// - 日在前的读法不是合法日期、但交换日月后合法时，使用交换后的结果
/// - 末尾的时间部分被忽略
pub fn parse_day_first(input: &str) -> Result<NaiveDate, DateParseError> {
    let text = input.trim();

    if let Some(caps) = compile(YEAR_FIRST_PATTERN)?.captures(text) {
        let year = parse_number(&caps[1])?;
        let month = parse_number(&caps[2])?;
        let day = parse_number(&caps[3])?;
        return NaiveDate::from_ymd_opt(year as i32, month, day)
            .ok_or_else(|| DateParseError::OutOfRange(text.to_string()));
    }

    if let Some(caps) = compile(DAY_FIRST_PATTERN)?.captures(text) {
        let first = parse_number(&caps[1])?;
        let second = parse_number(&caps[2])?;
        let year = expand_year(&caps[3])?;

        return NaiveDate::from_ymd_opt(year, second, first)
            .or_else(|| NaiveDate::from_ymd_opt(year, first, second))
            .ok_or_else(|| DateParseError::OutOfRange(text.to_string()));
    }

    Err(DateParseError::Unrecognized(text.to_string()))
}

/// 规范化为报告日期键 `DD.MM.YYYY`
pub fn format_report_date(date: NaiveDate) -> String {
    date.format(REPORT_DATE_FORMAT).to_string()
}

fn parse_number(digits: &str) -> Result<u32, DateParseError> {
    digits
        .parse()
        .map_err(|_| DateParseError::Unrecognized(digits.to_string()))
}

fn expand_year(digits: &str) -> Result<i32, DateParseError> {
    let value = parse_number(digits)? as i32;
    Ok(match digits.len() {
        2 if value < 70 => 2000 + value,
        2 => 1900 + value,
        _ => value,
    })
}
