//! 工作簿模型
//!
//! 把 `calamine` 读出的表格转换成自有的 `Workbook`，后续的提取逻辑
//! 只依赖这里的类型，测试时可以直接构造。

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{AnalysisError, DateParseError};
use crate::utils::parse_day_first;

/// 单元格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// 错误值、时长等其他非文本值
    Other(String),
}

impl Cell {
    /// 空单元格或只有空白的文本
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// 只有文本单元格返回内容
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }

    /// 按"日在前"规则把单元格解释为日期
    pub fn to_date(&self) -> Result<NaiveDate, DateParseError> {
        match self {
            Cell::DateTime(value) => Ok(value.date()),
            Cell::Text(text) => parse_day_first(text),
            _ => Err(DateParseError::NotADate),
        }
    }

    /// 渲染为字符串
    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) | Cell::Other(text) => text.clone(),
            Cell::Int(value) => value.to_string(),
            Cell::Float(value) if value.fract() == 0.0 && value.is_finite() => {
                format!("{:.1}", value)
            }
            Cell::Float(value) => value.to_string(),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
            Cell::DateTime(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(text) => Cell::Text(text.clone()),
            Data::Int(value) => Cell::Int(*value),
            Data::Float(value) => Cell::Float(*value),
            Data::Bool(value) => Cell::Bool(*value),
            Data::DateTime(value) => match value.as_datetime() {
                Some(datetime) if value.is_datetime() => Cell::DateTime(datetime),
                _ => Cell::Float(value.as_f64()),
            },
            Data::DateTimeIso(text) => parse_iso_datetime(text)
                .map(Cell::DateTime)
                .unwrap_or_else(|| Cell::Other(text.clone())),
            Data::DurationIso(text) => Cell::Other(text.clone()),
            Data::Error(error) => Cell::Other(error.to_string()),
        }
    }
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// 工作表
///
/// 行列都是绝对位置：数据从 B 列开始的表，第 0 列依然是空单元格。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// 读取单元格，越界视为空
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&Cell::Empty)
    }

    /// 按行优先顺序遍历所有单元格
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }
}

/// 工作簿：有序的工作表列表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// 从字节内容解析工作簿（自动识别 xlsx / xls / xlsb / ods）
    pub fn from_bytes(content: &[u8]) -> Result<Self, AnalysisError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(content.to_vec()))
            .map_err(|source| AnalysisError::WorkbookRead { source })?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|source| AnalysisError::WorkbookRead { source })?;

            let (row_offset, column_offset) = range
                .start()
                .map(|(row, column)| (row as usize, column as usize))
                .unwrap_or((0, 0));

            let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
            for data_row in range.rows() {
                let mut cells = vec![Cell::Empty; column_offset];
                cells.extend(data_row.iter().map(Cell::from));
                rows.push(cells);
            }

            sheets.push(Sheet::new(name, rows));
        }

        Ok(Self { sheets })
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_blank_detection() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::Text("   ".to_string()).is_blank());
        assert!(!Cell::Text("Бурение".to_string()).is_blank());
        assert!(!Cell::Int(0).is_blank());
    }

    #[test]
    fn test_cell_render() {
        assert_eq!(Cell::Int(12).render(), "12");
        assert_eq!(Cell::Float(3.0).render(), "3.0");
        assert_eq!(Cell::Float(2.5).render(), "2.5");
        assert_eq!(Cell::Bool(true).render(), "True");
        let datetime = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Cell::DateTime(datetime).render(), "2024-03-01 00:00:00");
    }

    #[test]
    fn test_cell_to_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            Cell::Text("01.03.2024".to_string()).to_date().unwrap(),
            expected
        );
        assert_eq!(
            Cell::DateTime(expected.and_hms_opt(6, 0, 0).unwrap())
                .to_date()
                .unwrap(),
            expected
        );
        assert_eq!(Cell::Float(45352.0).to_date(), Err(DateParseError::NotADate));
    }

    #[test]
    fn test_sheet_cell_out_of_bounds_is_empty() {
        let sheet = Sheet::new("s", vec![vec![Cell::Text("a".to_string())]]);
        assert_eq!(sheet.cell(0, 0), &Cell::Text("a".to_string()));
        assert_eq!(sheet.cell(0, 3), &Cell::Empty);
        assert_eq!(sheet.cell(5, 0), &Cell::Empty);
    }

    #[test]
    fn test_from_bytes_rejects_non_workbook() {
        let result = Workbook::from_bytes(b"definitely not a spreadsheet");
        assert!(matches!(result, Err(AnalysisError::WorkbookRead { .. })));
    }

    #[test]
    fn test_cell_from_calamine_data() {
        assert_eq!(Cell::from(&Data::Empty), Cell::Empty);
        assert_eq!(
            Cell::from(&Data::String("x".to_string())),
            Cell::Text("x".to_string())
        );
        assert_eq!(Cell::from(&Data::Int(7)), Cell::Int(7));
        assert_eq!(
            Cell::from(&Data::DateTimeIso("2024-03-01".to_string())),
            Cell::DateTime(
                NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }

    /// 汇总表日期为带格式的日期单元格，报告表数据从 C 列开始
    fn sample_xlsx() -> Vec<u8> {
        use rust_xlsxwriter::{ExcelDateTime, Format};

        let mut xlsx = rust_xlsxwriter::Workbook::new();
        let date_format = Format::new().set_num_format("dd.mm.yyyy");

        let state = xlsx.add_worksheet().set_name("Текущее состояние").unwrap();
        state.write_string(0, 0, "не используется").unwrap();

        let summary = xlsx.add_worksheet().set_name("Сводка").unwrap();
        let first = ExcelDateTime::from_ymd(2024, 3, 1).unwrap();
        let second = ExcelDateTime::from_ymd(2024, 3, 2).unwrap();
        summary
            .write_datetime_with_format(0, 0, &first, &date_format)
            .unwrap();
        summary.write_string(0, 3, "Сводный текст").unwrap();
        summary
            .write_datetime_with_format(1, 0, &second, &date_format)
            .unwrap();
        summary.write_number(1, 3, 17).unwrap();

        let march_first = xlsx.add_worksheet().set_name("01.03.2024").unwrap();
        march_first.write_string(0, 2, "Работы").unwrap();
        march_first.write_number(1, 2, 5).unwrap();

        let march_second = xlsx.add_worksheet().set_name("02.03.2024").unwrap();
        march_second.write_string(0, 2, "b").unwrap();

        xlsx.save_to_buffer().unwrap()
    }

    #[test]
    fn test_from_bytes_reads_real_xlsx() {
        let workbook = Workbook::from_bytes(&sample_xlsx()).unwrap();

        assert_eq!(workbook.sheet_count(), 4);
        assert_eq!(workbook.sheets[3].name, "02.03.2024");

        // 列号保持绝对位置
        let report = &workbook.sheets[2];
        assert_eq!(report.cell(0, 0), &Cell::Empty);
        assert_eq!(report.cell(0, 2), &Cell::Text("Работы".to_string()));

        let summary = &workbook.sheets[1];
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(matches!(summary.cell(0, 0), Cell::DateTime(_)));
        assert_eq!(summary.cell(0, 0).to_date().unwrap(), expected);
        assert_eq!(summary.cell(1, 3).render(), "17.0");
    }

    #[test]
    fn test_extract_reports_from_real_xlsx() {
        use crate::models::Report;
        use crate::services::extract_reports;

        let workbook = Workbook::from_bytes(&sample_xlsx()).unwrap();

        let reports = extract_reports(&workbook).unwrap();

        assert_eq!(
            reports,
            vec![
                Report::new("01.03.2024", "Сводный текст\nРаботы"),
                Report::new("02.03.2024", "17.0\nb"),
            ]
        );
    }
}
