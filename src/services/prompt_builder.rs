//! 提示词构建 - 业务能力层
//!
//! 纯函数：同样的报告文本总是得到同样的提示词。
//! 报告本身是俄语的，提示词也使用俄语。

/// 构建用户提示词
///
/// 要求模型按 JSON Schema 填写所有字段，缺失的数据填空字符串，
/// 并只返回合法 JSON。
pub fn build_user_prompt(report_text: &str) -> String {
    format!(
        r#"Ниже приведён текстовый отчёт о скважине.
Проанализируй его и заполни все поля JSON-схемы в соответствии с данными, найденными в тексте.
Если какие-то данные отсутствуют — ставь пустую строку "".
Помни: вывод должен строго соответствовать JSON Schema и быть корректным JSON-объектом.

Текст отчёта:
{}"#,
        report_text
    )
}
