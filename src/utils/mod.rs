pub mod date;
pub mod logging;

pub use date::{format_report_date, parse_day_first};
pub use logging::truncate_text;
