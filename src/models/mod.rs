pub mod file;
pub mod report;
pub mod workbook;

pub use file::{FileCreate, FileCreateBatch, FileIds, FileList, FileUpload, StoredFile};
pub use report::{AnalysisRecord, Report, ResultTable};
pub use workbook::{Cell, Sheet, Workbook};
