pub mod file_service;
pub mod prompt_builder;
pub mod result_store;
pub mod sheet_extractor;

pub use file_service::{FileService, FileStore, LocalFileStore};
pub use prompt_builder::build_user_prompt;
pub use result_store::{InMemoryResultStore, ResultStore};
pub use sheet_extractor::extract_reports;
