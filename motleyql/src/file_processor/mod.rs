//! Query files: `.mql` text with one query per line

mod processor;

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_QUERIES_PER_FILE,
};
use crate::logging::codes;
use crate::log_debug;
use std::path::Path;

pub use processor::{
    split_queries, FileMetadata, FileProcessor, FileProcessorError, QueryFile, SourceQuery,
    COMMENT_PREFIX, QUERY_FILE_EXTENSION,
};

/// Read a query file with preferences from the environment
pub fn process_file(file_path: &Path) -> Result<QueryFile, FileProcessorError> {
    let prefs = crate::config::runtime::FileProcessorPreferences::default();
    FileProcessor::from_preferences(&prefs).process_file(file_path)
}

pub fn is_query_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(QUERY_FILE_EXTENSION))
        .unwrap_or(false)
}

/// Check that every file processing code has registry metadata
pub fn init_file_processor_logging() -> Result<(), String> {
    let file_codes = [
        codes::file_processing::FILE_NOT_FOUND,
        codes::file_processing::INVALID_EXTENSION,
        codes::file_processing::FILE_TOO_LARGE,
        codes::file_processing::EMPTY_FILE,
        codes::file_processing::PERMISSION_DENIED,
        codes::file_processing::INVALID_ENCODING,
        codes::file_processing::IO_ERROR,
        codes::file_processing::INVALID_PATH,
        codes::file_processing::TOO_MANY_QUERIES,
    ];

    for code in &file_codes {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!(
                "File processor error code {} has no description",
                code.as_str()
            ));
        }
    }

    log_debug!("File processor compile-time configuration loaded",
        "max_file_size" => MAX_FILE_SIZE,
        "large_file_threshold" => LARGE_FILE_THRESHOLD,
        "max_queries_per_file" => MAX_QUERIES_PER_FILE
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_module_api() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("demo.mql");
        fs::write(&file_path, "SELECT * FROM models\n").unwrap();

        let file = process_file(&file_path).unwrap();
        assert_eq!(file.queries[0].line, 1);
    }

    #[test]
    fn test_is_query_file() {
        assert!(is_query_file(Path::new("a/b.mql")));
        assert!(is_query_file(Path::new("B.MQL")));
        assert!(!is_query_file(Path::new("b.sql")));
        assert!(!is_query_file(Path::new("mql")));
    }

    #[test]
    fn test_codes_registered() {
        assert!(init_file_processor_logging().is_ok());
    }
}
