//! Query file reading and splitting

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_QUERIES_PER_FILE,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const QUERY_FILE_EXTENSION: &str = "mql";
pub const COMMENT_PREFIX: &str = "--";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .mql, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {MAX_FILE_SIZE})")]
    FileTooLarge { size: u64 },

    #[error("File contains no queries: {path}")]
    EmptyFile { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("Too many queries in file: {count} (max: {MAX_QUERIES_PER_FILE})")]
    TooManyQueries { count: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => {
                codes::file_processing::INVALID_EXTENSION
            }
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::EmptyFile { .. } => codes::file_processing::EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
            FileProcessorError::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
            FileProcessorError::TooManyQueries { .. } => codes::file_processing::TOO_MANY_QUERIES,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> codes::Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    pub size: u64,
    pub extension: Option<String>,
    pub line_count: usize,
    pub is_mql_file: bool,
    #[serde(skip)]
    pub modified: Option<std::time::SystemTime>,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        human_size(self.size)
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// One query and the 1-based line it was read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceQuery {
    pub line: u32,
    pub text: String,
}

/// A read and split query file
#[derive(Debug, Clone)]
pub struct QueryFile {
    pub metadata: FileMetadata,
    pub queries: Vec<SourceQuery>,
    pub processing_duration: Duration,
}

impl QueryFile {
    pub fn path(&self) -> &Path {
        &self.metadata.path
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    pub fn query_texts(&self) -> impl Iterator<Item = &str> {
        self.queries.iter().map(|query| query.text.as_str())
    }
}

/// Split file content into queries: one per non-blank line, `--` lines
/// skipped when comments are allowed.
pub fn split_queries(source: &str, allow_comment_lines: bool) -> Vec<SourceQuery> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let text = line.trim();
            if text.is_empty() || (allow_comment_lines && text.starts_with(COMMENT_PREFIX)) {
                return None;
            }
            Some(SourceQuery {
                line: index as u32 + 1,
                text: text.to_string(),
            })
        })
        .collect()
}

/// Reads `.mql` query files under the compile-time size ceilings
#[derive(Debug, Clone)]
pub struct FileProcessor {
    pub require_mql_extension: bool,
    pub enable_performance_logging: bool,
    pub allow_comment_lines: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_mql_extension: false,
            enable_performance_logging: true,
            allow_comment_lines: true,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_mql_extension: prefs.require_mql_extension,
            enable_performance_logging: prefs.enable_performance_logging,
            allow_comment_lines: prefs.allow_comment_lines,
        }
    }

    pub fn with_mql_extension_required(mut self, required: bool) -> Self {
        self.require_mql_extension = required;
        self
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    pub fn with_comment_lines(mut self, allowed: bool) -> Self {
        self.allow_comment_lines = allowed;
        self
    }

    /// Read `file_path` and split it into queries
    pub fn process_file(&self, file_path: &Path) -> Result<QueryFile, FileProcessorError> {
        let start_time = Instant::now();
        let display_path = file_path.display().to_string();

        log_debug!("Starting file processing", "file" => display_path);

        let path = self.validate_path(file_path)?;
        let mut metadata = self.get_metadata(&path)?;
        self.validate_file(&metadata, &display_path)?;
        let source = self.read_file(&path, &display_path)?;

        metadata.line_count = source.lines().count();
        let queries = split_queries(&source, self.allow_comment_lines);

        if queries.is_empty() {
            let error = FileProcessorError::EmptyFile {
                path: display_path.clone(),
            };
            log_error!(error.error_code(), "File contains no queries", "file" => display_path);
            return Err(error);
        }

        if queries.len() > MAX_QUERIES_PER_FILE {
            let error = FileProcessorError::TooManyQueries {
                count: queries.len(),
            };
            log_error!(error.error_code(), "File exceeds maximum query count",
                "file" => display_path,
                "queries" => queries.len(),
                "max_queries" => MAX_QUERIES_PER_FILE
            );
            return Err(error);
        }

        let result = QueryFile {
            metadata,
            queries,
            processing_duration: start_time.elapsed(),
        };

        self.log_processing_success(&result, &display_path);
        Ok(result)
    }

    fn log_processing_success(&self, result: &QueryFile, file_path: &str) {
        if self.enable_performance_logging {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully with performance metrics",
                "file" => file_path,
                "size_bytes" => result.metadata.size,
                "size_human" => result.metadata.human_readable_size(),
                "lines" => result.metadata.line_count,
                "queries" => result.query_count(),
                "duration_ms" => format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0),
                "is_large_file" => result.metadata.is_large_file()
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully",
                "file" => file_path,
                "queries" => result.query_count()
            );
        }
    }

    fn validate_path(&self, file_path: &Path) -> Result<PathBuf, FileProcessorError> {
        let display_path = file_path.display().to_string();

        if file_path.as_os_str().is_empty() {
            let error = FileProcessorError::InvalidPath { path: display_path };
            log_error!(error.error_code(), "Empty file path provided");
            return Err(error);
        }

        if !file_path.exists() {
            let error = FileProcessorError::FileNotFound {
                path: display_path.clone(),
            };
            log_error!(error.error_code(), "File not found", "path" => display_path);
            return Err(error);
        }

        if !file_path.is_file() {
            let error = FileProcessorError::InvalidPath {
                path: display_path.clone(),
            };
            log_error!(error.error_code(), "Path is not a file", "path" => display_path);
            return Err(error);
        }

        file_path.canonicalize().map_err(|e| {
            let error = FileProcessorError::IoError {
                message: format!("Failed to resolve path '{}': {}", display_path, e),
            };
            log_error!(error.error_code(), "Failed to canonicalize path",
                "path" => display_path,
                "io_error" => e
            );
            error
        })
    }

    fn get_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| {
            let path_str = path.display().to_string();
            let error = match e.kind() {
                std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                    path: path_str.clone(),
                },
                _ => FileProcessorError::IoError {
                    message: format!("Failed to read metadata for '{}': {}", path_str, e),
                },
            };
            log_error!(error.error_code(), "Failed to read file metadata",
                "path" => path_str,
                "io_error" => e
            );
            error
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());
        let is_mql_file = extension.as_deref() == Some(QUERY_FILE_EXTENSION);

        Ok(FileMetadata {
            path: path.to_path_buf(),
            size: metadata.len(),
            extension,
            line_count: 0,
            is_mql_file,
            modified: metadata.modified().ok(),
        })
    }

    fn validate_file(&self, metadata: &FileMetadata, file_path: &str) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
            };
            log_error!(error.error_code(), "File exceeds compile-time maximum size limit",
                "file" => file_path,
                "size_human" => metadata.human_readable_size(),
                "limit_human" => human_size(MAX_FILE_SIZE)
            );
            return Err(error);
        }

        if metadata.size == 0 {
            let error = FileProcessorError::EmptyFile {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "File is empty", "file" => file_path);
            return Err(error);
        }

        if self.require_mql_extension && !metadata.is_mql_file {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            log_error!(error.error_code(), "File does not have required .mql extension",
                "file" => file_path,
                "extension" => metadata.extension.as_deref().unwrap_or("none")
            );
            return Err(error);
        }

        Ok(())
    }

    fn read_file(&self, path: &Path, file_path: &str) -> Result<String, FileProcessorError> {
        fs::read_to_string(path).map_err(|e| {
            let error = match e.kind() {
                std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                    path: file_path.to_string(),
                },
                std::io::ErrorKind::InvalidData => FileProcessorError::InvalidEncoding {
                    path: file_path.to_string(),
                },
                _ => FileProcessorError::IoError {
                    message: format!("Failed to read file '{}': {}", file_path, e),
                },
            };
            log_error!(error.error_code(), "Failed to read file",
                "file" => file_path,
                "io_error" => e
            );
            error
        })
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_split_queries_skips_blanks_and_comments() {
        let source = "-- demo queries\nSELECT * FROM models\n\n  SELECT a FROM b  \n-- end\n";
        let queries = split_queries(source, true);

        assert_eq!(
            queries,
            vec![
                SourceQuery {
                    line: 2,
                    text: "SELECT * FROM models".into()
                },
                SourceQuery {
                    line: 4,
                    text: "SELECT a FROM b".into()
                },
            ]
        );

        let with_comments = split_queries(source, false);
        assert_eq!(with_comments.len(), 4);
        assert_eq!(with_comments[0].text, "-- demo queries");
    }

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zoo.mql");
        fs::write(&path, "SELECT * FROM models\nSELECT * FROM zoo LIMIT 2\n").unwrap();

        let file = FileProcessor::new().process_file(&path).unwrap();
        assert_eq!(file.query_count(), 2);
        assert_eq!(file.metadata.line_count, 2);
        assert!(file.metadata.is_mql_file);
        assert_eq!(file.query_texts().last(), Some("SELECT * FROM zoo LIMIT 2"));
    }

    #[test]
    fn test_file_not_found() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(&dir.path().join("missing.mql"));
        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(dir.path());
        assert_matches!(result, Err(FileProcessorError::InvalidPath { .. }));
    }

    #[test]
    fn test_empty_and_comment_only_files() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.mql");
        fs::write(&empty, "").unwrap();
        assert_matches!(
            FileProcessor::new().process_file(&empty),
            Err(FileProcessorError::EmptyFile { .. })
        );

        let comments = dir.path().join("comments.mql");
        fs::write(&comments, "-- nothing here\n\n").unwrap();
        assert_matches!(
            FileProcessor::new().process_file(&comments),
            Err(FileProcessorError::EmptyFile { .. })
        );
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queries.txt");
        fs::write(&path, "SELECT * FROM models\n").unwrap();

        assert!(FileProcessor::new().process_file(&path).is_ok());

        let strict = FileProcessor::new().with_mql_extension_required(true);
        assert_matches!(
            strict.process_file(&path),
            Err(FileProcessorError::InvalidExtension { extension: Some(ref ext) }) if ext == "txt"
        );
    }

    #[test]
    fn test_too_many_queries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("many.mql");
        let content = "SELECT * FROM m\n".repeat(MAX_QUERIES_PER_FILE + 1);
        if content.len() as u64 > MAX_FILE_SIZE {
            return;
        }
        fs::write(&path, content).unwrap();

        assert_matches!(
            FileProcessor::new().process_file(&path),
            Err(FileProcessorError::TooManyQueries { .. })
        );
    }

    #[test]
    fn test_error_metadata() {
        let error = FileProcessorError::FileNotFound {
            path: "x.mql".into(),
        };
        assert!(error.requires_halt());
        assert_eq!(error.category(), "FileProcessing");

        let empty = FileProcessorError::EmptyFile {
            path: "x.mql".into(),
        };
        assert!(!empty.requires_halt());
        assert!(empty.is_recoverable());
    }

    #[test]
    fn test_from_preferences() {
        let prefs = FileProcessorPreferences {
            require_mql_extension: true,
            enable_performance_logging: false,
            allow_comment_lines: false,
        };
        let processor = FileProcessor::from_preferences(&prefs);
        assert!(processor.require_mql_extension);
        assert!(!processor.enable_performance_logging);
        assert!(!processor.allow_comment_lines);
    }

    #[test]
    fn test_human_readable_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.00 KB");
    }
}
