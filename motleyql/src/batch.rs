//! Directory batches of query files
//!
//! Discovers `.mql` files and runs each through the pipeline, either one
//! after another or on a bounded pool of scoped worker threads. Errors are
//! collected per file by the global error collector for cargo-style output.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::runtime::RuntimeConfig;
use crate::file_processor::is_query_file;
use crate::logging::{codes, Code};
use crate::pipeline::{self, PipelineError, PipelineResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub progress_reporting: bool,
    /// Stop after the first file with a file error or a failing query
    pub fail_fast: bool,
    pub runtime: RuntimeConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4),
            recursive: true,
            max_files: None,
            progress_reporting: false,
            fail_fast: false,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Worker count clamped to the compile-time ceiling
    pub fn worker_threads(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }
}

#[derive(Debug, Default)]
pub struct BatchResults {
    /// Files that were read; a file may still contain a failing query
    pub processed_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files_processed(&self) -> usize {
        self.processed_files.len() + self.failed_files.len()
    }

    /// Files read whose queries all parsed
    pub fn success_count(&self) -> usize {
        self.processed_files
            .iter()
            .filter(|(_, result)| result.is_success())
            .count()
    }

    /// Files with a file error or a failing query
    pub fn failure_count(&self) -> usize {
        self.files_processed() - self.success_count()
    }

    pub fn plan_count(&self) -> usize {
        self.processed_files
            .iter()
            .map(|(_, result)| result.parsed_count())
            .sum()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed() == 0 {
            0.0
        } else {
            self.success_count() as f64 / self.files_processed() as f64
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }

    fn record(&mut self, file_path: PathBuf, outcome: Result<PipelineResult, PipelineError>) {
        match outcome {
            Ok(result) => self.processed_files.push((file_path, result)),
            Err(error) => self.failed_files.push((file_path, error)),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch processing completed: {} files processed, {} successful ({:.1}%), {} failed, {} plans, {:.2}s total",
            self.files_processed(),
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.plan_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No query files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files found: {count} (max: {MAX_FILES_PER_BATCH})")]
    TooManyFiles { count: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Worker thread failed: {message}")]
    WorkerFailed { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::batch::DIRECTORY_NOT_FOUND,
            BatchError::NoFilesFound { .. } | BatchError::IoError { .. } => {
                codes::batch::DISCOVERY_FAILED
            }
            BatchError::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
            BatchError::WorkerFailed { .. } => codes::batch::WORKER_FAILED,
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Query files under `dir_path`, sorted
pub fn discover_query_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        let error = BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        };
        crate::log_error!(error.error_code(), "Batch directory not found",
            "directory" => dir_path.display()
        );
        return Err(error);
    }

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }

    if files.len() > MAX_FILES_PER_BATCH {
        let error = BatchError::TooManyFiles { count: files.len() };
        crate::log_error!(error.error_code(), "Batch exceeds maximum file count",
            "files_found" => files.len(),
            "max_files" => MAX_FILES_PER_BATCH
        );
        return Err(error);
    }

    files.sort();

    crate::log_debug!("File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    config: &BatchConfig,
) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir_path).map_err(|e| BatchError::IoError {
        error: format!("{}: {}", dir_path.display(), e),
    })?;

    for entry in entries {
        let path = entry
            .map_err(|e| BatchError::IoError {
                error: e.to_string(),
            })?
            .path();

        if let Some(max_files) = config.max_files {
            if files.len() >= max_files {
                crate::log_warning!("Reached maximum file limit",
                    "files_found" => files.len(),
                    "limit" => max_files
                );
                return Ok(());
            }
        }

        if path.is_dir() {
            if config.recursive {
                visit_directory(&path, files, config)?;
            }
        } else if path.is_file() && is_query_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

fn should_stop(outcome: &Result<PipelineResult, PipelineError>) -> bool {
    match outcome {
        Ok(result) => !result.is_success(),
        Err(_) => true,
    }
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

pub fn process_directory_sequential(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let files = discover_query_files(dir_path, config)?;

    crate::log_info!("Starting sequential batch processing",
        "directory" => dir_path.display(),
        "files" => files.len()
    );

    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for (file_id, file_path) in files.iter().enumerate() {
        if config.progress_reporting {
            println!(
                "Processing file {} of {}: {}",
                file_id + 1,
                files.len(),
                file_path.display()
            );
        }

        let outcome = pipeline::process_file_with_config(file_path, file_id, &config.runtime);
        let stop = config.fail_fast && should_stop(&outcome);
        results.record(file_path.clone(), outcome);

        if stop {
            crate::log_warning!("Fail-fast mode enabled, stopping batch processing",
                "file" => file_path.display()
            );
            break;
        }
    }

    results.processing_duration = start_time.elapsed();
    log_completion(&results, 1);
    Ok(results)
}

/// Workers pull the next file index from a shared counter. Results are put
/// back in discovery order before returning.
pub fn process_directory_parallel(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let files = discover_query_files(dir_path, config)?;
    let workers = config.worker_threads().min(files.len());

    crate::log_info!("Starting parallel batch processing",
        "directory" => dir_path.display(),
        "files" => files.len(),
        "workers" => workers
    );

    let next_index = AtomicUsize::new(0);
    let stop = AtomicBool::new(false);
    let outcomes: Mutex<Vec<(usize, Result<PipelineResult, PipelineError>)>> =
        Mutex::new(Vec::with_capacity(files.len()));

    let worker_result: Result<(), BatchError> = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            handles.push(scope.spawn(|| loop {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                let file_id = next_index.fetch_add(1, Ordering::Relaxed);
                let Some(file_path) = files.get(file_id) else {
                    break;
                };

                let outcome =
                    pipeline::process_file_with_config(file_path, file_id, &config.runtime);
                if config.fail_fast && should_stop(&outcome) {
                    stop.store(true, Ordering::Relaxed);
                }

                outcomes
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push((file_id, outcome));
            }));
        }

        for handle in handles {
            handle.join().map_err(|_| BatchError::WorkerFailed {
                message: "worker thread panicked during processing".to_string(),
            })?;
        }
        Ok(())
    });

    if let Err(error) = worker_result {
        crate::log_error!(error.error_code(), "Parallel batch processing failed",
            "directory" => dir_path.display()
        );
        return Err(error);
    }

    let mut outcomes = outcomes
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    outcomes.sort_by_key(|(file_id, _)| *file_id);

    let mut results = BatchResults::new();
    results.files_discovered = files.len();
    for (file_id, outcome) in outcomes {
        results.record(files[file_id].clone(), outcome);
    }
    results.processing_duration = start_time.elapsed();

    log_completion(&results, workers);
    Ok(results)
}

fn log_completion(results: &BatchResults, workers: usize) {
    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch processing completed",
        "files_processed" => results.files_processed(),
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "plans" => results.plan_count(),
        "workers" => workers,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

pub fn process_directory(dir_path: &Path) -> Result<BatchResults, BatchError> {
    process_directory_with_config(dir_path, &BatchConfig::default())
}

pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    if config.worker_threads() == 1 {
        process_directory_sequential(dir_path, config)
    } else {
        process_directory_parallel(dir_path, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn write_zoo(dir: &Path) {
        fs::write(dir.join("a.mql"), "SELECT * FROM models\n").unwrap();
        fs::write(dir.join("b.mql"), "SELECT x FROM zoo LIMIT 0\n").unwrap();
        fs::write(dir.join("c.mql"), "SELECT y FROM zoo USING data\n").unwrap();
        fs::write(dir.join("notes.txt"), "not a query file").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("d.mql"), "SELECT * FROM deep\n").unwrap();
    }

    #[test]
    fn test_file_discovery() {
        let temp_dir = tempdir().unwrap();
        write_zoo(temp_dir.path());

        let config = BatchConfig::default();
        let files = discover_query_files(temp_dir.path(), &config).unwrap();
        assert_eq!(files.len(), 4);
        assert!(files.iter().all(|f| f.extension().unwrap() == "mql"));

        let shallow = BatchConfig {
            recursive: false,
            ..BatchConfig::default()
        };
        assert_eq!(discover_query_files(temp_dir.path(), &shallow).unwrap().len(), 3);
    }

    #[test]
    fn test_discovery_errors() {
        let temp_dir = tempdir().unwrap();
        let config = BatchConfig::default();

        assert_matches!(
            discover_query_files(&temp_dir.path().join("missing"), &config),
            Err(BatchError::DirectoryNotFound { .. })
        );
        assert_matches!(
            discover_query_files(temp_dir.path(), &config),
            Err(BatchError::NoFilesFound { .. })
        );
    }

    #[test]
    fn test_sequential_batch() {
        let temp_dir = tempdir().unwrap();
        write_zoo(temp_dir.path());

        let config = BatchConfig {
            max_threads: 1,
            ..BatchConfig::default()
        };
        let results = process_directory_with_config(temp_dir.path(), &config).unwrap();

        assert_eq!(results.files_processed(), 4);
        assert_eq!(results.success_count(), 3);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.plan_count(), 3);
        assert!(!results.is_clean());
    }

    #[test]
    fn test_parallel_matches_sequential_order() {
        let temp_dir = tempdir().unwrap();
        write_zoo(temp_dir.path());

        let config = BatchConfig {
            max_threads: 3,
            ..BatchConfig::default()
        };
        let parallel = process_directory_parallel(temp_dir.path(), &config).unwrap();
        let sequential = process_directory_sequential(temp_dir.path(), &config).unwrap();

        let order = |results: &BatchResults| -> Vec<PathBuf> {
            results
                .processed_files
                .iter()
                .map(|(path, _)| path.clone())
                .collect()
        };
        assert_eq!(order(&parallel), order(&sequential));
        assert_eq!(parallel.success_count(), 3);
    }

    #[test]
    fn test_fail_fast_stops_sequential_batch() {
        let temp_dir = tempdir().unwrap();
        write_zoo(temp_dir.path());

        let config = BatchConfig {
            max_threads: 1,
            fail_fast: true,
            ..BatchConfig::default()
        };
        let results = process_directory_sequential(temp_dir.path(), &config).unwrap();

        // a.mql parses, b.mql fails and stops the batch
        assert_eq!(results.files_processed(), 2);
        assert_eq!(results.failure_count(), 1);
    }

    #[test]
    fn test_worker_threads_are_clamped() {
        let config = BatchConfig {
            max_threads: 0,
            ..BatchConfig::default()
        };
        assert_eq!(config.worker_threads(), 1);

        let config = BatchConfig {
            max_threads: MAX_WORKER_THREADS + 10,
            ..BatchConfig::default()
        };
        assert_eq!(config.worker_threads(), MAX_WORKER_THREADS);
    }

    #[test]
    fn test_empty_results() {
        let results = BatchResults::new();
        assert_eq!(results.success_rate(), 0.0);
        assert!(results.is_clean());
        assert!(results.summary().contains("0 files processed"));
    }

    #[test]
    fn test_batch_error_codes() {
        let error = BatchError::TooManyFiles { count: 1 };
        assert_eq!(error.error_code(), codes::batch::TOO_MANY_FILES);
        assert!(codes::requires_halt(error.error_code().as_str()));
    }
}
