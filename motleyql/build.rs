// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    batch_processing: BatchProcessingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    large_file_threshold: u64,
    max_queries_per_file: usize,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_query_length: usize,
    max_identifier_length: usize,
    max_string_literal_length: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_select_fields: usize,
    max_conditions: usize,
    max_order_by_items: usize,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_files_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_error_collection: usize,
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=MOTLEY_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=MOTLEY_CONFIG_DIR");

    let profile = env::var("MOTLEY_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("MOTLEY_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the motleyql directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_QUERY_LENGTH: usize = 1_048_576;
    const ABSOLUTE_MAX_WORKER_THREADS: usize = 256;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("LIMITS: max_file_size exceeds absolute maximum");
    }

    if config.file_processing.large_file_threshold > config.file_processing.max_file_size {
        panic!("LIMITS: large_file_threshold must not exceed max_file_size");
    }

    if config.lexical.max_query_length > ABSOLUTE_MAX_QUERY_LENGTH {
        panic!("LIMITS: max_query_length exceeds absolute maximum");
    }

    if config.lexical.max_identifier_length == 0 || config.lexical.max_string_literal_length == 0 {
        panic!("LIMITS: identifier and literal lengths must be positive");
    }

    if config.syntax.max_select_fields == 0 || config.syntax.max_conditions == 0 {
        panic!("LIMITS: clause item limits must be positive");
    }

    if config.batch_processing.max_worker_threads == 0
        || config.batch_processing.max_worker_threads > ABSOLUTE_MAX_WORKER_THREADS
    {
        panic!("LIMITS: max_worker_threads must be between 1 and 256");
    }

    if config.logging.max_log_events_per_file > config.logging.log_buffer_size {
        panic!("LIMITS: max_log_events_per_file exceeds log_buffer_size");
    }

    if profile == "production" && config.file_processing.max_file_size > 50_000_000 {
        panic!("PRODUCTION: max_file_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const LARGE_FILE_THRESHOLD: u64 = {};
        pub const MAX_QUERIES_PER_FILE: usize = {};
    }}

    pub mod lexical {{
        pub const MAX_QUERY_LENGTH: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const MAX_STRING_LITERAL_LENGTH: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_SELECT_FIELDS: usize = {};
        pub const MAX_CONDITIONS: usize = {};
        pub const MAX_ORDER_BY_ITEMS: usize = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_FILES_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const MAX_ERROR_COLLECTION: usize = {};
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
    }}
}}
"#,
        profile,
        config.file_processing.max_file_size,
        config.file_processing.large_file_threshold,
        config.file_processing.max_queries_per_file,
        config.lexical.max_query_length,
        config.lexical.max_identifier_length,
        config.lexical.max_string_literal_length,
        config.syntax.max_select_fields,
        config.syntax.max_conditions,
        config.syntax.max_order_by_items,
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_files_per_batch,
        config.logging.max_error_collection,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_file,
    );

    fs::write(output_path, constants_code).unwrap();
}
