//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or an explicit `--config` path), then applies `GRADES_RAG_DATA` and
//! `GRADES_RAG_LOG_LEVEL` env overrides.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::level_filters::LevelFilter;

use crate::error::AppError;

/// Default config path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Which record store backend to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSourceKind {
    Json,
    Sqlite,
}

/// Record store configuration (`[records]`).
#[derive(Debug, Clone)]
pub struct RecordsConfig {
    pub source: RecordSourceKind,
    /// JSON file or SQLite database path (already expanded, no `~`).
    pub path: PathBuf,
}

/// Which retrieval strategy the router prefers when no identifier is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Embedding similarity, degrading to keyword when no embeddings exist.
    Semantic,
    Keyword,
}

/// Feature-hashing embedder configuration (`[embeddings.hashing]`).
#[derive(Debug, Clone)]
pub struct HashingConfig {
    pub dimensions: usize,
}

/// OpenAI-compatible embeddings endpoint configuration (`[embeddings.openai]`).
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingsConfig {
    /// Full embeddings endpoint URL.
    pub api_base_url: String,
    pub model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// Embedding provider configuration.
#[derive(Debug, Clone)]
pub struct EmbeddingsConfig {
    /// Which provider is active (`"none"`, `"hashing"`, `"openai"`).
    /// Maps to `default` in `[embeddings]`.
    pub provider: String,
    pub hashing: HashingConfig,
    pub openai: OpenAiEmbeddingsConfig,
}

/// Report export configuration (`[export]`).
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub template: PathBuf,
    pub output_dir: PathBuf,
    pub institution: String,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    /// Default level for every target; `RUST_LOG` directives refine it.
    pub log_level: LevelFilter,
    pub records: RecordsConfig,
    pub retrieval_mode: RetrievalMode,
    pub embeddings: EmbeddingsConfig,
    /// API key from `EMBEDDINGS_API_KEY` env var. `None` for keyless local
    /// endpoints. Never sourced from TOML.
    pub embeddings_api_key: Option<String>,
    pub export: ExportConfig,
}

/// Raw TOML shape, the `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    assistant: RawAssistant,
    records: RawRecords,
    #[serde(default)]
    retrieval: RawRetrieval,
    #[serde(default)]
    embeddings: RawEmbeddings,
    #[serde(default)]
    export: RawExport,
}

#[derive(Deserialize)]
struct RawAssistant {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize)]
struct RawRecords {
    #[serde(default = "default_source")]
    source: String,
    path: String,
}

#[derive(Deserialize)]
struct RawRetrieval {
    #[serde(default = "default_mode")]
    mode: String,
}

impl Default for RawRetrieval {
    fn default() -> Self {
        Self { mode: default_mode() }
    }
}

#[derive(Deserialize)]
struct RawEmbeddings {
    /// Maps to `default = "..."` in `[embeddings]`.
    #[serde(rename = "default", default = "default_embeddings_provider")]
    provider: String,
    #[serde(default)]
    hashing: RawHashing,
    #[serde(default)]
    openai: RawOpenAi,
}

impl Default for RawEmbeddings {
    fn default() -> Self {
        Self {
            provider: default_embeddings_provider(),
            hashing: RawHashing::default(),
            openai: RawOpenAi::default(),
        }
    }
}

#[derive(Deserialize)]
struct RawHashing {
    #[serde(default = "default_dimensions")]
    dimensions: usize,
}

impl Default for RawHashing {
    fn default() -> Self {
        Self { dimensions: default_dimensions() }
    }
}

#[derive(Deserialize)]
struct RawOpenAi {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAi {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawExport {
    #[serde(default = "default_template")]
    template: String,
    #[serde(default = "default_output_dir")]
    output_dir: String,
    #[serde(default = "default_institution")]
    institution: String,
}

impl Default for RawExport {
    fn default() -> Self {
        Self {
            template: default_template(),
            output_dir: default_output_dir(),
            institution: default_institution(),
        }
    }
}

fn default_name() -> String { "grades-rag".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_source() -> String { "json".to_string() }
fn default_mode() -> String { "semantic".to_string() }
fn default_embeddings_provider() -> String { "hashing".to_string() }
fn default_dimensions() -> usize { 256 }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/embeddings".to_string() }
fn default_openai_model() -> String { "text-embedding-3-small".to_string() }
fn default_openai_timeout_seconds() -> u64 { 30 }
fn default_template() -> String { "config/templates/grade_report.md".to_string() }
fn default_output_dir() -> String { "~/.grades-rag/reports".to_string() }
fn default_institution() -> String { "Instituto Tecnológico X".to_string() }

/// Load config from `path`, then apply env-var overrides.
pub fn load(path: &Path) -> Result<Config, AppError> {
    let data_override = env::var("GRADES_RAG_DATA").ok();
    let log_level_override = env::var("GRADES_RAG_LOG_LEVEL").ok();
    load_from(path, data_override.as_deref(), log_level_override.as_deref())
}

/// Internal loader. Accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    data_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let source = match parsed.records.source.as_str() {
        "json" => RecordSourceKind::Json,
        "sqlite" => RecordSourceKind::Sqlite,
        other => {
            return Err(AppError::Config(format!(
                "unknown record source '{other}' (expected \"json\" or \"sqlite\")"
            )));
        }
    };

    let retrieval_mode = match parsed.retrieval.mode.as_str() {
        "semantic" => RetrievalMode::Semantic,
        "keyword" => RetrievalMode::Keyword,
        other => {
            return Err(AppError::Config(format!(
                "unknown retrieval mode '{other}' (expected \"semantic\" or \"keyword\")"
            )));
        }
    };

    let records_path = data_override.unwrap_or(&parsed.records.path);
    let log_level = parse_level(log_level_override.unwrap_or(&parsed.assistant.log_level))?;

    Ok(Config {
        name: parsed.assistant.name,
        log_level,
        records: RecordsConfig {
            source,
            path: expand_home(records_path),
        },
        retrieval_mode,
        embeddings: EmbeddingsConfig {
            provider: parsed.embeddings.provider,
            hashing: HashingConfig {
                dimensions: parsed.embeddings.hashing.dimensions,
            },
            openai: OpenAiEmbeddingsConfig {
                api_base_url: parsed.embeddings.openai.api_base_url,
                model: parsed.embeddings.openai.model,
                timeout_seconds: parsed.embeddings.openai.timeout_seconds,
            },
        },
        embeddings_api_key: env::var("EMBEDDINGS_API_KEY").ok(),
        export: ExportConfig {
            template: expand_home(&parsed.export.template),
            output_dir: expand_home(&parsed.export.output_dir),
            institution: parsed.export.institution,
        },
    })
}

/// Parse a plain level name (`off`, `error`, `warn`, `info`, `debug`,
/// `trace`), case-insensitive.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    let level = level.trim();
    if level.is_empty() {
        return Err(AppError::Config("log_level must not be empty".into()));
    }
    level.parse::<LevelFilter>().map_err(|_| {
        AppError::Config(format!(
            "unknown log_level '{level}' (expected off, error, warn, info, debug or trace)"
        ))
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

impl Config {
    /// Offline `Config` rooted at `dir`: JSON records, hashing embedder,
    /// no API keys, no network.
    pub fn test_default(dir: &Path) -> Self {
        Self {
            name: "test".into(),
            log_level: LevelFilter::INFO,
            records: RecordsConfig {
                source: RecordSourceKind::Json,
                path: dir.join("students.json"),
            },
            retrieval_mode: RetrievalMode::Semantic,
            embeddings: EmbeddingsConfig {
                provider: "hashing".into(),
                hashing: HashingConfig { dimensions: 64 },
                openai: OpenAiEmbeddingsConfig {
                    api_base_url: "http://localhost:0/v1/embeddings".into(),
                    model: "test-model".into(),
                    timeout_seconds: 1,
                },
            },
            embeddings_api_key: None,
            export: ExportConfig {
                template: dir.join("grade_report.md"),
                output_dir: dir.join("reports"),
                institution: "Test Institute".into(),
            },
        }
    }
}
