//! Configuration management for Pagewise binaries
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Text generation capability
    #[serde(default)]
    pub llm: LlmConfig,

    /// Embedding capability backing the vector index
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Retrieval parameters
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Chunking parameters
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Answer policy thresholds
    #[serde(default)]
    pub answering: AnsweringConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound for a single question or ingestion, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Generation provider: openai (any OpenAI-compatible endpoint), mock
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// API key for the generation endpoint
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,

    /// Model used for grounded answers and document summaries
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Low-latency model used for intent classification and chat
    #[serde(default = "default_llm_fast_model")]
    pub fast_model: String,

    /// Sampling temperature (0.0 keeps answers reproducible)
    #[serde(default)]
    pub temperature: f32,

    /// Maximum output tokens
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Retries for transient failures, performed by the client
    #[serde(default = "default_llm_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding provider: openai, hashing
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// API key for embedding service
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Model to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Batch size for embedding requests
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters carried between adjacent split chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// A page flush is kept only above this many characters
    #[serde(default = "default_page_flush_min")]
    pub page_flush_min_chars: usize,

    /// The trailing flush is kept only above this many characters
    #[serde(default = "default_final_flush_min")]
    pub final_flush_min_chars: usize,

    /// Chunks per synthetic page when blocks carry no page numbers
    #[serde(default = "default_synthetic_page_stride")]
    pub synthetic_page_stride: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnsweringConfig {
    /// Retrieved context shorter than this is never sufficient
    #[serde(default = "default_min_context_chars")]
    pub min_context_chars: usize,

    /// Blocks fed into a whole-document summary
    #[serde(default = "default_summary_max_blocks")]
    pub summary_max_blocks: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 60 }
fn default_max_body_bytes() -> usize { 10 * 1024 * 1024 }
fn default_llm_provider() -> String { "mock".to_string() }
fn default_llm_api_base() -> String { "https://api.groq.com/openai/v1".to_string() }
fn default_llm_model() -> String { "llama-3.3-70b-versatile".to_string() }
fn default_llm_fast_model() -> String { "llama-3.1-8b-instant".to_string() }
fn default_llm_max_tokens() -> u32 { 1024 }
fn default_llm_timeout() -> u64 { 60 }
fn default_llm_retries() -> u32 { 2 }
fn default_embedding_provider() -> String { "hashing".to_string() }
fn default_embedding_model() -> String { "text-embedding-3-small".to_string() }
fn default_embedding_dimension() -> usize { 384 }
fn default_embedding_timeout() -> u64 { 30 }
fn default_batch_size() -> usize { 64 }
fn default_top_k() -> usize { crate::DEFAULT_TOP_K }
fn default_chunk_size() -> usize { crate::DEFAULT_CHUNK_SIZE }
fn default_chunk_overlap() -> usize { 100 }
fn default_page_flush_min() -> usize { 100 }
fn default_final_flush_min() -> usize { 20 }
fn default_synthetic_page_stride() -> usize { 3 }
fn default_min_context_chars() -> usize { 50 }
fn default_summary_max_blocks() -> usize { 50 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "pagewise".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: None,
            api_base: default_llm_api_base(),
            model: default_llm_model(),
            fast_model: default_llm_fast_model(),
            temperature: 0.0,
            max_tokens: default_llm_max_tokens(),
            timeout_secs: default_llm_timeout(),
            max_retries: default_llm_retries(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            api_key: None,
            api_base: None,
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            timeout_secs: default_embedding_timeout(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: default_top_k() }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            page_flush_min_chars: default_page_flush_min(),
            final_flush_min_chars: default_final_flush_min(),
            synthetic_page_stride: default_synthetic_page_stride(),
        }
    }
}

impl Default for AnsweringConfig {
    fn default() -> Self {
        Self {
            min_context_chars: default_min_context_chars(),
            summary_max_blocks: default_summary_max_blocks(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., APP__RETRIEVAL__TOP_K=8
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}
