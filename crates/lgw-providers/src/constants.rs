//! Provider Constants
//!
//! Wire-level constants for the provider adapters. Gateway defaults live in
//! `lgw-domain` and `lgw-infrastructure`.

// ============================================================================
// HTTP HEADERS
// ============================================================================

/// JSON content type
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Header forwarded on every attempt when the caller supplies a key
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Anthropic API key header
pub const ANTHROPIC_API_KEY_HEADER: &str = "x-api-key";

/// Anthropic API version header
pub const ANTHROPIC_VERSION_HEADER: &str = "anthropic-version";

/// Anthropic API version sent with every request
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

// ============================================================================
// PROVIDER ENDPOINTS
// ============================================================================

/// OpenAI API root
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Anthropic API root
pub const ANTHROPIC_DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Local Ollama server root
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Voyage AI API root
pub const VOYAGEAI_DEFAULT_BASE_URL: &str = "https://api.voyageai.com/v1";

/// OpenAI-compatible chat completion path
pub const OPENAI_CHAT_PATH: &str = "/chat/completions";

/// OpenAI-compatible and VoyageAI embeddings path
pub const OPENAI_EMBEDDINGS_PATH: &str = "/embeddings";

/// Anthropic messages path
pub const ANTHROPIC_MESSAGES_PATH: &str = "/messages";

/// Ollama chat path
pub const OLLAMA_CHAT_PATH: &str = "/api/chat";

/// Ollama embeddings path
pub const OLLAMA_EMBED_PATH: &str = "/api/embed";

// ============================================================================
// SEARCH BACKEND ENDPOINTS
// ============================================================================

/// Search query path
pub const SEARCH_QUERY_PATH: &str = "/search";

/// Search backend health path
pub const SEARCH_HEALTH_PATH: &str = "/health";

/// Native index coverage path
pub const SEARCH_COVERAGE_PATH: &str = "/coverage";

// ============================================================================
// ERROR REPORTING
// ============================================================================

/// Maximum characters of an upstream error body kept in messages
pub const ERROR_BODY_PREVIEW_CHARS: usize = 512;
