//! Process-wide configuration, read once at startup

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use super::Environment;

/// Default `OpenAI` chat model
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
/// Default `OpenAI` API root
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default `MediaWiki` action API endpoint (geo search)
const DEFAULT_WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";
/// Default Wikipedia REST API root (page summaries)
const DEFAULT_WIKIPEDIA_REST_URL: &str = "https://en.wikipedia.org/api/rest_v1";
/// Default port, matching what the mobile clients are configured for
const DEFAULT_PORT: u16 = 5000;
/// Default timeout for each outbound HTTP call
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
/// Default lifetime of the cached builtin persona listing
const DEFAULT_BUILTIN_CACHE_TTL_SECS: u64 = 5 * 60;
/// Default lifetime of a cached commentary (24 hours)
const DEFAULT_COMMENT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
/// Default number of cached commentaries
const DEFAULT_COMMENT_CACHE_CAPACITY: usize = 100;

/// Configuration handed to every component at construction.
///
/// Built once by [`AppConfig::from_env`]; nothing below `main` reads the
/// process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `OpenAI` API key. Without it every generation falls back.
    pub openai_api_key: Option<String>,
    /// `OpenAI` chat model name
    pub openai_model: String,
    /// `OpenAI` API root, without trailing slash
    pub openai_base_url: String,
    /// `MediaWiki` action API endpoint used for geo search
    pub wikipedia_api_url: String,
    /// Wikipedia REST API root used for page summaries
    pub wikipedia_rest_url: String,
    /// Directory holding custom persona records; `None` keeps them in memory
    pub persona_dir: Option<PathBuf>,
    /// Accepted values for the `X-API-KEY` header; empty disables the check
    pub client_api_keys: Vec<String>,
    /// Timeout applied to each outbound HTTP call
    pub http_timeout: Duration,
    /// Lifetime of the cached builtin persona listing
    pub builtin_cache_ttl: Duration,
    /// Lifetime of a cached commentary
    pub comment_cache_ttl: Duration,
    /// Maximum number of cached commentaries
    pub comment_cache_capacity: usize,
    /// Port the HTTP server binds to
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            wikipedia_api_url: DEFAULT_WIKIPEDIA_API_URL.to_string(),
            wikipedia_rest_url: DEFAULT_WIKIPEDIA_REST_URL.to_string(),
            persona_dir: None,
            client_api_keys: Vec::new(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            builtin_cache_ttl: Duration::from_secs(DEFAULT_BUILTIN_CACHE_TTL_SECS),
            comment_cache_ttl: Duration::from_secs(DEFAULT_COMMENT_CACHE_TTL_SECS),
            comment_cache_capacity: DEFAULT_COMMENT_CACHE_CAPACITY,
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse, or if
    /// `OPENAI_API_KEY` / `CLIENT_API_KEYS` are missing in an environment that
    /// requires credentials
    pub fn from_env(environment: &Environment) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let openai_api_key = non_empty_var("OPENAI_API_KEY");
        let client_api_keys: Vec<String> = non_empty_var("CLIENT_API_KEYS")
            .map(|keys| {
                keys.split(',')
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if environment.requires_credentials() {
            anyhow::ensure!(
                openai_api_key.is_some(),
                "OPENAI_API_KEY environment variable is missing"
            );
            anyhow::ensure!(
                !client_api_keys.is_empty(),
                "CLIENT_API_KEYS environment variable is missing"
            );
        }

        Ok(Self {
            openai_api_key,
            openai_model: non_empty_var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: non_empty_var("OPENAI_BASE_URL")
                .map_or(defaults.openai_base_url, |url| trim_url(&url)),
            wikipedia_api_url: non_empty_var("WIKIPEDIA_API_URL")
                .unwrap_or(defaults.wikipedia_api_url),
            wikipedia_rest_url: non_empty_var("WIKIPEDIA_REST_URL")
                .map_or(defaults.wikipedia_rest_url, |url| trim_url(&url)),
            persona_dir: non_empty_var("PERSONA_DIR").map(PathBuf::from),
            client_api_keys,
            http_timeout: parse_var::<u64>("HTTP_TIMEOUT_SECS")?
                .map_or(defaults.http_timeout, Duration::from_secs),
            builtin_cache_ttl: parse_var::<u64>("BUILTIN_CACHE_TTL_SECS")?
                .map_or(defaults.builtin_cache_ttl, Duration::from_secs),
            comment_cache_ttl: parse_var::<u64>("COMMENT_CACHE_TTL_SECS")?
                .map_or(defaults.comment_cache_ttl, Duration::from_secs),
            comment_cache_capacity: parse_var("COMMENT_CACHE_CAPACITY")?
                .unwrap_or(defaults.comment_cache_capacity),
            port: parse_var("PORT")?.unwrap_or(defaults.port),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn parse_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    non_empty_var(name)
        .map(|val| val.parse::<T>())
        .transpose()
        .with_context(|| format!("Invalid value for {name}"))
}

fn trim_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
