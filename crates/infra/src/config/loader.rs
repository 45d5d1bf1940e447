//! Configuration loader
//!
//! Loads the [`ClientConfig`] from an optional file and environment
//! overrides.
//!
//! ## Loading Strategy
//! 1. `GLUE_CONFIG_PATH` names a file explicitly; otherwise standard paths
//!    are probed
//! 2. Without a file, every field keeps its default
//! 3. `GLUE_*` environment variables override individual fields
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `GLUE_TIMEOUT_SECS`: Request timeout in seconds
//! - `GLUE_ACCEPT_INVALID_CERTS`: Skip certificate validation (true/false)
//! - `GLUE_FOLLOW_REDIRECTS`: Follow HTTP redirects (true/false)
//! - `GLUE_MAX_AUTH_ATTEMPTS`: Attempts for token acquisition
//! - `GLUE_AUTH_BACKOFF_BASE_MS`: Base delay of the token backoff
//! - `GLUE_REFRESH_WINDOW_SECS`: Proactive refresh window
//! - `GLUE_SAFETY_MARGIN_MS`: Subtracted from token lifetimes
//! - `GLUE_MAX_TRANSIENT_RETRIES`: Extra attempts for 429/timeouts/resets
//! - `GLUE_RETRY_BACKOFF_BASE_MS`: Base delay of the request backoff
//! - `GLUE_COALESCE_AUTHENTICATION`: Share in-flight authentication
//! - `GLUE_ERROR_PAYLOAD_POLICY`: `pass_through` or `raise`
//! - `GLUE_DEFAULT_PAGE_SIZE`: Page size used for offsets
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./glue.json`, `./glue.toml`, `./config.json`, `./config.toml`
//! 2. The same names in the parent directory
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use glue_domain::{ClientConfig, ErrorPayloadPolicy, GlueError, Result};

/// Explicit config file path
pub const CONFIG_PATH_VAR: &str = "GLUE_CONFIG_PATH";

const FILE_NAMES: [&str; 4] = ["glue.json", "glue.toml", "config.json", "config.toml"];

/// Load configuration: file (if any), then environment overrides
///
/// # Errors
/// Returns `GlueError::Config` if:
/// - `GLUE_CONFIG_PATH` points to a missing file
/// - The file format is invalid
/// - An override variable has an invalid value
pub fn load() -> Result<ClientConfig> {
    let explicit = std::env::var(CONFIG_PATH_VAR).ok().filter(|p| !p.trim().is_empty());

    let mut config = match explicit.map(PathBuf::from).or_else(probe_config_paths) {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            ClientConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Defaults plus environment overrides, ignoring config files
///
/// # Errors
/// Returns `GlueError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations via
/// [`probe_config_paths`].
///
/// # Errors
/// Returns `GlueError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GlueError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GlueError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GlueError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Apply every `GLUE_*` variable that is set
///
/// # Errors
/// Returns `GlueError::Config` naming the first variable that fails to
/// parse.
pub fn apply_env_overrides(config: &mut ClientConfig) -> Result<()> {
    override_parsed("GLUE_TIMEOUT_SECS", &mut config.timeout_secs)?;
    override_bool("GLUE_ACCEPT_INVALID_CERTS", &mut config.accept_invalid_certs);
    override_bool("GLUE_FOLLOW_REDIRECTS", &mut config.follow_redirects);
    override_parsed("GLUE_MAX_AUTH_ATTEMPTS", &mut config.max_auth_attempts)?;
    override_parsed("GLUE_AUTH_BACKOFF_BASE_MS", &mut config.auth_backoff_base_ms)?;
    override_parsed("GLUE_REFRESH_WINDOW_SECS", &mut config.refresh_window_secs)?;
    override_parsed("GLUE_SAFETY_MARGIN_MS", &mut config.safety_margin_ms)?;
    override_parsed("GLUE_MAX_TRANSIENT_RETRIES", &mut config.max_transient_retries)?;
    override_parsed("GLUE_RETRY_BACKOFF_BASE_MS", &mut config.retry_backoff_base_ms)?;
    override_bool("GLUE_COALESCE_AUTHENTICATION", &mut config.coalesce_authentication);
    override_parsed("GLUE_DEFAULT_PAGE_SIZE", &mut config.default_page_size)?;

    if let Some(raw) = env_value("GLUE_ERROR_PAYLOAD_POLICY") {
        config.error_payload_policy = match raw.to_ascii_lowercase().replace('-', "_").as_str() {
            "pass_through" | "passthrough" => ErrorPayloadPolicy::PassThrough,
            "raise" => ErrorPayloadPolicy::Raise,
            other => {
                return Err(GlueError::Config(format!(
                    "Invalid GLUE_ERROR_PAYLOAD_POLICY: {other}"
                )))
            }
        };
    }

    if config.max_auth_attempts == 0 {
        return Err(GlueError::Config("max_auth_attempts must be at least 1".to_string()));
    }

    Ok(())
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GlueError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GlueError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(GlueError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn override_parsed<T>(key: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = env_value(key) {
        *target = raw.parse().map_err(|e| GlueError::Config(format!("Invalid {key}: {e}")))?;
    }
    Ok(())
}

fn override_bool(key: &str, target: &mut bool) {
    *target = env_bool(key, *target);
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    env_value(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
