use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clipforge_vendor::{PollSettings, ProviderError, ProviderKind, ProviderSettings};

/// Errors raised while loading [`ServerConfig`]. Any of these is fatal at
/// startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error(
        "REQUEST_TIMEOUT_SECS must be at least {required} \
         (POLL_TIMEOUT_SECS + POLL_INTERVAL_SECS + VENDOR_HTTP_TIMEOUT_SECS), got {configured}"
    )]
    RequestTimeoutTooShort { configured: u64, required: u64 },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Headroom added to the derived request timeout for reading the upload and
/// writing the response.
pub const REQUEST_TIMEOUT_HEADROOM_SECS: u64 = 30;

/// Server configuration loaded from environment variables.
///
/// Everything except the vendor API key has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds. Never shorter than the longest
    /// generation: vendor creation call plus poll budget plus one interval.
    /// Defaults to that sum plus [`REQUEST_TIMEOUT_HEADROOM_SECS`] (`393`
    /// with default settings).
    pub request_timeout_secs: u64,
    /// Largest accepted `/generate` body in bytes (default: 20 MiB).
    pub max_upload_bytes: usize,
    /// Directory holding `index.html` (default: `frontend`).
    pub static_dir: PathBuf,
    /// Vendor adapter selection and credentials.
    pub provider: ProviderSettings,
    /// Status polling interval and budget.
    pub poll: PollSettings,
}

impl ServerConfig {
    /// Load configuration from the process environment (and `.env`, if
    /// present).
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `5000`                     |
    /// | `CORS_ORIGINS`             | `*`                        |
    /// | `REQUEST_TIMEOUT_SECS`     | derived, see below         |
    /// | `MAX_UPLOAD_BYTES`         | `20971520`                 |
    /// | `STATIC_DIR`               | `frontend`                 |
    /// | `VIDEO_PROVIDER`           | `apimart`                  |
    /// | `APIMART_API_KEY`          | required for `apimart`     |
    /// | `OPENAI_API_KEY`           | required for `openai`      |
    /// | `VIDEO_API_BASE_URL`       | vendor default             |
    /// | `VIDEO_MODEL`              | vendor default             |
    /// | `VIDEO_ASPECT_RATIO`       | `16:9`                     |
    /// | `VIDEO_SIZE`               | `1280x720`                 |
    /// | `VENDOR_HTTP_TIMEOUT_SECS` | `60`                       |
    /// | `POLL_INTERVAL_SECS`       | `3`                        |
    /// | `POLL_TIMEOUT_SECS`        | `300`                      |
    ///
    /// The request timeout defaults to the sum of `POLL_TIMEOUT_SECS`,
    /// `POLL_INTERVAL_SECS` and `VENDOR_HTTP_TIMEOUT_SECS` plus headroom. An
    /// explicit value below that sum is rejected, since the HTTP layer would
    /// cut off a generation that is still within its poll budget.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&var, "PORT", 5000, "a valid port number")?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: Option<u64> =
            parse_opt(&var, "REQUEST_TIMEOUT_SECS", "a whole number of seconds")?;
        let max_upload_bytes: usize =
            parse_or(&var, "MAX_UPLOAD_BYTES", 20 * 1024 * 1024, "a byte count")?;
        let static_dir = PathBuf::from(var("STATIC_DIR").unwrap_or_else(|| "frontend".into()));

        let kind =
            ProviderKind::from_name(&var("VIDEO_PROVIDER").unwrap_or_else(|| "apimart".into()))?;
        let api_key = var(kind.api_key_env()).ok_or(ConfigError::Missing(kind.api_key_env()))?;
        let http_timeout_secs: u64 =
            parse_or(&var, "VENDOR_HTTP_TIMEOUT_SECS", 60, "a whole number of seconds")?;

        let provider = ProviderSettings {
            kind,
            api_key,
            base_url: var("VIDEO_API_BASE_URL"),
            model: var("VIDEO_MODEL"),
            aspect_ratio: var("VIDEO_ASPECT_RATIO").unwrap_or_else(|| "16:9".into()),
            size: var("VIDEO_SIZE").unwrap_or_else(|| "1280x720".into()),
            http_timeout: Duration::from_secs(http_timeout_secs),
        };

        let interval_secs: u64 =
            parse_or(&var, "POLL_INTERVAL_SECS", 3, "a whole number of seconds")?;
        if interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "POLL_INTERVAL_SECS",
                expected: "at least 1",
                value: "0".into(),
            });
        }
        let timeout_secs: u64 =
            parse_or(&var, "POLL_TIMEOUT_SECS", 300, "a whole number of seconds")?;

        let required = timeout_secs
            .saturating_add(interval_secs)
            .saturating_add(http_timeout_secs);
        let request_timeout_secs = match request_timeout_secs {
            None => required.saturating_add(REQUEST_TIMEOUT_HEADROOM_SECS),
            Some(configured) if configured < required => {
                return Err(ConfigError::RequestTimeoutTooShort {
                    configured,
                    required,
                })
            }
            Some(configured) => configured,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            static_dir,
            provider,
            poll: PollSettings {
                interval: Duration::from_secs(interval_secs),
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_or<T, F>(
    var: &F,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(var, name, expected)?.unwrap_or(default))
}

fn parse_opt<T, F>(
    var: &F,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}
