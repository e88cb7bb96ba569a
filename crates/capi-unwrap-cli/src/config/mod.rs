//! Configuration loading and resolution.

/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default number of attempts per fetch, each with a fresh timestamp.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default browser user-agent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/138.0.0.0 Safari/537.36";

/// Settings for the HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub user_agent: String,
    /// Request header carrying the millisecond timestamp.
    pub timestamp_header: String,
    /// Response header carrying the key envelope.
    pub key_header: String,
    pub origin: String,
    pub referer: String,
    pub language: String,
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timestamp_header: "cache-ts-v2".to_string(),
            key_header: "user".to_string(),
            origin: "https://www.coinglass.com".to_string(),
            referer: "https://www.coinglass.com/".to_string(),
            language: "zh".to_string(),
            accept_language: "zh-CN,zh;q=0.9".to_string(),
        }
    }
}

/// Overrides taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub timeout_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub user_agent: Option<String>,
}

/// Resolve the fetch configuration: explicit flags, then environment, then defaults.
pub fn resolve_fetch_config(overrides: &ConfigOverrides) -> FetchConfig {
    resolve_with_env(overrides, |name| std::env::var(name).ok())
}

fn resolve_with_env<F>(overrides: &ConfigOverrides, env: F) -> FetchConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = FetchConfig::default();

    if let Some(ms) = overrides
        .timeout_ms
        .or_else(|| parse_env(&env, "CAPI_TIMEOUT_MS"))
    {
        config.timeout_ms = ms;
    }

    if let Some(n) = overrides
        .max_attempts
        .or_else(|| parse_env(&env, "CAPI_MAX_ATTEMPTS"))
    {
        config.max_attempts = n.max(1);
    }

    if let Some(ua) = overrides
        .user_agent
        .clone()
        .or_else(|| env("CAPI_USER_AGENT"))
    {
        config.user_agent = ua;
    }

    config
}

fn parse_env<F, T>(env: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = env(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring {name}={raw:?}: not a number");
            None
        }
    }
}
