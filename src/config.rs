use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_EMAIL_HOST: &str = "imap.gmail.com";
pub const DEFAULT_EMAIL_PORT: u16 = 993;
pub const DEFAULT_FOLDER: &str = "INBOX";
pub const DEFAULT_BEDROCK_REGION: &str = "us-east-1";
pub const DEFAULT_BEDROCK_MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";
pub const DEFAULT_SINCE_HOURS: u32 = 24;

#[derive(Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub folder: String,
    pub use_tls: bool,
}

// Keep the password out of logs and error output.
impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("folder", &self.folder)
            .field("use_tls", &self.use_tls)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: String,
    pub model_id: String,
}

/// Process configuration, built once at startup and passed down by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub email: EmailConfig,
    pub bedrock: BedrockConfig,
    pub summary_since_hours: u32,
}

impl AppConfig {
    /// Builds the configuration from a key lookup (normally the process
    /// environment). Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| get(key).ok_or_else(|| anyhow!("{key} is not set"));

        let email = EmailConfig {
            host: get("EMAIL_HOST").unwrap_or_else(|| DEFAULT_EMAIL_HOST.to_string()),
            port: parse_or("EMAIL_PORT", get("EMAIL_PORT"), DEFAULT_EMAIL_PORT)?,
            username: required("EMAIL_USER")?,
            password: required("EMAIL_PASSWORD")?,
            folder: get("EMAIL_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            use_tls: match get("EMAIL_USE_TLS") {
                Some(v) => parse_flag("EMAIL_USE_TLS", &v)?,
                None => true,
            },
        };

        let bedrock = BedrockConfig {
            region: get("BEDROCK_REGION").unwrap_or_else(|| DEFAULT_BEDROCK_REGION.to_string()),
            model_id: get("BEDROCK_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_BEDROCK_MODEL_ID.to_string()),
        };

        let summary_since_hours = parse_or(
            "SUMMARY_SINCE_HOURS",
            get("SUMMARY_SINCE_HOURS"),
            DEFAULT_SINCE_HOURS,
        )?;

        Ok(Self {
            email,
            bedrock,
            summary_since_hours,
        })
    }
}

/// Loads `.env` (if present) and reads the configuration from the environment.
pub fn load_config() -> Result<AppConfig> {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(anyhow!("failed to read .env: {e}")),
    }
    AppConfig::from_lookup(|key| std::env::var(key).ok())
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(v) => v
            .parse()
            .map_err(|e| anyhow!("{key} has invalid value {v:?}: {e}")),
        None => Ok(default),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("{key} must be true or false, got {raw:?}")),
    }
}
