use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CHATKIT_SESSION_ENDPOINT: &str = "https://api.openai.com/v1/chatkit/sessions";

/// Process-wide credential consulted when no ChatKit key is configured.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not configured")]
    MissingRequiredSetting(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub conversation: ConversationSettings,
    pub ask: AskSettings,
    pub chatkit: ChatKitSettings,
    pub email: EmailSettings,
    /// Snapshot of `OPENAI_API_KEY` taken at load time.
    #[serde(skip)]
    pub fallback_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationSettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub use_file_search: bool,
    pub timeout_secs: u64,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            use_file_search: false,
            timeout_secs: 60,
        }
    }
}

/// Legacy `/chat/ask` contract: same backend shape, file search on unless the caller opts out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AskSettings {
    pub endpoint: Option<String>,
    pub use_file_search: bool,
}

impl Default for AskSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            use_file_search: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatKitSettings {
    pub api_key: Option<String>,
    pub workflow_id: Option<String>,
    pub workflow_version: Option<String>,
    pub session_endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ChatKitSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            workflow_id: None,
            workflow_version: None,
            session_endpoint: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub resend_api_key: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRoute {
    Message,
    Ask,
}

/// Everything one chat route needs to reach its backend.
#[derive(Debug, Clone)]
pub struct ChatProfile {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub default_use_file_search: bool,
    pub timeout: Duration,
}

impl ChatProfile {
    pub fn endpoint(&self) -> Result<&str, ConfigError> {
        non_blank(self.endpoint.as_deref())
            .ok_or(ConfigError::MissingRequiredSetting("conversation API endpoint"))
    }

    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim() {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" => Ok(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}

fn parse_num<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("ignoring unreadable .env file: {}", e);
            }
        }

        Self::load_from(Path::new("."), |key| std::env::var(key).ok())
    }

    /// Discovers the config file under `base`, reads it and overlays `env`.
    pub fn load_from<F>(base: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content = match Self::find_config_file(base, &env) {
            Some(path) => {
                tracing::info!("loading configuration from {}", path.display());
                Some(
                    std::fs::read_to_string(&path)
                        .map_err(|source| ConfigError::Read { path, source })?,
                )
            }
            None => None,
        };

        Self::from_sources(content.as_deref(), env)
    }

    /// Builds settings from TOML text (if any) overlaid with values from `env`.
    pub fn from_sources<F>(toml_src: Option<&str>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings: Settings = match toml_src {
            Some(src) => toml::from_str(src)?,
            None => Settings::default(),
        };
        settings.apply_env(&env)?;
        Ok(settings)
    }

    fn apply_env<F>(&mut self, env: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("GATEWAY_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("GATEWAY_PORT") {
            self.server.port = parse_num("GATEWAY_PORT", &v)?;
        }

        if let Some(v) = get("CONVERSATION_API_ENDPOINT") {
            self.conversation.endpoint = Some(v);
        }
        if let Some(v) = get("CONVERSATION_API_KEY") {
            self.conversation.api_key = Some(v);
        }
        if let Some(v) = get("CONVERSATION_USE_FILE_SEARCH") {
            self.conversation.use_file_search = parse_bool("CONVERSATION_USE_FILE_SEARCH", &v)?;
        }
        if let Some(v) = get("CONVERSATION_TIMEOUT_SECS") {
            self.conversation.timeout_secs = parse_num("CONVERSATION_TIMEOUT_SECS", &v)?;
        }

        if let Some(v) = get("ASK_API_ENDPOINT") {
            self.ask.endpoint = Some(v);
        }
        if let Some(v) = get("ASK_USE_FILE_SEARCH") {
            self.ask.use_file_search = parse_bool("ASK_USE_FILE_SEARCH", &v)?;
        }

        if let Some(v) = get("CHATKIT_API_KEY") {
            self.chatkit.api_key = Some(v);
        }
        if let Some(v) = get("CHATKIT_WORKFLOW_ID") {
            self.chatkit.workflow_id = Some(v);
        }
        if let Some(v) = get("CHATKIT_WORKFLOW_VERSION") {
            self.chatkit.workflow_version = Some(v);
        }
        if let Some(v) = get("CHATKIT_SESSION_ENDPOINT") {
            self.chatkit.session_endpoint = Some(v);
        }
        if let Some(v) = get("CHATKIT_TIMEOUT_SECS") {
            self.chatkit.timeout_secs = parse_num("CHATKIT_TIMEOUT_SECS", &v)?;
        }

        if let Some(v) = get("RESEND_API_KEY") {
            self.email.resend_api_key = Some(v);
        }
        if let Some(v) = get("CONTACT_EMAIL_FROM") {
            self.email.from = Some(v);
        }
        if let Some(v) = get("CONTACT_EMAIL_TO") {
            self.email.to = Some(v);
        }

        self.fallback_api_key = get(OPENAI_API_KEY_ENV);
        Ok(())
    }

    /// `GATEWAY_CONFIG` wins when it names an existing file, then
    /// `custom-config.toml`, then `config.toml`, all relative to `base`.
    fn find_config_file<F>(base: &Path, env: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(explicit) = env("GATEWAY_CONFIG").filter(|v| !v.trim().is_empty()) {
            let path = base.join(explicit.trim());
            if path.is_file() {
                return Some(path);
            }
            tracing::warn!("GATEWAY_CONFIG points at missing file {}", path.display());
        }

        ["custom-config.toml", "config.toml"]
            .iter()
            .map(|name| base.join(name))
            .find(|p| p.is_file())
    }

    pub fn chat_profile(&self, route: ChatRoute) -> ChatProfile {
        let timeout = Duration::from_secs(self.conversation.timeout_secs);
        match route {
            ChatRoute::Message => ChatProfile {
                endpoint: self.conversation.endpoint.clone(),
                api_key: self.conversation.api_key.clone(),
                default_use_file_search: self.conversation.use_file_search,
                timeout,
            },
            ChatRoute::Ask => ChatProfile {
                endpoint: non_blank(self.ask.endpoint.as_deref())
                    .or(self.conversation.endpoint.as_deref())
                    .map(str::to_string),
                api_key: self.conversation.api_key.clone(),
                default_use_file_search: self.ask.use_file_search,
                timeout,
            },
        }
    }

    pub fn chatkit_workflow_id(&self) -> Result<&str, ConfigError> {
        non_blank(self.chatkit.workflow_id.as_deref())
            .ok_or(ConfigError::MissingRequiredSetting("ChatKit workflow id"))
    }

    pub fn chatkit_workflow_version(&self) -> Option<&str> {
        non_blank(self.chatkit.workflow_version.as_deref())
    }

    /// Configured key first, then the `OPENAI_API_KEY` snapshot.
    pub fn chatkit_api_key(&self) -> Result<&str, ConfigError> {
        non_blank(self.chatkit.api_key.as_deref())
            .or_else(|| non_blank(self.fallback_api_key.as_deref()))
            .ok_or(ConfigError::MissingRequiredSetting("OpenAI API key"))
    }

    pub fn chatkit_session_endpoint(&self) -> &str {
        non_blank(self.chatkit.session_endpoint.as_deref())
            .unwrap_or(DEFAULT_CHATKIT_SESSION_ENDPOINT)
    }

    pub fn chatkit_timeout(&self) -> Duration {
        Duration::from_secs(self.chatkit.timeout_secs)
    }
}
