//! Application configuration.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use click_core::normalize_path;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::logging::{LogFormat, LogLevel};

/// Application mode. Controls logging verbosity and error detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// No request logs, no error detail.
    Production,
    /// Like production, with request timing.
    Profile,
    /// Request logs and error detail.
    #[default]
    Development,
    /// Also logs every lifecycle phase.
    Debug,
    /// Also dumps request parameters.
    Trace,
}

impl Mode {
    /// Production and profile hide error detail from clients.
    pub fn is_production(&self) -> bool {
        matches!(self, Mode::Production | Mode::Profile)
    }

    /// Whether each request logs its path and elapsed time.
    pub fn logs_requests(&self) -> bool {
        *self != Mode::Production
    }

    /// Whether lifecycle phases are logged.
    pub fn logs_phases(&self) -> bool {
        *self >= Mode::Debug
    }

    /// Whether request parameters are dumped.
    pub fn logs_parameters(&self) -> bool {
        *self == Mode::Trace
    }

    /// Lowest request log level for the mode.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Mode::Production | Mode::Profile => LogLevel::Warn,
            Mode::Development => LogLevel::Info,
            Mode::Debug => LogLevel::Debug,
            Mode::Trace => LogLevel::Trace,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Production => "production",
            Mode::Profile => "profile",
            Mode::Development => "development",
            Mode::Debug => "debug",
            Mode::Trace => "trace",
        };
        f.write_str(name)
    }
}

impl FromStr for Mode {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" => Ok(Mode::Production),
            "profile" => Ok(Mode::Profile),
            "development" => Ok(Mode::Development),
            "debug" => Ok(Mode::Debug),
            "trace" => Ok(Mode::Trace),
            other => Err(ServerError::config(format!("unknown mode: {}", other))),
        }
    }
}

/// Application configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name, used in logs.
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub mode: Mode,

    /// Response character set.
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Prefix the application is mounted under, e.g. `/shop`.
    #[serde(default)]
    pub context_path: String,

    /// Headers added to every rendered page.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Page routes.
    #[serde(default)]
    pub pages: Vec<PageConfig>,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub log: LogConfig,

    /// Overrides for the default message catalogue.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
}

fn default_name() -> String {
    "click".to_string()
}

fn default_charset() -> String {
    "UTF-8".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            mode: Mode::default(),
            charset: default_charset(),
            context_path: String::new(),
            headers: BTreeMap::new(),
            pages: Vec::new(),
            session: SessionConfig::default(),
            log: LogConfig::default(),
            messages: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Create a default configuration for an application.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Load config from a TOML file, or JSON when the extension is `.json`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file, choosing the format by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Check the configuration for values the server cannot work with.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.charset.trim().is_empty() {
            return Err(ServerError::config("charset must not be empty"));
        }
        if !self.context_path.is_empty()
            && (!self.context_path.starts_with('/') || self.context_path.ends_with('/'))
        {
            return Err(ServerError::config(format!(
                "context_path must start with '/' and not end with '/': {}",
                self.context_path
            )));
        }

        let mut seen = HashSet::new();
        for page in &self.pages {
            if page.path.trim().is_empty() {
                return Err(ServerError::config("page path must not be empty"));
            }
            if page.page.trim().is_empty() {
                return Err(ServerError::config(format!(
                    "page {} has no page factory",
                    page.path
                )));
            }
            if !seen.insert(normalize_path(&page.path)) {
                return Err(ServerError::DuplicateRoute(normalize_path(&page.path)));
            }
        }

        let cookie = &self.session.cookie_name;
        if cookie.is_empty()
            || !cookie
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ServerError::config(format!(
                "invalid session cookie name: {:?}",
                cookie
            )));
        }
        if self.session.idle_timeout_secs <= 0 {
            return Err(ServerError::config("session idle timeout must be positive"));
        }
        Ok(())
    }

    /// Set the application mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the context path.
    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    /// Set the response character set.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Add a header sent with every rendered page.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Route a path to a named page factory.
    pub fn with_page(mut self, path: impl Into<String>, page: impl Into<String>) -> Self {
        self.pages.push(PageConfig::new(path, page));
        self
    }

    /// Add a page route entry.
    pub fn with_page_config(mut self, page: PageConfig) -> Self {
        self.pages.push(page);
        self
    }

    /// Set the session settings.
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Set the log settings.
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Override a message catalogue entry.
    pub fn with_message(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.messages.insert(key.into(), text.into());
        self
    }

    /// Request log level: the configured level, lowered by the mode.
    pub fn log_level(&self) -> LogLevel {
        self.log.level.min(self.mode.log_level())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// One page route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Request path, e.g. `/customers.htm`.
    pub path: String,

    /// Name of the registered page factory.
    pub page: String,

    /// Headers added to this page's responses.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Template name; defaults to the path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl PageConfig {
    /// Route `path` to the factory named `page`.
    pub fn new(path: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            page: page.into(),
            headers: BTreeMap::new(),
            template: None,
        }
    }

    /// Add a response header for this page.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the template name.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Seconds of inactivity before a session expires.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: i64,
}

fn default_cookie_name() -> String {
    "CLICKSESSIONID".to_string()
}

fn default_idle_timeout() -> i64 {
    30 * 60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

/// Request log settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub level: LogLevel,
}

/// Default configuration written by `click config --init`.
pub fn generate_default_config(name: &str) -> String {
    let config = AppConfig::new(name).with_page("/home.htm", "home");
    toml::to_string_pretty(&config).unwrap_or_default()
}
