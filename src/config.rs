use std::{fmt::Display, time::Duration};

use crate::quiz::session::DEFAULT_WINDOW;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { var: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "Expected {} in the environment", var),
            ConfigError::Invalid { var, value } => {
                write!(f, "{} must be a number of seconds, got `{}`", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings read once at startup.
#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub openai_timeout: Duration,
    pub quiz_window: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_timeout", &self.openai_timeout)
            .field("quiz_window", &self.quiz_window)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let required = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));
        let seconds = |var: &'static str, default: Duration| match get(var) {
            Some(value) => value
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid { var, value }),
            None => Ok(default),
        };

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openai_timeout: seconds("OPENAI_TIMEOUT_SECS", DEFAULT_TIMEOUT)?,
            quiz_window: seconds("QUIZ_WINDOW_SECS", DEFAULT_WINDOW)?,
        })
    }
}

pub trait OrExit<V> {
    /// Logs the error and terminates the process.
    fn or_exit(self) -> V;
}

impl<V, E: Display> OrExit<V> for std::result::Result<V, E> {
    fn or_exit(self) -> V {
        match self {
            Ok(v) => v,
            Err(e) => {
                log::error!("Fatal: {}", e);
                std::process::exit(1);
            }
        }
    }
}
