//! Environment configuration

use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a port number, got {value:?}")]
    InvalidPort { name: &'static str, value: String },
}

/// Runtime configuration read from `SURVEY_*` environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyConfig {
    pub roster_path: PathBuf,
    pub catalog_path: PathBuf,
    pub db_path: PathBuf,
    pub port: u16,
    /// Webhook receiving outbound messages; `None` logs them instead
    pub outbound_url: Option<String>,
    pub outbound_token: Option<String>,
}

impl SurveyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = lookup("SURVEY_DB_PATH").unwrap_or_else(|| {
            let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
            format!("{home}/.survey-bot/responses.db")
        });

        let port = match lookup("SURVEY_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidPort {
                name: "SURVEY_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            roster_path: lookup("SURVEY_ROSTER_PATH")
                .unwrap_or_else(|| "./contacts.json".to_string())
                .into(),
            catalog_path: lookup("SURVEY_CATALOG_PATH")
                .unwrap_or_else(|| "./questions.json".to_string())
                .into(),
            db_path: db_path.into(),
            port,
            outbound_url: lookup("SURVEY_OUTBOUND_URL").filter(|url| !url.trim().is_empty()),
            outbound_token: lookup("SURVEY_OUTBOUND_TOKEN").filter(|t| !t.is_empty()),
        })
    }
}
