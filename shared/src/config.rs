//! Configuration management for the event Lambda.

use std::env;

use crate::{Error, Result};

/// Sheet used when `SHEET_NAME` is not set.
pub const DEFAULT_SHEET_NAME: &str = "work05_sche";

/// Sheets API root used when `SHEETS_API_BASE` is not set.
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Where the service account credentials come from.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialSource {
    /// Email and PEM private key given directly in the environment
    Env { client_email: String, private_key: String },
    /// JSON key stored in AWS Secrets Manager
    SecretsManager { secret_arn: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Spreadsheet holding the schedule
    pub spreadsheet_id: String,
    /// Sheet (tab) name inside the spreadsheet
    pub sheet_name: String,
    /// Sheets API base URL
    pub sheets_api_base: String,
    /// Service account credentials
    pub credentials: CredentialSource,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let spreadsheet_id = non_empty("SPREADSHEET_ID")
            .ok_or_else(|| Error::Config("SPREADSHEET_ID not set".to_string()))?;

        let credentials = match non_empty("SERVICE_ACCOUNT_SECRET_ARN") {
            Some(secret_arn) => CredentialSource::SecretsManager { secret_arn },
            None => {
                let client_email = non_empty("SERVICE_ACCOUNT_EMAIL").ok_or_else(|| {
                    Error::Config(
                        "SERVICE_ACCOUNT_EMAIL not set (or set SERVICE_ACCOUNT_SECRET_ARN)"
                            .to_string(),
                    )
                })?;
                let private_key = non_empty("PRIVATE_KEY")
                    .ok_or_else(|| Error::Config("PRIVATE_KEY not set".to_string()))?;

                CredentialSource::Env {
                    client_email,
                    private_key: unescape_newlines(&private_key),
                }
            }
        };

        Ok(Self {
            spreadsheet_id,
            sheet_name: non_empty("SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
            sheets_api_base: non_empty("SHEETS_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SHEETS_API_BASE.to_string()),
            credentials,
        })
    }
}

/// PEM keys pasted into env vars usually carry literal `\n` sequences.
pub fn unescape_newlines(value: &str) -> String {
    value.replace("\\n", "\n")
}
