//! AWS Secrets Manager integration.

use aws_sdk_secretsmanager::Client as SecretsClient;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::auth::ServiceAccountCredentials;
use crate::config::unescape_newlines;
use crate::{Error, Result};

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    // Check cache first
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Get the Google service account key stored as JSON in Secrets Manager.
pub async fn get_service_account_credentials(
    client: &SecretsClient,
    secret_arn: &str,
) -> Result<ServiceAccountCredentials> {
    let secret_string = get_secret(client, secret_arn).await?;
    parse_service_account_credentials(&secret_string)
}

/// Parse a service account key, accepting keys with escaped newlines.
pub fn parse_service_account_credentials(json: &str) -> Result<ServiceAccountCredentials> {
    let mut credentials: ServiceAccountCredentials = serde_json::from_str(json)
        .map_err(|e| Error::Aws(format!("Failed to parse service account credentials: {}", e)))?;
    credentials.private_key = unescape_newlines(&credentials.private_key);
    Ok(credentials)
}
