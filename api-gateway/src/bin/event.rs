//! Event Lambda - Handles the /event endpoints of the weekly schedule.
//!
//! Events live in a Google Sheets tab; see `shared::store` for the mapping.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::{
    get_service_account_credentials, Config, CredentialSource, EventStore,
    ServiceAccountCredentials, ServiceAccountTokenProvider, SheetsClient, SHEETS_SCOPE,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    store: EventStore<SheetsClient>,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;

        let credentials = match &config.credentials {
            CredentialSource::Env {
                client_email,
                private_key,
            } => ServiceAccountCredentials {
                client_email: client_email.clone(),
                private_key: private_key.clone(),
                token_uri: shared::auth::GOOGLE_TOKEN_URI.to_string(),
            },
            CredentialSource::SecretsManager { secret_arn } => {
                let aws_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);
                get_service_account_credentials(&secrets_client, secret_arn).await?
            }
        };

        info!(
            spreadsheet = %config.spreadsheet_id,
            sheet = %config.sheet_name,
            service_account = %credentials.client_email,
            "Initializing event store"
        );

        let http_client = reqwest_client()?;
        let token_provider =
            ServiceAccountTokenProvider::new(http_client.clone(), credentials, SHEETS_SCOPE)?;
        let sheets = SheetsClient::new(
            http_client,
            token_provider,
            config.sheets_api_base.clone(),
            config.spreadsheet_id.clone(),
        );

        Ok(Self {
            store: EventStore::new(sheets, config.sheet_name),
        })
    }
}

fn reqwest_client() -> Result<reqwest::Client, Error> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?)
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    shared::api::route(&state.store, event).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
