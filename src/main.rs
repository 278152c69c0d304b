//! Operator command line.
//!
//! ```text
//! parlour-booking search <term>
//! parlour-booking assets <parlour-id>
//! ```
//!
//! Reads `API_BASE_URL`, `API_TOKEN`, `SEARCH_DEBOUNCE_MS` and
//! `HTTP_TIMEOUT_SECS` from the environment (or `.env`).

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parlour_booking::{
    config::AppConfig,
    http::HttpClient,
    services::{
        asset_admin_service,
        search_service::{SearchOutcome, SearchSession},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,parlour_booking=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let client = HttpClient::from_config(&config)?;

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();
    let rest: Vec<String> = args.collect();

    match command.as_str() {
        "search" => {
            let term = rest.join(" ");
            let session = SearchSession::new(Arc::new(client), config.api_token.clone())
                .with_quiet_period(config.search_debounce);
            match session.search(&term).await? {
                SearchOutcome::Results(items) => {
                    tracing::info!(term = %term, count = items.len(), "search finished");
                    for item in items {
                        println!("{}\t{}", item.external_id, item.title);
                    }
                }
                SearchOutcome::Superseded => {}
            }
        }
        "assets" => {
            let parlour_id = rest.first().context("usage: assets <parlour-id>")?;
            let token = config
                .api_token
                .as_deref()
                .context("API_TOKEN is required to list assets")?;
            let assets = asset_admin_service::list_assets(&client, token, parlour_id).await?;
            println!("{}", serde_json::to_string_pretty(&assets)?);
        }
        other => bail!("unknown command '{other}', expected `search <term>` or `assets <parlour-id>`"),
    }

    Ok(())
}
