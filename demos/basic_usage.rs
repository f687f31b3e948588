//! Lists the root folder and reads a range from a spreadsheet
//!
//! ```text
//! CLOUDOC_APP_ID=cli_xxx CLOUDOC_APP_SECRET=xxx \
//!     cargo run --example basic_usage -- <spreadsheet token> <range>
//! ```

use anyhow::{Context, Result};
use cloudoc::api::{DocType, RangeValues};
use cloudoc::http::HttpRequest;
use cloudoc::{AppIdentity, Client, ClientConfig, Response};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let identity = AppIdentity::from_env()
        .context("CLOUDOC_APP_ID and CLOUDOC_APP_SECRET must be set")?;
    let config = ClientConfig::load()?;
    let client = Client::with_config(identity, config);

    let root = client.get_root_folder_meta().await?;
    tracing::info!(token = %root.data.token, "Root folder");

    let children = client
        .get_folder_children(&root.data.token, &[DocType::Sheet])
        .await?;
    for child in children.data.children.values() {
        println!("{}\t{}", child.token, child.name);
    }

    let mut args = std::env::args().skip(1);
    if let (Some(sheet), Some(range)) = (args.next(), args.next()) {
        let values = read_range_with_retry(&client, &sheet, &range).await?;
        for row in values.data.value_range.values {
            println!("{row:?}");
        }
    }

    Ok(())
}

/// Reads a range, resending once if the service revoked the token
///
/// Reads are safe to resend. Only the token that was actually sent is
/// invalidated, so a refresh made by another task in between survives.
async fn read_range_with_retry(
    client: &Client,
    sheet: &str,
    range: &str,
) -> Result<Response<RangeValues>> {
    let url = client.url(&format!(
        "/open-apis/sheets/v2/spreadsheets/{}/values/{}",
        urlencoding::encode(sheet),
        urlencoding::encode(range)
    ));

    let sent = client.get_access_token().await?;
    let body = match client.execute(HttpRequest::get(&url), &sent).await {
        Err(err) if err.is_token_expired() => {
            client.invalidate_token(&sent);
            let fresh = client.get_access_token().await?;
            client.execute(HttpRequest::get(&url), &fresh).await?
        }
        other => other?,
    };

    Ok(serde_json::from_slice(&body)?)
}
