mod client;
mod basic;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::{Result, bail};
use reqwest::header::{ACCEPT, HeaderValue};

/// GETs `url` through `client` and returns the body.
///
/// Non-2xx responses are errors; the body is logged at debug level.
pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    url: &str,
) -> Result<Vec<u8>> {
    let mut req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse()?,
    );
    req.headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/json"));

    let resp = client.execute(req).await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(%status, body = %body, "Non-success response body");
        bail!("request to {url} failed with status {status}");
    }

    Ok(resp.bytes().await?.to_vec())
}
