mod basic;
mod client;
mod error;
mod user_agent;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use error::FetchError;
pub use user_agent::UserAgent;

use reqwest::header::{ACCEPT, HeaderValue};

/// GETs `url` and returns the body of a successful (2xx) response.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Vec<u8>, FetchError> {
    let parsed = url
        .parse()
        .map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
    let mut req = reqwest::Request::new(reqwest::Method::GET, parsed);
    req.headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/geo+json"));

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    Ok(resp.bytes().await?.to_vec())
}
