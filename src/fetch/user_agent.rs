use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, InvalidHeaderValue, USER_AGENT};

/// An [`HttpClient`] wrapper that stamps every request with a `User-Agent`.
///
/// api.weather.gov answers anonymous requests with `403`, so the production
/// client is always wrapped in this.
pub struct UserAgent<C> {
    inner: C,
    value: HeaderValue,
}

impl<C> UserAgent<C> {
    pub fn new(inner: C, agent: &str) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            inner,
            value: HeaderValue::from_str(agent)?,
        })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for UserAgent<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut().insert(USER_AGENT, self.value.clone());
        self.inner.execute(req).await
    }
}
