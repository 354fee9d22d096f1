use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Every NWS call in the crate goes through
/// this trait, so wrappers (headers) and test fixtures slot in here.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
