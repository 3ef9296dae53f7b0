use async_trait::async_trait;
use reqwest::{Request, Response};

/// Seam between the portal client and the network. Wrappers such as
/// [`ApiKey`](super::ApiKey) decorate requests before passing them on.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
