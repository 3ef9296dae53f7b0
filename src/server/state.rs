use std::sync::Arc;

use crate::fetch::HttpClient;
use crate::infra::portal::client::PortalClient;

/// Shared by every request. Per-request credentials are layered on with
/// [`PortalClient::authorized`].
pub struct AppState<C> {
    pub portal: PortalClient<C>,
}

impl<C: HttpClient> AppState<C> {
    pub fn new(portal: PortalClient<C>) -> Arc<Self> {
        Arc::new(Self { portal })
    }
}
