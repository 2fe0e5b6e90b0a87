use extrelay_api::{ApiError, RelayClient};
use extrelay_types::{FunctionParams, RelayError};
use tracing::{debug, warn};

use super::TransformationService;
use crate::routing::TransformationRoutes;

/// [`TransformationService`] posting bundles to
/// `/extension/transformation/{route}?token={token}`.
#[derive(Debug, Clone)]
pub struct HttpTransformationService {
    client: RelayClient,
    routes: TransformationRoutes,
}

impl HttpTransformationService {
    pub fn new(client: RelayClient, routes: TransformationRoutes) -> Self {
        Self { client, routes }
    }
}

#[async_trait::async_trait]
impl TransformationService for HttpTransformationService {
    async fn deliver(&self, route: &str, params: &FunctionParams, token: &str, query: Option<&str>) -> Result<(), RelayError> {
        let url = self.routes.dispatch_url(route, token, query);
        debug!(%url, inputs = params.input_variables.len(), outputs = params.output_variables.len(), "posting function params");
        self.client.post_json(&url, params).await.map_err(|error| {
            warn!(extension = %params.extension, %route, %error, "unable to trigger extension");
            match error {
                ApiError::Status { status, .. } => RelayError::dispatch_rejected(&params.extension, route, status.as_u16()),
                other => RelayError::upstream_unavailable(other.url(), other.to_string()),
            }
        })
    }
}
