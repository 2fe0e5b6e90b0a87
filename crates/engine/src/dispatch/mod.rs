//! Function Dispatcher: route lookup and delivery of parameter bundles.

mod http;

pub use http::HttpTransformationService;

use std::sync::Arc;

use extrelay_types::{FunctionParams, RelayError};
use tracing::info;

use crate::routing::FunctionRoutes;

/// Delivers a parameter bundle to the transformation service behind `route`.
///
/// Implementations fail with [`RelayError::UpstreamUnavailable`] on transport
/// failure and [`RelayError::DispatchRejected`] on a non-success status.
#[async_trait::async_trait]
pub trait TransformationService: Send + Sync {
    async fn deliver(&self, route: &str, params: &FunctionParams, token: &str, query: Option<&str>) -> Result<(), RelayError>;
}

/// Resolves function names through a static table and hands bundles to a
/// [`TransformationService`].
#[derive(Clone)]
pub struct FunctionDispatcher {
    routes: FunctionRoutes,
    service: Arc<dyn TransformationService>,
}

impl FunctionDispatcher {
    pub fn new(routes: FunctionRoutes, service: Arc<dyn TransformationService>) -> Self {
        Self { routes, service }
    }

    /// Route segment configured for `function`.
    pub fn route_for(&self, function: &str) -> Result<&str, RelayError> {
        self.routes.route_for(function)
    }

    /// Deliver `params` to the service owning its function.
    ///
    /// Unknown functions fail before any outbound call is made.
    pub async fn dispatch(&self, params: &FunctionParams, token: &str, query: Option<&str>) -> Result<(), RelayError> {
        let route = self.route_for(&params.function)?;
        info!(
            extension = %params.extension,
            function = %params.function,
            %route,
            %token,
            "dispatching to transformation service"
        );
        self.service.deliver(route, params, token, query).await
    }
}
