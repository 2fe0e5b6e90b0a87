use extrelay_api::{ApiError, RelayClient};
use extrelay_types::{Point, RelayError, SeriesRef};
use tracing::{debug, warn};

use super::SeriesStore;
use crate::routing::StorageRoutes;

/// [`SeriesStore`] speaking the adapters' `/timeseries/{id}` HTTP interface.
#[derive(Debug, Clone)]
pub struct HttpSeriesStore {
    client: RelayClient,
    routes: StorageRoutes,
}

impl HttpSeriesStore {
    pub fn new(client: RelayClient, routes: StorageRoutes) -> Self {
        Self { client, routes }
    }
}

#[async_trait::async_trait]
impl SeriesStore for HttpSeriesStore {
    async fn fetch(&self, series: &SeriesRef, query: Option<&str>) -> Result<Vec<Point>, RelayError> {
        let url = self.routes.series_url(series, query);
        debug!(series = %series.timeseries_id, %url, "fetching data points");
        self.client
            .get_json::<Vec<Point>>(&url)
            .await
            .map_err(|error| storage_error(series, error))
    }

    async fn write(&self, series: &SeriesRef, points: &[Point]) -> Result<(), RelayError> {
        let url = self.routes.series_url(series, None);
        debug!(series = %series.timeseries_id, %url, points = points.len(), "saving data points");
        self.client
            .post_json(&url, points)
            .await
            .map_err(|error| storage_error(series, error))
    }
}

fn storage_error(series: &SeriesRef, error: ApiError) -> RelayError {
    warn!(series = %series.timeseries_id, %error, "storage adapter call failed");
    match error {
        ApiError::Status { status, .. } => RelayError::series_not_found(&series.timeseries_id, status.as_u16()),
        ApiError::Unreachable { url, source } => RelayError::upstream_unavailable(url, source.to_string()),
        ApiError::Decode { url, source } => RelayError::upstream_unavailable(url, format!("invalid response body: {source}")),
    }
}
