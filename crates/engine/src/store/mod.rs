//! Data Fetcher and Data Writer for per-value-type storage adapters.

mod http;

pub use http::HttpSeriesStore;

use extrelay_types::{Point, RelayError, SeriesRef};

/// Reads and writes the points of a single series.
///
/// Implementations fail with [`RelayError::UpstreamUnavailable`] when the
/// adapter cannot be reached and [`RelayError::SeriesNotFound`] when it
/// answers with a non-success status.
#[async_trait::async_trait]
pub trait SeriesStore: Send + Sync {
    /// Fetch the current points of `series`, forwarding `query` verbatim.
    async fn fetch(&self, series: &SeriesRef, query: Option<&str>) -> Result<Vec<Point>, RelayError>;

    /// Upsert `points` into `series` as one call; the adapter accepts all or nothing.
    async fn write(&self, series: &SeriesRef, points: &[Point]) -> Result<(), RelayError>;
}
