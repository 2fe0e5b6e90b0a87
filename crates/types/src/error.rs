//! Error taxonomy shared by the relay engine and its HTTP surface.

use thiserror::Error;

/// Every failure the relay can report for a trigger or callback.
///
/// Nothing is retried and nothing is rolled back; callers receive the
/// rendered message together with the stable [`RelayError::code`].
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Malformed request body: {reason}")]
    MalformedRequestBody { reason: String },

    #[error("Unable to find Timeseries: {series_id:?}")]
    SeriesNotFound { series_id: String, status: u16 },

    #[error("Upstream unavailable: {target}: {reason}")]
    UpstreamUnavailable { target: String, reason: String },

    #[error("Unable to get data for Timeseries: {series_id:?}")]
    DataFetchFailed {
        series_id: String,
        #[source]
        source: Box<RelayError>,
    },

    #[error("No transformation route configured for function {function:?}")]
    UnknownFunction { function: String },

    #[error("Unable to trigger Extension: {extension:?}-{route:?}")]
    DispatchRejected { extension: String, route: String, status: u16 },

    #[error("Unable to save data for Timeseries: {series_id:?}")]
    WriteFailed {
        series_id: String,
        #[source]
        source: Box<RelayError>,
    },
}

impl RelayError {
    pub fn malformed_request_body(reason: impl Into<String>) -> Self {
        Self::MalformedRequestBody { reason: reason.into() }
    }

    pub fn series_not_found(series_id: impl Into<String>, status: u16) -> Self {
        Self::SeriesNotFound {
            series_id: series_id.into(),
            status,
        }
    }

    pub fn upstream_unavailable(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a fetch failure for an input series.
    pub fn data_fetch_failed(series_id: impl Into<String>, source: RelayError) -> Self {
        Self::DataFetchFailed {
            series_id: series_id.into(),
            source: Box::new(source),
        }
    }

    pub fn unknown_function(function: impl Into<String>) -> Self {
        Self::UnknownFunction { function: function.into() }
    }

    pub fn dispatch_rejected(extension: impl Into<String>, route: impl Into<String>, status: u16) -> Self {
        Self::DispatchRejected {
            extension: extension.into(),
            route: route.into(),
            status,
        }
    }

    /// Wrap a write failure for an output series.
    pub fn write_failed(series_id: impl Into<String>, source: RelayError) -> Self {
        Self::WriteFailed {
            series_id: series_id.into(),
            source: Box::new(source),
        }
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedRequestBody { .. } => "MALFORMED_REQUEST_BODY",
            Self::SeriesNotFound { .. } => "SERIES_NOT_FOUND",
            Self::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            Self::DataFetchFailed { .. } => "DATA_FETCH_FAILED",
            Self::UnknownFunction { .. } => "UNKNOWN_FUNCTION",
            Self::DispatchRejected { .. } => "DISPATCH_REJECTED",
            Self::WriteFailed { .. } => "WRITE_FAILED",
        }
    }
}
