//! Static address derivation for storage adapters and transformation services.
//!
//! Both mappings are plain data: adding a value type or a function is a
//! configuration change, never a new code branch.

use extrelay_types::{RelayError, SeriesRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Placeholder substituted with the lower-cased series value type.
pub const VALUE_TYPE_PLACEHOLDER: &str = "{valueType}";

/// Placeholder substituted with a function's route segment.
pub const ROUTE_PLACEHOLDER: &str = "{route}";

pub const DEFAULT_STORAGE_URL_TEMPLATE: &str = "http://adapter-{valueType}.default.svc.cluster.local";
pub const DEFAULT_TRANSFORMATION_URL_TEMPLATE: &str = "http://transformation-{route}.default.svc.cluster.local";

/// Derives a storage adapter address from a series' value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoutes {
    template: String,
}

impl StorageRoutes {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    /// Base address of the adapter owning `value_type`.
    pub fn base_url(&self, value_type: &str) -> String {
        self.template.replace(VALUE_TYPE_PLACEHOLDER, &value_type.to_lowercase())
    }

    /// Address of a series, with the caller's query appended verbatim when present.
    pub fn series_url(&self, series: &SeriesRef, query: Option<&str>) -> String {
        let url = format!("{}/timeseries/{}", self.base_url(&series.value_type), series.timeseries_id);
        match non_empty(query) {
            Some(query) => format!("{url}?{query}"),
            None => url,
        }
    }
}

impl Default for StorageRoutes {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_URL_TEMPLATE)
    }
}

/// Derives a transformation service address from a route segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationRoutes {
    template: String,
}

impl TransformationRoutes {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    /// Dispatch address for `route`, carrying the correlation token and any caller query.
    pub fn dispatch_url(&self, route: &str, token: &str, query: Option<&str>) -> String {
        let host = self.template.replace(ROUTE_PLACEHOLDER, route);
        let url = format!("{host}/extension/transformation/{route}?token={token}");
        match non_empty(query) {
            Some(query) => format!("{url}&{query}"),
            None => url,
        }
    }
}

impl Default for TransformationRoutes {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSFORMATION_URL_TEMPLATE)
    }
}

/// Maps externally visible function names to internal route segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionRoutes(IndexMap<String, String>);

impl FunctionRoutes {
    pub fn new(routes: IndexMap<String, String>) -> Self {
        Self(routes)
    }

    /// Route segment for `function`, or [`RelayError::UnknownFunction`].
    pub fn route_for(&self, function: &str) -> Result<&str, RelayError> {
        self.0
            .get(function)
            .map(String::as_str)
            .ok_or_else(|| RelayError::unknown_function(function))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(function, route)| (function.as_str(), route.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FunctionRoutes {
    fn default() -> Self {
        Self(IndexMap::from([(
            "AggregateAccumulative".to_string(),
            "aggregate-accumulative".to_string(),
        )]))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for FunctionRoutes {
    fn from(entries: [(&str, &str); N]) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(function, route)| (function.to_string(), route.to_string()))
                .collect(),
        )
    }
}

fn non_empty(query: Option<&str>) -> Option<&str> {
    query.filter(|query| !query.is_empty())
}
