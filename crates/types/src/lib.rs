//! Shared data model for the extension transformation relay.
//!
//! Every type here is request-scoped: it is decoded from an inbound body,
//! used to build exactly one downstream call, and dropped when the handler
//! returns. Field names follow the camelCase wire format spoken by the
//! storage adapters and transformation services.

mod error;
mod options;

pub use error::RelayError;
pub use options::Options;

use serde::{Deserialize, Serialize};

/// Addressing and classification data for a single time series.
///
/// The relay never mutates these attributes; they are copied verbatim from
/// the caller's catalog into every payload that references the series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesRef {
    /// Identifier of the series within its storage adapter.
    pub timeseries_id: String,
    pub module_id: String,
    /// Value type; selects the storage adapter that owns the series.
    pub value_type: String,
    pub parameter_id: String,
    pub location_id: String,
    pub timeseries_type: String,
    pub time_step_id: String,
}

/// A named slot in an extension's catalog bound to one series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Variable {
    pub variable_id: String,
    pub timeseries: SeriesRef,
}

impl Variable {
    pub fn new(variable_id: impl Into<String>, timeseries: SeriesRef) -> Self {
        Self {
            variable_id: variable_id.into(),
            timeseries,
        }
    }

    /// Identifier of the series this variable is bound to.
    pub fn series_id(&self) -> &str {
        &self.timeseries.timeseries_id
    }
}

/// A timestamped numeric sample. The timestamp is opaque to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub time: String,
    pub value: f64,
}

impl Point {
    pub fn new(time: impl Into<String>, value: f64) -> Self {
        Self { time: time.into(), value }
    }
}

/// A variable together with its data points, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundVariable {
    #[serde(flatten)]
    pub variable: Variable,
    #[serde(default)]
    pub data: Vec<Point>,
}

impl BoundVariable {
    pub fn new(variable: Variable, data: Vec<Point>) -> Self {
        Self { variable, data }
    }

    pub fn series(&self) -> &SeriesRef {
        &self.variable.timeseries
    }
}

/// Catalog and input/output bindings declared by an extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionData {
    /// Ordered references into `variables` whose data is fetched and sent.
    pub input_variables: Vec<String>,
    /// Ordered references into `variables` the transformation writes to.
    pub output_variables: Vec<String>,
    pub variables: Vec<Variable>,
}

/// Body of a trigger request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionDefinition {
    pub extension_id: String,
    pub extension: String,
    pub function: String,
    pub data: ExtensionData,
    pub options: Options,
}

/// Outbound request delivered to a transformation service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FunctionParams {
    pub extension_id: String,
    pub extension: String,
    pub function: String,
    /// Inputs carrying their fetched data.
    pub input_variables: Vec<BoundVariable>,
    /// Destinations only; no data is fetched for outputs.
    pub output_variables: Vec<Variable>,
    pub options: Options,
    /// Address the transformation service reports results to.
    pub callback: String,
    /// Correlation token echoed back on the callback route.
    pub token: String,
}

/// Body of a callback request.
///
/// Mirrors [`FunctionParams`] except that the output variables now carry the
/// computed data to be written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FunctionResponse {
    pub extension_id: String,
    pub extension: String,
    pub function: String,
    pub input_variables: Vec<BoundVariable>,
    pub output_variables: Vec<BoundVariable>,
    pub options: Options,
    pub callback: String,
    pub token: String,
}
