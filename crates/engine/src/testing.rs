//! In-memory collaborators recording every call made by the engine.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use extrelay_types::{ExtensionData, ExtensionDefinition, FunctionParams, Point, RelayError, SeriesRef, Variable};

use crate::dispatch::TransformationService;
use crate::store::SeriesStore;

/// Build an extension whose catalog binds each `(variable, series)` pair.
pub(crate) fn extension(catalog: &[(&str, &str)], inputs: &[&str], outputs: &[&str]) -> ExtensionDefinition {
    ExtensionDefinition {
        extension_id: "ext-1".into(),
        extension: "Transformation".into(),
        function: "AggregateAccumulative".into(),
        data: ExtensionData {
            input_variables: inputs.iter().map(|id| id.to_string()).collect(),
            output_variables: outputs.iter().map(|id| id.to_string()).collect(),
            variables: catalog
                .iter()
                .map(|(id, series)| {
                    Variable::new(
                        *id,
                        SeriesRef {
                            timeseries_id: series.to_string(),
                            value_type: "Scalar".into(),
                            ..Default::default()
                        },
                    )
                })
                .collect(),
        },
        ..Default::default()
    }
}

/// Series store answering from a map; unknown series are "not found".
#[derive(Default)]
pub(crate) struct MemoryStore {
    series: HashMap<String, Vec<Point>>,
    failing_writes: HashSet<String>,
    fetches: Mutex<Vec<(String, Option<String>)>>,
    write_attempts: Mutex<Vec<String>>,
    writes: Mutex<Vec<(String, Vec<Point>)>>,
}

impl MemoryStore {
    pub(crate) fn with_series(mut self, id: &str, points: Vec<Point>) -> Self {
        self.series.insert(id.to_string(), points);
        self
    }

    pub(crate) fn failing_writes_to(mut self, id: &str) -> Self {
        self.failing_writes.insert(id.to_string());
        self
    }

    pub(crate) fn fetches(&self) -> Vec<(String, Option<String>)> {
        self.fetches.lock().expect("fetch log lock").clone()
    }

    pub(crate) fn write_attempts(&self) -> Vec<String> {
        self.write_attempts.lock().expect("write log lock").clone()
    }

    pub(crate) fn writes(&self) -> Vec<(String, Vec<Point>)> {
        self.writes.lock().expect("write log lock").clone()
    }
}

#[async_trait::async_trait]
impl SeriesStore for MemoryStore {
    async fn fetch(&self, series: &SeriesRef, query: Option<&str>) -> Result<Vec<Point>, RelayError> {
        self.fetches
            .lock()
            .expect("fetch log lock")
            .push((series.timeseries_id.clone(), query.map(str::to_string)));
        self.series
            .get(&series.timeseries_id)
            .cloned()
            .ok_or_else(|| RelayError::series_not_found(&series.timeseries_id, 404))
    }

    async fn write(&self, series: &SeriesRef, points: &[Point]) -> Result<(), RelayError> {
        self.write_attempts
            .lock()
            .expect("write log lock")
            .push(series.timeseries_id.clone());
        if self.failing_writes.contains(&series.timeseries_id) {
            return Err(RelayError::series_not_found(&series.timeseries_id, 500));
        }
        self.writes
            .lock()
            .expect("write log lock")
            .push((series.timeseries_id.clone(), points.to_vec()));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DeliveredCall {
    pub route: String,
    pub token: String,
    pub query: Option<String>,
    pub params: FunctionParams,
}

/// Transformation service that records deliveries and optionally rejects them.
#[derive(Default)]
pub(crate) struct RecordingTransformation {
    reject_with: Option<u16>,
    calls: Mutex<Vec<DeliveredCall>>,
}

impl RecordingTransformation {
    pub(crate) fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<DeliveredCall> {
        self.calls.lock().expect("call log lock").clone()
    }
}

#[async_trait::async_trait]
impl TransformationService for RecordingTransformation {
    async fn deliver(&self, route: &str, params: &FunctionParams, token: &str, query: Option<&str>) -> Result<(), RelayError> {
        self.calls.lock().expect("call log lock").push(DeliveredCall {
            route: route.to_string(),
            token: token.to_string(),
            query: query.map(str::to_string),
            params: params.clone(),
        });
        match self.reject_with {
            Some(status) => Err(RelayError::dispatch_rejected(&params.extension, route, status)),
            None => Ok(()),
        }
    }
}
