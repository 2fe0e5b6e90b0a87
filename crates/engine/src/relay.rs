//! Trigger and callback workflows.
//!
//! A trigger moves through `received -> resolving-and-fetching -> dispatching
//! -> responded`; a callback through `received -> writing-outputs ->
//! responded`. Any failure short-circuits to `responded`. The two workflows
//! share no state: they are linked only by the token the transformation
//! service echoes back.

use std::sync::Arc;

use extrelay_api::RelayClient;
use extrelay_types::{ExtensionDefinition, FunctionResponse, RelayError};
use tracing::{info, warn};

use crate::assemble::PayloadAssembler;
use crate::dispatch::{FunctionDispatcher, HttpTransformationService, TransformationService};
use crate::routing::{FunctionRoutes, StorageRoutes, TransformationRoutes};
use crate::store::{HttpSeriesStore, SeriesStore};

/// Outcome of an accepted trigger: forwarded, not yet computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerReceipt {
    pub token: String,
    pub route: String,
}

/// Outcome of a completed callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackReceipt {
    pub written: usize,
}

/// Everything needed to wire a relay onto HTTP collaborators.
#[derive(Debug, Clone, Default)]
pub struct RelayRoutes {
    pub storage: StorageRoutes,
    pub transformation: TransformationRoutes,
    pub functions: FunctionRoutes,
}

/// Orchestrates triggers and callbacks over a [`SeriesStore`] and a
/// [`TransformationService`].
#[derive(Clone)]
pub struct Relay {
    store: Arc<dyn SeriesStore>,
    assembler: PayloadAssembler,
    dispatcher: FunctionDispatcher,
}

impl Relay {
    pub fn new(
        store: Arc<dyn SeriesStore>,
        transformation: Arc<dyn TransformationService>,
        functions: FunctionRoutes,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            assembler: PayloadAssembler::new(Arc::clone(&store), callback_url),
            dispatcher: FunctionDispatcher::new(functions, transformation),
            store,
        }
    }

    /// Relay backed by the HTTP storage adapters and transformation services.
    pub fn over_http(client: RelayClient, routes: RelayRoutes, callback_url: impl Into<String>) -> Self {
        let store = Arc::new(HttpSeriesStore::new(client.clone(), routes.storage));
        let transformation = Arc::new(HttpTransformationService::new(client, routes.transformation));
        Self::new(store, transformation, routes.functions, callback_url)
    }

    /// Assemble and forward a transformation request.
    ///
    /// The function route is checked before any input is fetched, so an
    /// unknown function causes no outbound traffic at all.
    pub async fn trigger(&self, extension: &ExtensionDefinition, query: Option<&str>) -> Result<TriggerReceipt, RelayError> {
        info!(
            extension_id = %extension.extension_id,
            extension = %extension.extension,
            function = %extension.function,
            "trigger received"
        );
        let outcome = self.run_trigger(extension, query).await;
        if let Err(error) = &outcome {
            warn!(extension_id = %extension.extension_id, %error, "trigger failed");
        }
        outcome
    }

    async fn run_trigger(&self, extension: &ExtensionDefinition, query: Option<&str>) -> Result<TriggerReceipt, RelayError> {
        let route = self.dispatcher.route_for(&extension.function)?.to_string();
        let params = self.assembler.assemble(extension, query).await?;
        self.dispatcher.dispatch(&params, &params.token, query).await?;
        Ok(TriggerReceipt {
            token: params.token,
            route,
        })
    }

    /// Write every computed output back to storage, in order.
    ///
    /// The first failure stops the loop. Outputs written before it stay
    /// written: write-back is not atomic across variables.
    pub async fn callback(&self, token: &str, response: &FunctionResponse) -> Result<CallbackReceipt, RelayError> {
        info!(
            %token,
            extension_id = %response.extension_id,
            outputs = response.output_variables.len(),
            "callback received"
        );
        let mut written = 0;
        for output in &response.output_variables {
            let series = output.series();
            if let Err(error) = self.store.write(series, &output.data).await {
                warn!(%token, series = %series.timeseries_id, written, %error, "write-back aborted");
                return Err(RelayError::write_failed(&series.timeseries_id, error));
            }
            written += 1;
        }
        Ok(CallbackReceipt { written })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStore, RecordingTransformation, extension};
    use extrelay_types::{BoundVariable, Options, Point, SeriesRef, Variable};

    const CALLBACK: &str = "http://relay/extension/transformation/callback";

    fn relay(store: Arc<MemoryStore>, transformation: Arc<RecordingTransformation>) -> Relay {
        Relay::new(store, transformation, FunctionRoutes::default(), CALLBACK)
    }

    fn output(id: &str, series: &str, value: f64) -> BoundVariable {
        BoundVariable::new(
            Variable::new(
                id,
                SeriesRef {
                    timeseries_id: series.into(),
                    ..Default::default()
                },
            ),
            vec![Point::new("t1", value)],
        )
    }

    #[tokio::test]
    async fn trigger_dispatches_once_with_options_and_token() {
        let store = Arc::new(MemoryStore::default().with_series("ts-a", vec![Point::new("t1", 1.0)]));
        let transformation = Arc::new(RecordingTransformation::default());
        let mut extension = extension(&[("a", "ts-a"), ("y", "ts-y")], &["a"], &["y"]);
        extension.options = Options::from_raw(r#"{"window":  24}"#).expect("valid json");

        let receipt = relay(store, transformation.clone())
            .trigger(&extension, Some("end=2"))
            .await
            .expect("trigger accepted");

        let calls = transformation.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].route, "aggregate-accumulative");
        assert_eq!(calls[0].token, receipt.token);
        assert_eq!(calls[0].params.token, receipt.token);
        assert_eq!(calls[0].params.options.as_raw(), Some(r#"{"window":  24}"#));
        assert_eq!(calls[0].query.as_deref(), Some("end=2"));
        assert_eq!(receipt.route, "aggregate-accumulative");
    }

    #[tokio::test]
    async fn failed_fetch_prevents_dispatch() {
        let store = Arc::new(MemoryStore::default());
        let transformation = Arc::new(RecordingTransformation::default());
        let extension = extension(&[("a", "ts-missing")], &["a"], &[]);

        let err = relay(store, transformation.clone())
            .trigger(&extension, None)
            .await
            .expect_err("fetch fails");
        assert!(matches!(err, RelayError::DataFetchFailed { ref series_id, .. } if series_id == "ts-missing"));
        assert!(transformation.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_function_makes_no_outbound_calls() {
        let store = Arc::new(MemoryStore::default().with_series("ts-a", vec![]));
        let transformation = Arc::new(RecordingTransformation::default());
        let mut extension = extension(&[("a", "ts-a")], &["a"], &[]);
        extension.function = "Unconfigured".into();

        let err = relay(store.clone(), transformation.clone())
            .trigger(&extension, None)
            .await
            .expect_err("unknown function");
        assert!(matches!(err, RelayError::UnknownFunction { .. }));
        assert!(store.fetches().is_empty());
        assert!(transformation.calls().is_empty());
    }

    #[tokio::test]
    async fn callback_writes_each_output_in_order() {
        let store = Arc::new(MemoryStore::default());
        let response = FunctionResponse {
            output_variables: vec![output("y1", "ts-1", 1.0), output("y2", "ts-2", 2.0)],
            ..Default::default()
        };

        let receipt = relay(store.clone(), Arc::new(RecordingTransformation::default()))
            .callback("T00000001", &response)
            .await
            .expect("callback succeeds");

        assert_eq!(receipt.written, 2);
        let writes = store.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].0, "ts-1");
        assert_eq!(writes[1].1, vec![Point::new("t1", 2.0)]);
    }

    #[tokio::test]
    async fn callback_stops_at_first_failed_write_without_rollback() {
        let store = Arc::new(MemoryStore::default().failing_writes_to("ts-2"));
        let response = FunctionResponse {
            output_variables: vec![output("y1", "ts-1", 1.0), output("y2", "ts-2", 2.0), output("y3", "ts-3", 3.0)],
            ..Default::default()
        };

        let err = relay(store.clone(), Arc::new(RecordingTransformation::default()))
            .callback("T00000001", &response)
            .await
            .expect_err("second write fails");

        assert!(matches!(err, RelayError::WriteFailed { ref series_id, .. } if series_id == "ts-2"));
        let attempted: Vec<_> = store.write_attempts();
        assert_eq!(attempted, vec!["ts-1".to_string(), "ts-2".to_string()]);
        let persisted: Vec<_> = store.writes().into_iter().map(|(series, _)| series).collect();
        assert_eq!(persisted, vec!["ts-1".to_string()], "the first write stays visible");
    }

    #[tokio::test]
    async fn callback_with_no_outputs_is_accepted() {
        let store = Arc::new(MemoryStore::default());
        let receipt = relay(store.clone(), Arc::new(RecordingTransformation::default()))
            .callback("T00000001", &FunctionResponse::default())
            .await
            .expect("nothing to write");
        assert_eq!(receipt.written, 0);
        assert!(store.write_attempts().is_empty());
    }
}
