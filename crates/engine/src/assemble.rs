//! Payload Assembler: builds the outbound [`FunctionParams`] for a trigger.

use std::sync::Arc;

use extrelay_types::{BoundVariable, ExtensionDefinition, FunctionParams, RelayError};
use tracing::debug;

use crate::resolve::resolve_variables;
use crate::store::SeriesStore;
use crate::token::generate_token;

/// Resolves an extension's variables, fetches input data and stamps the
/// bundle with a correlation token and the relay's callback address.
#[derive(Clone)]
pub struct PayloadAssembler {
    store: Arc<dyn SeriesStore>,
    callback_url: String,
}

impl PayloadAssembler {
    pub fn new(store: Arc<dyn SeriesStore>, callback_url: impl Into<String>) -> Self {
        Self {
            store,
            callback_url: callback_url.into(),
        }
    }

    /// Build the parameter bundle for `extension`.
    ///
    /// Inputs are fetched one at a time in resolution order; the first fetch
    /// failure abandons the whole assembly with [`RelayError::DataFetchFailed`].
    /// Outputs are resolved but never fetched.
    pub async fn assemble(&self, extension: &ExtensionDefinition, query: Option<&str>) -> Result<FunctionParams, RelayError> {
        let catalog = &extension.data.variables;

        let inputs = resolve_variables(catalog, &extension.data.input_variables);
        let mut input_variables = Vec::with_capacity(inputs.len());
        for variable in inputs {
            let points = self
                .store
                .fetch(&variable.timeseries, query)
                .await
                .map_err(|error| RelayError::data_fetch_failed(variable.series_id(), error))?;
            debug!(variable = %variable.variable_id, points = points.len(), "input bound");
            input_variables.push(BoundVariable::new(variable, points));
        }

        let output_variables = resolve_variables(catalog, &extension.data.output_variables);

        Ok(FunctionParams {
            extension_id: extension.extension_id.clone(),
            extension: extension.extension.clone(),
            function: extension.function.clone(),
            input_variables,
            output_variables,
            options: extension.options.clone(),
            callback: self.callback_url.clone(),
            token: generate_token(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStore, extension};
    use extrelay_types::{Options, Point};

    const CALLBACK: &str = "http://relay/extension/transformation/callback";

    #[tokio::test]
    async fn binds_inputs_in_request_order_and_leaves_outputs_unbound() {
        let store = Arc::new(
            MemoryStore::default()
                .with_series("ts-a", vec![Point::new("t1", 1.0), Point::new("t0", 0.5)])
                .with_series("ts-b", vec![Point::new("t1", 2.0)]),
        );
        let assembler = PayloadAssembler::new(store.clone(), CALLBACK);
        let extension = extension(&[("a", "ts-a"), ("b", "ts-b"), ("out", "ts-out")], &["b", "a"], &["out"]);

        let params = assembler.assemble(&extension, Some("start=0")).await.expect("assembly succeeds");

        let inputs: Vec<_> = params.input_variables.iter().map(|bound| bound.variable.variable_id.as_str()).collect();
        assert_eq!(inputs, vec!["b", "a"]);
        assert_eq!(params.input_variables[1].data, vec![Point::new("t1", 1.0), Point::new("t0", 0.5)]);
        assert_eq!(params.output_variables.len(), 1);
        assert_eq!(params.output_variables[0].series_id(), "ts-out");
        assert_eq!(params.callback, CALLBACK);
        assert_eq!(params.extension_id, extension.extension_id);
        assert_eq!(params.function, extension.function);
        assert!(params.token.starts_with('T'));

        let fetched = store.fetches();
        assert_eq!(fetched, vec![("ts-b".to_string(), Some("start=0".to_string())), ("ts-a".to_string(), Some("start=0".to_string()))]);
    }

    #[tokio::test]
    async fn options_are_carried_verbatim() {
        let store = Arc::new(MemoryStore::default().with_series("ts-a", vec![]));
        let assembler = PayloadAssembler::new(store, CALLBACK);
        let mut extension = extension(&[("a", "ts-a")], &["a"], &[]);
        extension.options = Options::from_raw(r#"{ "weights": [0.1, 0.9], "mode":"sum" }"#).expect("valid json");

        let params = assembler.assemble(&extension, None).await.expect("assembly succeeds");
        assert_eq!(params.options.as_raw(), Some(r#"{ "weights": [0.1, 0.9], "mode":"sum" }"#));
    }

    #[tokio::test]
    async fn first_fetch_failure_abandons_assembly() {
        let store = Arc::new(MemoryStore::default().with_series("ts-a", vec![Point::new("t", 1.0)]));
        let assembler = PayloadAssembler::new(store.clone(), CALLBACK);
        let extension = extension(&[("a", "ts-a"), ("gone", "ts-gone"), ("c", "ts-c")], &["a", "gone", "c"], &[]);

        let err = assembler.assemble(&extension, None).await.expect_err("missing series");
        match err {
            RelayError::DataFetchFailed { series_id, source } => {
                assert_eq!(series_id, "ts-gone");
                assert!(matches!(*source, RelayError::SeriesNotFound { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.fetches().len(), 2, "fetching stops at the failing input");
    }

    #[tokio::test]
    async fn unresolved_inputs_are_skipped() {
        let store = Arc::new(MemoryStore::default().with_series("ts-a", vec![]));
        let assembler = PayloadAssembler::new(store.clone(), CALLBACK);
        let extension = extension(&[("a", "ts-a")], &["a", "not-declared"], &["also-not-declared"]);

        let params = assembler.assemble(&extension, None).await.expect("assembly succeeds");
        assert_eq!(params.input_variables.len(), 1);
        assert!(params.output_variables.is_empty());
    }
}
