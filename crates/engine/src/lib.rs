//! # Extrelay Engine
//!
//! The orchestration core of the extension transformation relay. A trigger
//! names a transformation function and a catalog of time-series variables;
//! the engine fetches the inputs from their storage adapters, forwards the
//! assembled bundle to the transformation service for that function, and
//! later writes the computed outputs back when the service calls home.
//!
//! ## Architecture
//!
//! - **`resolve`**: selects catalog variables in request order
//! - **`store`**: Data Fetcher / Data Writer behind the [`SeriesStore`] trait
//! - **`assemble`**: builds the outbound [`FunctionParams`](extrelay_types::FunctionParams)
//! - **`dispatch`**: function-name routing behind the [`TransformationService`] trait
//! - **`token`**: correlation tokens and their collision risk
//! - **`relay`**: the trigger and callback workflows
//! - **`routing`**: static address tables for adapters and services
//!
//! No state is held between a trigger and its callback.

pub mod assemble;
pub mod dispatch;
pub mod relay;
pub mod resolve;
pub mod routing;
pub mod store;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use assemble::PayloadAssembler;
pub use dispatch::{FunctionDispatcher, HttpTransformationService, TransformationService};
pub use relay::{CallbackReceipt, Relay, RelayRoutes, TriggerReceipt};
pub use resolve::resolve_variables;
pub use routing::{FunctionRoutes, StorageRoutes, TransformationRoutes};
pub use store::{HttpSeriesStore, SeriesStore};
pub use token::{TOKEN_SPACE, collision_probability, generate_token};
