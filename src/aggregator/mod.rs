//! Aggregator Module
//!
//! UDP server exposing the `/parking` resource.
//!
//! ## Architecture
//! - Single receive thread queuing raw datagrams
//! - Worker thread pool fed through a bounded crossbeam channel
//! - Every request routed through [`Endpoint`] to [`ResourceHandler`]
//!
//! ## Routes
//! - `GET /parking` → 2.05 snapshot document
//! - `PUT /parking` `{slot_id, occupied}` → 2.04 or 4.00
//! - `PUT /parking/<slot_id>` `occupied|free` → 2.04 or 4.00
//! - other methods on those paths → 4.05, other paths → 4.04

mod handler;
mod endpoint;
mod server;

pub use handler::{HandlerResponse, ResourceHandler, RESOURCE_PATH};
pub use endpoint::Endpoint;
pub use server::Server;
