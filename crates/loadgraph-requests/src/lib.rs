#![forbid(unsafe_code)]
//! loadgraph-requests library.
//!
//! Builds a [`RequestDependencyGraph`] from a captured list of network
//! requests and the `(parent, child, reason)` triples of a
//! [`DependencyLens`], corrects initiator edges that are better explained
//! by request timing, and answers critical path and ancestry queries.
//!
//! # Conventions
//!
//! - **Errors**: Graph misuse returns [`loadgraph_core::GraphError`];
//!   configuration loading uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod correction;
pub mod dependency_graph;
pub mod lens;
pub mod node;
pub mod request;

pub use config::TimingConfig;
pub use correction::TimingCorrection;
pub use dependency_graph::RequestDependencyGraph;
pub use lens::{DependencyLens, RequestDependency, StaticDependencyLens};
pub use node::{RequestEdge, RequestNode};
pub use request::{DependencyReason, Request, time_between};
