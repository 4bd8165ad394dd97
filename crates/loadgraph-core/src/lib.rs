#![forbid(unsafe_code)]
//! loadgraph-core library.
//!
//! A generic cost-weighted directed graph: topological ordering,
//! reachability, ancestry, edge rewiring, critical path cost with path
//! reconstruction, and an index-based JSON form.
//!
//! # Conventions
//!
//! - **Errors**: Graph misuse returns [`GraphError`]; data anomalies are
//!   tolerated and logged.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod element;
pub mod error;
pub mod graph;

pub use element::{CostEdge, CostNode, Edge, EdgeId, Node, NodeId};
pub use error::{ErrorCode, GraphError};
pub use graph::{CriticalPath, DirectedGraph};
