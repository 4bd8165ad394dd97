use std::fmt;

use crate::element::{EdgeId, NodeId};

/// Errors raised by graph operations.
///
/// Data anomalies found while building a graph (dangling edges, duplicate
/// request ids, cycles) are never reported through this type; they are
/// tolerated and logged. `GraphError` is reserved for API misuse and for
/// documents that cannot be decoded.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A node handle that does not belong to the graph.
    #[error("node {0} is not a member of the graph")]
    UnknownNode(NodeId),

    /// An edge handle that does not belong to the graph.
    #[error("edge {0} is not a member of the graph")]
    UnknownEdge(EdgeId),

    /// A request id with no node in the graph.
    #[error("request {0:?} is not a member of the graph")]
    UnknownRequest(String),

    /// Topological sort could not order every node of its domain.
    #[error("graph contains a cycle; {} node(s) could not be ordered", unsorted.len())]
    Cycle {
        /// Nodes never emitted by the sort, in id order.
        unsorted: Vec<NodeId>,
    },

    /// A serialized graph document is structurally invalid.
    #[error("malformed graph document: {0}")]
    Serialization(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownNode(_) => ErrorCode::UnknownNode,
            Self::UnknownEdge(_) => ErrorCode::UnknownEdge,
            Self::UnknownRequest(_) => ErrorCode::UnknownRequest,
            Self::Cycle { .. } => ErrorCode::CycleDetected,
            Self::Serialization(_) | Self::Json(_) => ErrorCode::MalformedDocument,
        }
    }
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnknownNode,
    UnknownEdge,
    UnknownRequest,
    CycleDetected,
    MalformedDocument,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::UnknownNode => "E1001",
            Self::UnknownEdge => "E1002",
            Self::UnknownRequest => "E1003",
            Self::CycleDetected => "E2001",
            Self::MalformedDocument => "E3001",
        }
    }

    /// Short human-facing summary for logs.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::UnknownNode => "Node not in graph",
            Self::UnknownEdge => "Edge not in graph",
            Self::UnknownRequest => "Request not in graph",
            Self::CycleDetected => "Dependency cycle detected",
            Self::MalformedDocument => "Malformed graph document",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
