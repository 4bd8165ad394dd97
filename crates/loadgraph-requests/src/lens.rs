//! Sources of raw `(parent, child, reason)` dependency triples.
//!
//! A lens interprets instrumentation data (initiators, redirects, parser
//! positions) and reports which request caused which. The graph treats the
//! lens as ground truth only for requests it knows; triples naming other
//! requests are dropped.

use crate::request::{DependencyReason, Request};

/// One observed dependency: `parent` triggered `child`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestDependency<'a> {
    pub parent: &'a Request,
    pub child: &'a Request,
    pub reason: DependencyReason,
}

/// Anything that can report request dependencies.
pub trait DependencyLens {
    fn request_dependencies(&self) -> Vec<RequestDependency<'_>>;
}

/// A lens over a fixed, already-resolved list of triples.
#[derive(Debug, Clone, Default)]
pub struct StaticDependencyLens {
    triples: Vec<(Request, Request, DependencyReason)>,
}

impl StaticDependencyLens {
    #[must_use]
    pub const fn new(triples: Vec<(Request, Request, DependencyReason)>) -> Self {
        Self { triples }
    }

    /// Resolve `(parent_id, child_id, reason)` links against `requests`.
    ///
    /// Links naming an id absent from `requests` are skipped.
    #[must_use]
    pub fn from_ids(requests: &[Request], links: &[(&str, &str, DependencyReason)]) -> Self {
        let find = |id: &str| requests.iter().rfind(|r| r.request_id == id);
        let triples = links
            .iter()
            .filter_map(|&(parent, child, reason)| {
                Some((find(parent)?.clone(), find(child)?.clone(), reason))
            })
            .collect();
        Self { triples }
    }

    /// Append one triple.
    pub fn push(&mut self, parent: Request, child: Request, reason: DependencyReason) {
        self.triples.push((parent, child, reason));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

impl DependencyLens for StaticDependencyLens {
    fn request_dependencies(&self) -> Vec<RequestDependency<'_>> {
        self.triples
            .iter()
            .map(|(parent, child, reason)| RequestDependency {
                parent,
                child,
                reason: *reason,
            })
            .collect()
    }
}
