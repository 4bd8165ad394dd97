//! Captured network requests and the gap between dependent requests.

use serde::{Deserialize, Serialize};

/// One network request from a captured page load.
///
/// Times are absolute milliseconds on the trace clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Unique id within a trace.
    pub request_id: String,
    #[serde(default)]
    pub url: String,
    pub start_msec: f64,
    pub end_msec: f64,
    /// When the response headers arrived, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers_end_msec: Option<f64>,
    /// Coarse content category, e.g. `script`, `data/json`, `image`.
    #[serde(default)]
    pub content_type: String,
}

impl Request {
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        start_msec: f64,
        end_msec: f64,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            url: String::new(),
            start_msec,
            end_msec,
            headers_end_msec: None,
            content_type: content_type.into(),
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub const fn with_headers_end(mut self, headers_end_msec: f64) -> Self {
        self.headers_end_msec = Some(headers_end_msec);
        self
    }

    /// Time this request occupied on its own, never negative.
    #[must_use]
    pub fn cost(&self) -> f64 {
        (self.end_msec - self.start_msec).max(0.0)
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// Why a child request depends on its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyReason {
    /// The child is the target of a redirect response from the parent.
    Redirect,
    /// The parent's document parser discovered the child.
    Parser,
    /// A script issued the child.
    Script,
    #[serde(other)]
    Other,
}

impl DependencyReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Redirect => "redirect",
            Self::Parser => "parser",
            Self::Script => "script",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for DependencyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Milliseconds between the moment `parent` could trigger `child` and the
/// moment `child` started.
///
/// Redirect targets and parser-discovered resources can start as soon as
/// the parent's response headers are in, so those reasons measure from
/// `headers_end_msec` when it was recorded. Everything else measures from
/// the end of the parent. The result is negative when the child started
/// earlier than that.
#[must_use]
pub fn time_between(parent: &Request, child: &Request, reason: DependencyReason) -> f64 {
    let ready_msec = match reason {
        DependencyReason::Redirect | DependencyReason::Parser => {
            parent.headers_end_msec.unwrap_or(parent.end_msec)
        }
        DependencyReason::Script | DependencyReason::Other => parent.end_msec,
    };
    child.start_msec - ready_msec
}
