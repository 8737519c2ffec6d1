//! Ordered table of registered path handlers
//!
//! Built-in routes live in the axum router; anything they do not claim falls
//! through to this table, which is scanned in registration order.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;

/// How a registered pattern is compared against the request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Exact path equality
    Strict,
    /// Path prefix
    Soft,
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;
pub type PathHandler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

#[derive(Clone)]
pub struct PathHandlerEntry {
    pub pattern: String,
    /// Shown on the index page
    pub description: String,
    pub match_mode: MatchMode,
    handler: PathHandler,
}

impl PathHandlerEntry {
    pub fn matches(&self, path: &str) -> bool {
        match self.match_mode {
            MatchMode::Strict => path == self.pattern,
            MatchMode::Soft => path.starts_with(&self.pattern),
        }
    }
}

impl fmt::Debug for PathHandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathHandlerEntry")
            .field("pattern", &self.pattern)
            .field("description", &self.description)
            .field("match_mode", &self.match_mode)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathRouter {
    entries: Vec<PathHandlerEntry>,
}

impl PathRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler. Earlier registrations win on overlapping prefixes.
    pub fn register<F, Fut>(
        &mut self,
        pattern: impl Into<String>,
        description: impl Into<String>,
        match_mode: MatchMode,
        handler: F,
    ) where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let pattern = pattern.into();
        tracing::debug!(pattern = %pattern, ?match_mode, "Registered path handler");
        self.entries.push(PathHandlerEntry {
            pattern,
            description: description.into(),
            match_mode,
            handler: Arc::new(move |req: Request| -> HandlerFuture { Box::pin(handler(req)) }),
        });
    }

    pub fn entries(&self) -> &[PathHandlerEntry] {
        &self.entries
    }

    /// First entry matching `path`
    pub fn find(&self, path: &str) -> Option<&PathHandlerEntry> {
        self.entries.iter().find(|entry| entry.matches(path))
    }

    /// Hand the request to the first matching entry, or answer 404
    pub async fn dispatch(&self, req: Request) -> Response {
        let path = req.uri().path().to_string();
        match self.find(&path) {
            Some(entry) => {
                tracing::debug!(path = %path, pattern = %entry.pattern, "Dispatching to registered handler");
                (entry.handler)(req).await
            }
            None => {
                tracing::debug!(path = %path, "No handler matched");
                ServerError::NotFound("The requested page was not found".to_string()).into_response()
            }
        }
    }
}
