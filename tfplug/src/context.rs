//! Request-scoped cancellation and tracing metadata
//!
//! Every trait method receives a Context. Contexts derived from one another
//! share a cancellation signal, so StopProvider cancels in-flight work.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Context carries cancellation, an optional deadline and the name of the
/// RPC being served
/// CRITICAL: Pass this as first parameter to ALL async trait methods
#[derive(Clone)]
pub struct Context {
    cancel: Arc<watch::Sender<bool>>,
    deadline: Option<Instant>,
    rpc: Option<&'static str>,
    type_name: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            cancel: Arc::new(cancel),
            deadline: None,
            rpc: None,
            type_name: None,
        }
    }

    /// Derived context that also expires after `timeout`
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            deadline: Some(self.deadline.map_or(deadline, |d| d.min(deadline))),
            ..self.clone()
        }
    }

    /// Derived context tagged with the RPC and resource type it serves
    pub fn with_rpc(&self, rpc: &'static str, type_name: impl Into<String>) -> Self {
        Self {
            rpc: Some(rpc),
            type_name: Some(type_name.into()),
            ..self.clone()
        }
    }

    pub fn rpc(&self) -> Option<&'static str> {
        self.rpc
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Span carrying the RPC name and type for everything logged under it
    pub fn span(&self) -> tracing::Span {
        tracing::debug_span!(
            "tfplug",
            rpc = self.rpc.unwrap_or(""),
            type_name = self.type_name.as_deref().unwrap_or("")
        )
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Cancel this context and every context derived from the same root
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn cancelled(&self) {
        let mut rx = self.cancel.subscribe();
        let signal = async move {
            // Sender lives in self, so wait_for only fails if it is dropped
            let _ = rx.wait_for(|cancelled| *cancelled).await;
        };
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = signal => {}
                    _ = tokio::time::sleep_until(deadline.into()) => {}
                }
            }
            None => signal.await,
        }
    }

    /// Run `future` unless the context is cancelled first
    pub async fn run<F: Future>(&self, future: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            output = future => Some(output),
            _ = self.cancelled() => None,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
