//! Resolution observers.
//!
//! Observers are notified around every [`Container::get`](crate::Container::get):
//! once before construction, then once with the elapsed time or the error.
//! Calls are synchronous, so keep implementations cheap.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;

/// Observer trait for resolution events.
///
/// # Examples
///
/// ```
/// use ferrous_container::{Container, ContainerObserver};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder(Mutex<Vec<String>>);
///
/// impl ContainerObserver for Recorder {
///     fn resolving(&self, id: &str) {
///         self.0.lock().unwrap().push(format!("start {}", id));
///     }
///
///     fn resolved(&self, id: &str, _duration: Duration) {
///         self.0.lock().unwrap().push(format!("done {}", id));
///     }
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let container = Container::new();
/// container.add_observer(recorder.clone());
/// container.instance("answer", 42u32);
///
/// container.get("answer").unwrap();
/// assert_eq!(*recorder.0.lock().unwrap(), vec!["start answer", "done answer"]);
/// ```
pub trait ContainerObserver: Send + Sync {
    /// Called before a service is looked up or constructed.
    fn resolving(&self, id: &str);

    /// Called after a service was handed out, with the time spent since `resolving`.
    fn resolved(&self, id: &str, duration: Duration);

    /// Called when resolution fails. The error still propagates to the caller.
    fn failed(&self, id: &str, error: &DiError) {
        let _ = (id, error);
    }
}

/// Registered observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ContainerObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn ContainerObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn resolving(&self, id: &str) {
        for observer in &self.observers {
            observer.resolving(id);
        }
    }

    pub(crate) fn resolved(&self, id: &str, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(id, duration);
        }
    }

    pub(crate) fn failed(&self, id: &str, error: &DiError) {
        for observer in &self.observers {
            observer.failed(id, error);
        }
    }
}

/// Built-in observer that reports events through `tracing`.
///
/// Resolutions are logged at `debug`, failures at `warn`. Install a
/// subscriber (for example `tracing-subscriber`) to see them.
///
/// ```
/// use ferrous_container::{Container, LoggingObserver};
/// use std::sync::Arc;
///
/// let container = Container::new();
/// container.add_observer(Arc::new(LoggingObserver::new()));
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "[ferrous-container]".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerObserver for LoggingObserver {
    fn resolving(&self, id: &str) {
        tracing::debug!(prefix = %self.prefix, service = id, "resolving");
    }

    fn resolved(&self, id: &str, duration: Duration) {
        tracing::debug!(prefix = %self.prefix, service = id, elapsed = ?duration, "resolved");
    }

    fn failed(&self, id: &str, error: &DiError) {
        tracing::warn!(prefix = %self.prefix, service = id, %error, "resolution failed");
    }
}

/// Counts resolutions and failures and sums resolution time.
#[derive(Default)]
pub struct MetricsObserver {
    resolution_count: AtomicU64,
    failure_count: AtomicU64,
    total_resolution_nanos: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolution_count(&self) -> u64 {
        self.resolution_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn total_resolution_time(&self) -> Duration {
        Duration::from_nanos(self.total_resolution_nanos.load(Ordering::Relaxed))
    }

    /// Mean time per successful resolution; `None` before the first one.
    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            return None;
        }
        Some(self.total_resolution_time() / count as u32)
    }
}

impl ContainerObserver for MetricsObserver {
    fn resolving(&self, _id: &str) {}

    fn resolved(&self, _id: &str, duration: Duration) {
        self.resolution_count.fetch_add(1, Ordering::Relaxed);
        self.total_resolution_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn failed(&self, _id: &str, _error: &DiError) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }
}
