use futures::future::{BoxFuture, FutureExt, join_all};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::record::Partial;
use crate::log_debug;

/// Context handed to extractors. Currently always passed as `None`; it is a
/// type of its own so a real context can be added without breaking callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractorContext;

pub type ExtractorFuture = BoxFuture<'static, anyhow::Result<serde_json::Value>>;

/// A caller-supplied function contributing one exported value.
pub type ExtractorFn = Arc<dyn Fn(Option<ExtractorContext>) -> ExtractorFuture + Send + Sync>;

/// Extractors keyed by export name, in insertion order.
#[derive(Clone, Default)]
pub struct ExtractorMap {
    entries: Vec<(String, ExtractorFn)>,
}

impl ExtractorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extractor. Re-registering a key replaces the function but
    /// keeps the key's original position.
    pub fn insert<F, Fut>(&mut self, key: impl Into<String>, extractor: F)
    where
        F: Fn(Option<ExtractorContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
    {
        let boxed: ExtractorFn = Arc::new(move |ctx| extractor(ctx).boxed());
        let key = key.into();

        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = boxed;
        } else {
            self.entries.push((key, boxed));
        }
    }

    /// Register an extractor that always yields `value`.
    pub fn insert_value(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.insert(key, move |_| {
            let value = value.clone();
            async move { Ok(value) }
        });
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every extractor concurrently.
    ///
    /// Each extractor is isolated: one that fails or panics is logged and
    /// left out of the result, the others still contribute. There is no
    /// timeout, so the slowest extractor bounds the whole evaluation.
    pub async fn evaluate(&self) -> Partial {
        let runs = self.entries.iter().map(|(key, extractor)| {
            let key = key.clone();
            let extractor = Arc::clone(extractor);
            // Calling the extractor inside the guarded future also catches a
            // panic raised before it returns its future
            let guarded = AssertUnwindSafe(async move { extractor(None).await }).catch_unwind();
            async move { (key, guarded.await) }
        });

        let mut partial = Partial::new();
        for (key, outcome) in join_all(runs).await {
            match outcome {
                Ok(Ok(value)) => partial.set(&key, Some(value)),
                Ok(Err(e)) => log_debug!("Extractor '{}' failed: {:#}", key, e),
                Err(payload) => log_debug!(
                    "Extractor '{}' panicked: {}",
                    key,
                    panic_message(payload.as_ref())
                ),
            }
        }
        partial
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl fmt::Debug for ExtractorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

/// Options supplied by the host for one generation request.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub extractors: ExtractorMap,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_extractor<F, Fut>(mut self, key: impl Into<String>, extractor: F) -> Self
    where
        F: Fn(Option<ExtractorContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
    {
        self.extractors.insert(key, extractor);
        self
    }

    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extractors.insert_value(key, value);
        self
    }
}
