use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::collector::MetricsCollector;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_directive` when set. Output is one JSON
/// object per line when `json` is true, human-readable text otherwise.
pub fn init_tracing(default_directive: &str, json: bool) -> Result<(), TracingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| TracingError::InvalidFilter(e.to_string()))?,
    };

    let (json_layer, text_layer) = if json {
        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .json();
        (Some(layer), None)
    } else {
        let layer = fmt::layer().with_target(true).with_level(true);
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(MetricsLayer::new(MetricsCollector::new()))
        .try_init()
        .map_err(|e| TracingError::InitError(e.to_string()))?;

    Ok(())
}

/// Tracing layer that counts ERROR events.
pub struct MetricsLayer {
    collector: MetricsCollector,
}

impl MetricsLayer {
    pub fn new(collector: MetricsCollector) -> Self {
        Self { collector }
    }
}

impl<S> Layer<S> for MetricsLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.collector.record_error_event();
        }
    }
}

/// Correlation id shared by every log line of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Span context for processing one source file
#[derive(Debug, Clone)]
pub struct FileSpan {
    pub run_id: RunId,
    pub file: String,
}

impl FileSpan {
    pub fn new(run_id: RunId, file: impl Into<String>) -> Self {
        Self {
            run_id,
            file: file.into(),
        }
    }

    /// Span to attach with `tracing::Instrument::instrument`.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("file", run_id = %self.run_id, file = %self.file)
    }
}

/// Tracing error types
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("tracing initialization error: {0}")]
    InitError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ERROR_EVENTS_TOTAL;

    #[test]
    fn test_run_id_generation() {
        let id1 = RunId::new();
        let id2 = RunId::new();

        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 36);
        assert_eq!(id1.to_string(), id1.as_str());
    }

    #[test]
    fn test_file_span_creation() {
        let run_id = RunId::new();
        let span = FileSpan::new(run_id, "NGIN_DataFile_20251009.xml");

        assert_eq!(span.file, "NGIN_DataFile_20251009.xml");
        assert_eq!(span.run_id, run_id);
    }

    #[test]
    fn test_metrics_layer_counts_errors() {
        let subscriber =
            tracing_subscriber::registry().with(MetricsLayer::new(MetricsCollector::new()));
        let before = ERROR_EVENTS_TOTAL.get();

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("boom");
            tracing::warn!("not counted");
        });

        assert!(ERROR_EVENTS_TOTAL.get() >= before + 1);
    }
}
