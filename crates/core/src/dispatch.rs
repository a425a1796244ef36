//! Conversion dispatcher.
//!
//! Runs blocking converters on tokio's blocking pool so the async request
//! path never waits on an engine. A semaphore bounds how many conversions
//! hold a worker at once; the permit moves into the worker and is released
//! only when the engine actually finishes, even if the caller stopped
//! waiting.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use prometheus::{Histogram, IntGauge};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::DispatcherConfig;
use crate::converter::Converter;
use crate::error::ConversionError;
use crate::metrics::{CONVERSIONS_IN_FLIGHT, CONVERSIONS_TOTAL, CONVERSION_DURATION};
use crate::store::{MediaArtifact, TransientStore};

/// Snapshot of worker slot usage.
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStatus {
    pub max_parallel_conversions: usize,
    pub available_slots: usize,
    pub conversion_timeout_secs: Option<u64>,
}

/// Hands conversions to the blocking pool and awaits them.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: TransientStore,
    semaphore: Arc<Semaphore>,
    max_parallel: usize,
    timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(store: TransientStore, max_parallel: usize, timeout: Option<Duration>) -> Self {
        let max_parallel = max_parallel.max(1);
        Self {
            store,
            semaphore: Arc::new(Semaphore::new(max_parallel)),
            max_parallel,
            timeout,
        }
    }

    pub fn from_config(store: TransientStore, config: &DispatcherConfig) -> Self {
        Self::new(
            store,
            config.max_parallel_conversions,
            config.conversion_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn status(&self) -> DispatcherStatus {
        DispatcherStatus {
            max_parallel_conversions: self.max_parallel,
            available_slots: self.semaphore.available_permits(),
            conversion_timeout_secs: self.timeout.map(|t| t.as_secs()),
        }
    }

    /// Runs `converter` on `input` and waits for its artifact.
    ///
    /// Waiting for a free slot and waiting for the worker both yield to the
    /// runtime. On timeout the worker keeps running; whatever it produces
    /// afterwards is deleted.
    pub async fn dispatch<C>(
        &self,
        converter: Arc<C>,
        input: PathBuf,
        options: C::Options,
    ) -> Result<MediaArtifact, ConversionError>
    where
        C: Converter + ?Sized + 'static,
    {
        let name = converter.name();
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ConversionError::conversion_failed("Dispatcher is closed", None))?;

        debug!(converter = name, input = %input.display(), "Dispatching conversion");

        let mut handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _timer = InFlightTimer::start(
                &CONVERSIONS_IN_FLIGHT,
                CONVERSION_DURATION.with_label_values(&[name]),
            );
            converter.convert(&input, &options)
        });

        let joined = match self.timeout {
            None => (&mut handle).await,
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(
                        converter = name,
                        timeout_ms = limit.as_millis() as u64,
                        "Conversion timed out, output will be discarded when it finishes"
                    );
                    self.discard_late_output(name, handle);
                    CONVERSIONS_TOTAL.with_label_values(&[name, "timeout"]).inc();
                    return Err(ConversionError::Timeout {
                        timeout_secs: limit.as_secs(),
                    });
                }
            },
        };

        let result = match joined {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(ConversionError::conversion_failed(
                format!("{} worker panicked", name),
                None,
            )),
            Err(e) => Err(ConversionError::conversion_failed(
                format!("{} worker was cancelled: {}", name, e),
                None,
            )),
        };

        match &result {
            Ok(artifact) => {
                info!(converter = name, output = %artifact.path.display(), "Conversion finished");
                CONVERSIONS_TOTAL.with_label_values(&[name, "ok"]).inc();
            }
            Err(e) => {
                warn!(converter = name, error = %e.detailed_message(), "Conversion failed");
                CONVERSIONS_TOTAL
                    .with_label_values(&[name, e.kind().as_str()])
                    .inc();
            }
        }

        result
    }

    fn discard_late_output(
        &self,
        name: &'static str,
        handle: tokio::task::JoinHandle<Result<MediaArtifact, ConversionError>>,
    ) {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Ok(Ok(artifact)) = handle.await {
                debug!(converter = name, path = %artifact.path.display(), "Discarding late output");
                store.delete(&artifact.path).await;
            }
        });
    }
}

/// Counts one running conversion and records its duration when dropped,
/// including when the converter panics.
struct InFlightTimer<'a> {
    in_flight: &'a IntGauge,
    duration: Histogram,
    start: Instant,
}

impl<'a> InFlightTimer<'a> {
    fn start(in_flight: &'a IntGauge, duration: Histogram) -> Self {
        in_flight.inc();
        Self {
            in_flight,
            duration,
            start: Instant::now(),
        }
    }
}

impl Drop for InFlightTimer<'_> {
    fn drop(&mut self) {
        self.in_flight.dec();
        self.duration.observe(self.start.elapsed().as_secs_f64());
    }
}
