//! HTTP polling data source.
//!
//! Fetches a JSON payload from a URL on a fixed schedule, publishing
//! [`FetchSnapshot`] values through a watch channel. Any fetch failure is
//! collapsed into the `Failed` phase with a descriptive message and the
//! caller-supplied fallback dataset substituted as the current payload.
//!
//! Cancellation is epoch-based: the background task captures an epoch token
//! when it is spawned and every publish is a no-op unless the token still
//! matches. `stop()` (and a re-`start()`) increments the epoch before
//! aborting the task, so a slow in-flight fetch can never overwrite state
//! published after the source was stopped or retargeted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::{FetchPhase, FetchSnapshot};

/// A fetch-layer failure.
///
/// All variants are recovered automatically by fallback substitution; they
/// reach consumers only as the message inside a `Failed` snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
    #[error("malformed payload: {0}")]
    Malformed(#[source] reqwest::Error),
}

/// A data source that polls an HTTP endpoint for JSON payloads.
///
/// Generic over the payload type; the dashboard uses
/// [`MetricsSnapshot`](super::MetricsSnapshot) but the source treats the
/// body as opaque. One instance owns at most one schedule: `start()` stops
/// any previous schedule before establishing the new one, and dropping the
/// source releases the timer.
///
/// # Example
///
/// ```no_run
/// use spcwatch::source::{MetricsSnapshot, PollingSource};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let mut source: PollingSource<MetricsSnapshot> = PollingSource::new();
/// source.start(
///     "http://localhost:8080/metrics",
///     MetricsSnapshot::new(),
///     Some(Duration::from_secs(5)),
/// );
/// let snapshot = source.snapshot();
/// # });
/// ```
#[derive(Debug)]
pub struct PollingSource<T> {
    client: Client,
    tx: Arc<watch::Sender<FetchSnapshot<T>>>,
    rx: watch::Receiver<FetchSnapshot<T>>,
    epoch: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
    description: String,
}

impl<T> PollingSource<T> {
    /// Create an idle source with a default HTTP client.
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create an idle source using the given HTTP client.
    pub fn with_client(client: Client) -> Self {
        let (tx, rx) = watch::channel(FetchSnapshot::idle());
        Self {
            client,
            tx: Arc::new(tx),
            rx,
            epoch: Arc::new(AtomicU64::new(0)),
            task: None,
            description: "poll: (not started)".to_string(),
        }
    }

    /// Cancel the current schedule, if any.
    ///
    /// Increments the epoch so that an in-flight fetch's completion is a
    /// published no-op, then aborts the background task. Safe to call
    /// repeatedly; also invoked on drop.
    pub fn stop(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Returns a human-readable description of the source.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Subscribe to published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<FetchSnapshot<T>> {
        self.tx.subscribe()
    }
}

impl<T> Default for PollingSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PollingSource<T>
where
    T: Clone,
{
    /// Poll for a new snapshot.
    ///
    /// Returns `Some` if the published state changed since the last call,
    /// `None` otherwise. Non-blocking.
    pub fn poll(&mut self) -> Option<FetchSnapshot<T>> {
        if self.rx.has_changed().unwrap_or(false) {
            Some(self.rx.borrow_and_update().clone())
        } else {
            None
        }
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> FetchSnapshot<T> {
        self.rx.borrow().clone()
    }

    /// The last failure message, if the source is currently degraded.
    pub fn error(&self) -> Option<String> {
        self.rx.borrow().error.clone()
    }
}

impl<T> PollingSource<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Begin polling `url`, replacing any previous schedule.
    ///
    /// The first fetch is issued immediately. When `refresh` is `Some`,
    /// subsequent fetches run at that fixed period whether or not the
    /// previous cycle succeeded; when `None`, the source fetches once.
    ///
    /// On failure the published payload becomes `fallback`, verbatim, so
    /// consumers always have a renderable dataset after the first cycle.
    pub fn start(&mut self, url: impl Into<String>, fallback: T, refresh: Option<Duration>) {
        self.stop();

        let url = url.into();
        self.description = format!("poll: {}", url);

        let token = self.epoch.load(Ordering::SeqCst);
        let task = poll_loop(
            self.client.clone(),
            url,
            fallback,
            refresh,
            self.tx.clone(),
            self.epoch.clone(),
            token,
        );
        self.task = Some(tokio::spawn(task));
    }
}

impl<T> Drop for PollingSource<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The background fetch loop. One cycle: Loading → request → Ready/Failed.
async fn poll_loop<T>(
    client: Client,
    url: String,
    fallback: T,
    refresh: Option<Duration>,
    tx: Arc<watch::Sender<FetchSnapshot<T>>>,
    epoch: Arc<AtomicU64>,
    token: u64,
) where
    T: DeserializeOwned + Clone,
{
    // Fixed-period schedule, independent of cycle outcome. Delayed
    // missed-tick behavior keeps cycles strictly sequential when a fetch
    // outlasts the period.
    let mut ticker = refresh.map(|period| {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    loop {
        if let Some(ticker) = ticker.as_mut() {
            // The first tick completes immediately.
            ticker.tick().await;
        }

        let loading = {
            let prev = tx.borrow();
            FetchSnapshot {
                phase: FetchPhase::Loading,
                data: prev.data.clone(),
                error: prev.error.clone(),
            }
        };
        publish(&tx, &epoch, token, loading);

        match fetch_payload::<T>(&client, &url).await {
            Ok(payload) => {
                tracing::debug!(url = %url, "fetch succeeded");
                publish(
                    &tx,
                    &epoch,
                    token,
                    FetchSnapshot {
                        phase: FetchPhase::Ready,
                        data: Some(payload),
                        error: None,
                    },
                );
            }
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "fetch failed, substituting fallback");
                publish(
                    &tx,
                    &epoch,
                    token,
                    FetchSnapshot {
                        phase: FetchPhase::Failed,
                        data: Some(fallback.clone()),
                        error: Some(err.to_string()),
                    },
                );
            }
        }

        if ticker.is_none() {
            break;
        }
    }
}

/// Publish a snapshot unless the source has been stopped or retargeted
/// since this cycle was issued.
fn publish<T>(
    tx: &watch::Sender<FetchSnapshot<T>>,
    epoch: &AtomicU64,
    token: u64,
    snapshot: FetchSnapshot<T>,
) {
    tx.send_if_modified(|state| {
        if epoch.load(Ordering::SeqCst) == token {
            *state = snapshot;
            true
        } else {
            false
        }
    });
}

/// Issue one GET and parse the JSON body.
async fn fetch_payload<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, FetchError> {
    let response = client.get(url).send().await.map_err(FetchError::Network)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    response.json::<T>().await.map_err(FetchError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Wait until the published snapshot satisfies the predicate, or panic.
    async fn wait_for<T, F>(source: &PollingSource<T>, mut pred: F) -> FetchSnapshot<T>
    where
        T: Clone + std::fmt::Debug,
        F: FnMut(&FetchSnapshot<T>) -> bool,
    {
        let mut rx = source.subscribe();
        for _ in 0..100 {
            {
                let snap = rx.borrow_and_update().clone();
                if pred(&snap) {
                    return snap;
                }
            }
            let _ = tokio::time::timeout(Duration::from_millis(50), rx.changed()).await;
        }
        panic!("condition not reached; last snapshot: {:?}", *rx.borrow());
    }

    #[tokio::test]
    async fn test_success_publishes_ready_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![5.0, 6.0]))
            .mount(&server)
            .await;

        let mut source: PollingSource<Vec<f64>> = PollingSource::new();
        source.start(format!("{}/metrics", server.uri()), vec![0.0], None);

        let snap = wait_for(&source, |s| s.phase == FetchPhase::Ready).await;
        assert_eq!(snap.data, Some(vec![5.0, 6.0]));
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn test_http_error_substitutes_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut source: PollingSource<Vec<f64>> = PollingSource::new();
        source.start(
            format!("{}/metrics", server.uri()),
            vec![1.0, 2.0, 3.0],
            None,
        );

        let snap = wait_for(&source, |s| s.phase == FetchPhase::Failed).await;
        assert_eq!(snap.data, Some(vec![1.0, 2.0, 3.0]));
        assert!(snap.error.as_deref().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_malformed_body_substitutes_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let mut source: PollingSource<Vec<f64>> = PollingSource::new();
        source.start(format!("{}/metrics", server.uri()), vec![9.0], None);

        let snap = wait_for(&source, |s| s.phase == FetchPhase::Failed).await;
        assert_eq!(snap.data, Some(vec![9.0]));
        assert!(snap.error.as_deref().unwrap().contains("malformed"));
    }

    #[tokio::test]
    async fn test_interval_refetches_on_schedule() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![1.0]))
            .mount(&server)
            .await;

        let mut source: PollingSource<Vec<f64>> = PollingSource::new();
        source.start(
            format!("{}/metrics", server.uri()),
            vec![],
            Some(Duration::from_millis(50)),
        );

        tokio::time::sleep(Duration::from_millis(400)).await;
        let requests = server.received_requests().await.unwrap();
        assert!(
            requests.len() >= 2,
            "expected repeated fetches, saw {}",
            requests.len()
        );
        let snap = wait_for(&source, |s| s.phase == FetchPhase::Ready).await;
        assert_eq!(snap.data, Some(vec![1.0]));
    }

    #[tokio::test]
    async fn test_stop_discards_in_flight_completion() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(vec![7.0])
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let mut source: PollingSource<Vec<f64>> = PollingSource::new();
        source.start(format!("{}/metrics", server.uri()), vec![0.0], None);

        tokio::time::sleep(Duration::from_millis(50)).await;
        source.stop();
        source.stop(); // idempotent

        tokio::time::sleep(Duration::from_millis(500)).await;
        let snap = source.snapshot();
        assert_eq!(snap.phase, FetchPhase::Loading);
        assert!(snap.data.is_none(), "late completion must not publish");
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn test_restart_retargets_without_stale_publishes() {
        let slow = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(vec![1.0])
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&slow)
            .await;

        let fast = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![2.0]))
            .mount(&fast)
            .await;

        let mut source: PollingSource<Vec<f64>> = PollingSource::new();
        source.start(
            format!("{}/metrics", slow.uri()),
            vec![],
            Some(Duration::from_millis(50)),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Retarget while the slow endpoint's response is still in flight.
        source.start(
            format!("{}/metrics", fast.uri()),
            vec![],
            Some(Duration::from_millis(50)),
        );

        let snap = wait_for(&source, |s| s.phase == FetchPhase::Ready).await;
        assert_eq!(snap.data, Some(vec![2.0]));

        // The slow endpoint's completion must never surface.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(source.snapshot().data, Some(vec![2.0]));
    }

    #[tokio::test]
    async fn test_ready_clears_previous_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![4.0]))
            .mount(&server)
            .await;

        let mut source: PollingSource<Vec<f64>> = PollingSource::new();
        source.start(
            format!("{}/metrics", server.uri()),
            vec![0.0],
            Some(Duration::from_millis(50)),
        );

        let failed = wait_for(&source, |s| s.phase == FetchPhase::Failed).await;
        assert!(failed.error.is_some());

        let ready = wait_for(&source, |s| s.phase == FetchPhase::Ready).await;
        assert_eq!(ready.data, Some(vec![4.0]));
        assert!(ready.error.is_none());
    }

    #[test]
    fn test_description_tracks_url() {
        let source: PollingSource<Vec<f64>> = PollingSource::new();
        assert_eq!(source.description(), "poll: (not started)");
    }
}
