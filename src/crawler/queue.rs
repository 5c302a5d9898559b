//! Fetch queue: per-host dispatch, politeness, and lifecycle
//!
//! The queue is the transport half of the crawl. An admission channel feeds
//! a dispatcher task that routes each frontier entry to a worker owned by
//! that entry's host; workers enforce the per-host crawl delay, expire after
//! an idle TTL, and stream completed fetches back to the runner.
//!
//! Lifecycle: [`QueueHandle::close`] is graceful (no new admissions, queued
//! and in-flight work finishes), [`QueueHandle::cancel`] is immediate
//! (queued work discarded, workers stop at the next cancellation point).
//! Both may be called from any task; workers observe a shared cancellation
//! token rather than being signalled from inside a handler's call stack.

use crate::crawler::fetcher::{perform, FetchOutcome, Method};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::time::{sleep_until, timeout, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Behavior knobs for the fetch queue
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Minimum delay between consecutive requests to the same host
    pub crawl_delay: Duration,

    /// How long a host worker lives with no pending work for its host
    pub worker_idle_ttl: Duration,

    /// Shut the queue down after one idle TTL once the frontier drains
    pub auto_close: bool,
}

struct FetchTask {
    url: Url,
    method: Method,
}

/// A completed fetch handed to the runner
///
/// The guard must stay alive until the handler has finished with this
/// response, including any follow-up enqueues; dropping it marks the task
/// done for drain accounting.
pub struct CompletedFetch {
    pub outcome: FetchOutcome,
    pub guard: TaskGuard,
}

/// Marks one queue task finished when dropped
pub struct TaskGuard {
    shared: Arc<Shared>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.shared.task_finished();
    }
}

struct Shared {
    /// Tasks admitted but not yet fully handled
    pending: AtomicUsize,
    closed: AtomicBool,
    cancel: CancellationToken,
    drained: Notify,
    auto_close: bool,
    worker_idle_ttl: Duration,
}

impl Shared {
    fn task_started(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    fn task_finished(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }

    fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Resolves when the queue should shut down: an explicit close with all
    /// work drained, or (under auto-close) a full idle TTL with nothing
    /// pending.
    async fn wait_shutdown(&self) {
        loop {
            let notified = self.drained.notified();

            if self.is_closed() && self.pending() == 0 {
                return;
            }

            if self.pending() == 0 {
                match timeout(self.worker_idle_ttl, notified).await {
                    Ok(()) => continue,
                    Err(_) => {
                        if self.auto_close && self.pending() == 0 {
                            return;
                        }
                    }
                }
            } else {
                notified.await;
            }
        }
    }
}

/// Handle for admitting work and controlling the queue's lifecycle
#[derive(Clone)]
pub struct QueueHandle {
    tx: mpsc::UnboundedSender<FetchTask>,
    shared: Arc<Shared>,
}

impl QueueHandle {
    /// Admits a fetch task into the frontier
    ///
    /// Returns false when the queue is closed, cancelled, or already shut
    /// down; the task is silently dropped in that case.
    pub fn enqueue(&self, method: Method, url: Url) -> bool {
        if self.shared.is_closed() || self.shared.cancel.is_cancelled() {
            return false;
        }
        self.shared.task_started();
        if self.tx.send(FetchTask { url, method }).is_err() {
            self.shared.task_finished();
            return false;
        }
        true
    }

    /// Graceful shutdown: stops admitting new tasks, lets queued and
    /// in-flight work finish
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        self.shared.drained.notify_waiters();
    }

    /// Immediate shutdown: discards queued work and stops workers at their
    /// next cancellation point
    pub fn cancel(&self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        self.shared.cancel.cancel();
        self.shared.drained.notify_waiters();
    }

    /// Returns true once a cancel has fired
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Number of admitted tasks not yet fully handled
    pub fn pending(&self) -> usize {
        self.shared.pending()
    }
}

/// The fetch queue itself; constructed via [`FetchQueue::start`]
pub struct FetchQueue;

impl FetchQueue {
    /// Starts the queue and returns its handle plus the stream of completed
    /// fetches
    ///
    /// The stream ends when the queue has shut down: after a cancel, after a
    /// close once the remaining work drains, or after the frontier stays
    /// empty for one idle TTL under auto-close.
    pub fn start(
        client: Client,
        config: QueueConfig,
    ) -> (QueueHandle, mpsc::UnboundedReceiver<CompletedFetch>) {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            pending: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            drained: Notify::new(),
            auto_close: config.auto_close,
            worker_idle_ttl: config.worker_idle_ttl,
        });

        let handle = QueueHandle {
            tx: task_tx,
            shared: Arc::clone(&shared),
        };

        tokio::spawn(dispatch(task_rx, client, config, shared, result_tx));

        (handle, result_rx)
    }
}

/// Routes admitted tasks to per-host workers until shutdown
async fn dispatch(
    mut tasks: mpsc::UnboundedReceiver<FetchTask>,
    client: Client,
    config: QueueConfig,
    shared: Arc<Shared>,
    results: mpsc::UnboundedSender<CompletedFetch>,
) {
    let mut hosts: HashMap<String, mpsc::UnboundedSender<FetchTask>> = HashMap::new();

    loop {
        tokio::select! {
            _ = shared.cancel.cancelled() => break,
            _ = shared.wait_shutdown() => break,
            maybe = tasks.recv() => {
                match maybe {
                    Some(task) => route(task, &mut hosts, &client, &config, &shared, &results),
                    None => break,
                }
            }
        }
    }

    shared.closed.store(true, Ordering::SeqCst);

    // Tasks admitted but never routed are discarded; account for them so a
    // drain observer is not left waiting.
    while let Ok(_task) = tasks.try_recv() {
        shared.task_finished();
    }
}

/// Hands a task to its host's worker, spawning or respawning one as needed
fn route(
    task: FetchTask,
    hosts: &mut HashMap<String, mpsc::UnboundedSender<FetchTask>>,
    client: &Client,
    config: &QueueConfig,
    shared: &Arc<Shared>,
    results: &mpsc::UnboundedSender<CompletedFetch>,
) {
    let host = task.url.host_str().unwrap_or("").to_string();

    // An existing worker may have expired its idle TTL; recover the task
    // from the dead channel and respawn.
    let task = match hosts.get(&host) {
        Some(worker) => match worker.send(task) {
            Ok(()) => return,
            Err(mpsc::error::SendError(task)) => {
                hosts.remove(&host);
                task
            }
        },
        None => task,
    };

    let (worker_tx, worker_rx) = mpsc::unbounded_channel();
    if worker_tx.send(task).is_ok() {
        tracing::debug!(host = %host, "spawning host worker");
        tokio::spawn(host_worker(
            host.clone(),
            worker_rx,
            client.clone(),
            config.clone(),
            Arc::clone(shared),
            results.clone(),
        ));
        hosts.insert(host, worker_tx);
    }
}

/// Serially fetches one host's tasks, honoring the crawl delay
async fn host_worker(
    host: String,
    mut tasks: mpsc::UnboundedReceiver<FetchTask>,
    client: Client,
    config: QueueConfig,
    shared: Arc<Shared>,
    results: mpsc::UnboundedSender<CompletedFetch>,
) {
    let mut last_request: Option<Instant> = None;

    loop {
        let task = tokio::select! {
            _ = shared.cancel.cancelled() => break,
            received = timeout(config.worker_idle_ttl, tasks.recv()) => match received {
                Err(_) => {
                    tracing::debug!(host = %host, "host worker expired after idle TTL");
                    break;
                }
                Ok(None) => break,
                Ok(Some(task)) => task,
            },
        };

        // Politeness delay between consecutive requests to this host.
        if let Some(last) = last_request {
            let ready_at = last + config.crawl_delay;
            tokio::select! {
                _ = shared.cancel.cancelled() => {
                    shared.task_finished();
                    break;
                }
                _ = sleep_until(ready_at) => {}
            }
        }
        last_request = Some(Instant::now());

        let outcome = tokio::select! {
            _ = shared.cancel.cancelled() => {
                shared.task_finished();
                break;
            }
            outcome = perform(&client, task.method, &task.url) => outcome,
        };

        let guard = TaskGuard {
            shared: Arc::clone(&shared),
        };
        if results
            .send(CompletedFetch { outcome, guard })
            .is_err()
        {
            // Receiver gone; the guard inside the rejected send has already
            // accounted for this task.
            break;
        }
    }

    // Discard whatever is still queued for this host.
    while let Ok(_task) = tasks.try_recv() {
        shared.task_finished();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::build_http_client;

    fn test_config() -> QueueConfig {
        QueueConfig {
            crawl_delay: Duration::from_millis(10),
            worker_idle_ttl: Duration::from_millis(50),
            auto_close: true,
        }
    }

    #[tokio::test]
    async fn test_empty_queue_shuts_down_under_auto_close() {
        let client = build_http_client("TestSkimmer/1.0").unwrap();
        let (_handle, mut results) = FetchQueue::start(client, test_config());

        // No work ever admitted: the stream must end after one idle TTL.
        let next = timeout(Duration::from_secs(2), results.recv()).await;
        assert!(matches!(next, Ok(None)));
    }

    #[tokio::test]
    async fn test_enqueue_after_close_rejected() {
        let client = build_http_client("TestSkimmer/1.0").unwrap();
        let (handle, _results) = FetchQueue::start(client, test_config());

        handle.close();
        let url = Url::parse("http://example.com/").unwrap();
        assert!(!handle.enqueue(Method::Get, url));
        assert_eq!(handle.pending(), 0);
    }

    #[tokio::test]
    async fn test_enqueue_after_cancel_rejected() {
        let client = build_http_client("TestSkimmer/1.0").unwrap();
        let (handle, _results) = FetchQueue::start(client, test_config());

        handle.cancel();
        assert!(handle.is_cancelled());
        let url = Url::parse("http://example.com/").unwrap();
        assert!(!handle.enqueue(Method::Head, url));
    }

    #[tokio::test]
    async fn test_cancel_ends_result_stream() {
        let client = build_http_client("TestSkimmer/1.0").unwrap();
        let (handle, mut results) = FetchQueue::start(client, test_config());

        handle.cancel();
        let next = timeout(Duration::from_secs(2), results.recv()).await;
        assert!(matches!(next, Ok(None)));
    }

    #[tokio::test]
    async fn test_task_guard_accounting() {
        let shared = Arc::new(Shared {
            pending: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            drained: Notify::new(),
            auto_close: true,
            worker_idle_ttl: Duration::from_millis(50),
        });

        shared.task_started();
        shared.task_started();
        assert_eq!(shared.pending(), 2);

        let guard = TaskGuard {
            shared: Arc::clone(&shared),
        };
        drop(guard);
        assert_eq!(shared.pending(), 1);

        shared.task_finished();
        assert_eq!(shared.pending(), 0);
    }
}
