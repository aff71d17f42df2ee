//! Fakes for the port traits and small fixtures shared by unit tests.

use crate::check::{CheckService, CheckSettings};
use crate::error::{DeliveryError, FetchError};
use crate::ports;
use crate::store::{SnapshotStore, SubscriptionStore};
use crate::types::schedule::{ScheduleRecord, Snapshot};

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub(crate) fn create_temp_root(test_name: &str) -> PathBuf {
    let mut root = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    root.push(format!("pilotwatch-{}-{}", test_name, nanos));
    std::fs::create_dir_all(&root).expect("create temp dir");
    root
}

pub(crate) fn record(id: &str, status: &str, time: &str, ship_name: &str) -> ScheduleRecord {
    ScheduleRecord {
        id: id.to_string(),
        status: status.to_string(),
        time: time.to_string(),
        ship_name: ship_name.to_string(),
        from: String::new(),
        to: String::new(),
        remark: String::new(),
    }
}

pub(crate) fn settings() -> CheckSettings {
    CheckSettings {
        restriction_keywords: vec!["Heavy Weather".to_string(), "Dense Fog".to_string()],
        max_lines_per_push: 3,
    }
}

pub(crate) fn service<F, S>(root: &Path, fetcher: F, sender: S) -> CheckService<F, S>
where
    F: ports::ScheduleFetcher,
    S: ports::PushSender,
{
    CheckService::new(
        fetcher,
        Some(sender),
        SnapshotStore::open(root),
        Arc::new(SubscriptionStore::open(root)),
        settings(),
    )
}

/// Returns queued snapshots in order; `None` entries and an exhausted queue
/// fail the fetch.
#[derive(Clone, Default)]
pub(crate) struct ScriptedFetcher {
    queue: Arc<Mutex<VecDeque<Option<Snapshot>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    pub(crate) fn new(snapshots: Vec<Option<Snapshot>>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(snapshots.into())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ports::ScheduleFetcher for ScriptedFetcher {
    type Fut<'a>
        = std::future::Ready<Result<Snapshot, FetchError>>
    where
        Self: 'a;

    fn fetch<'a>(&'a self) -> Self::Fut<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.queue.lock().expect("queue lock").pop_front().flatten();
        std::future::ready(next.ok_or_else(|| FetchError::Parse("scripted failure".to_string())))
    }
}

/// Never completes.
#[derive(Clone, Default)]
pub(crate) struct PendingFetcher;

impl ports::ScheduleFetcher for PendingFetcher {
    type Fut<'a>
        = std::future::Pending<Result<Snapshot, FetchError>>
    where
        Self: 'a;

    fn fetch<'a>(&'a self) -> Self::Fut<'a> {
        std::future::pending()
    }
}

/// Always returns the same snapshot. The first fetch waits until the
/// returned sender fires or is dropped.
#[derive(Clone)]
pub(crate) struct GatedFetcher {
    gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
    snapshot: Snapshot,
    calls: Arc<AtomicUsize>,
}

impl GatedFetcher {
    pub(crate) fn new(snapshot: Snapshot) -> (Self, oneshot::Sender<()>) {
        let (release, gate) = oneshot::channel();
        let fetcher = Self {
            gate: Arc::new(Mutex::new(Some(gate))),
            snapshot,
            calls: Arc::new(AtomicUsize::new(0)),
        };
        (fetcher, release)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ports::ScheduleFetcher for GatedFetcher {
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<Snapshot, FetchError>> + Send + 'a>>
    where
        Self: 'a;

    fn fetch<'a>(&'a self) -> Self::Fut<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().expect("gate lock").take();
        Box::pin(async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(self.snapshot.clone())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentPush {
    pub(crate) token: String,
    pub(crate) lines: Vec<String>,
    pub(crate) alarm_mode: bool,
}

/// Records successful sends; configured tokens fail as invalid or transient.
#[derive(Clone, Default)]
pub(crate) struct RecordingSender {
    sent: Arc<Mutex<Vec<SentPush>>>,
    attempts: Arc<AtomicUsize>,
    invalid_tokens: Arc<Mutex<HashSet<String>>>,
    failing_tokens: Arc<Mutex<HashSet<String>>>,
}

impl RecordingSender {
    pub(crate) fn with_invalid_token(self, token: &str) -> Self {
        self.invalid_tokens
            .lock()
            .expect("invalid tokens lock")
            .insert(token.to_string());
        self
    }

    pub(crate) fn with_failing_token(self, token: &str) -> Self {
        self.failing_tokens
            .lock()
            .expect("failing tokens lock")
            .insert(token.to_string());
        self
    }

    pub(crate) fn sent(&self) -> Vec<SentPush> {
        self.sent.lock().expect("sent lock").clone()
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ports::PushSender for RecordingSender {
    type Fut<'a>
        = std::future::Ready<Result<(), DeliveryError>>
    where
        Self: 'a;

    fn send<'a>(
        &'a self,
        token: &'a str,
        lines: &'a [String],
        alarm_mode: bool,
    ) -> Self::Fut<'a> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self
            .invalid_tokens
            .lock()
            .expect("invalid tokens lock")
            .contains(token)
        {
            return std::future::ready(Err(DeliveryError::InvalidToken));
        }
        if self
            .failing_tokens
            .lock()
            .expect("failing tokens lock")
            .contains(token)
        {
            return std::future::ready(Err(DeliveryError::Transient(
                "service unavailable".to_string(),
            )));
        }
        self.sent.lock().expect("sent lock").push(SentPush {
            token: token.to_string(),
            lines: lines.to_vec(),
            alarm_mode,
        });
        std::future::ready(Ok(()))
    }
}
