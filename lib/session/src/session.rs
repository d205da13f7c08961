use crate::query::QueryState;
use crate::scheduler::UpdateScheduler;
use parking_lot::{Mutex, RwLock};
use shapematch_core::{
    Dataset, EngineConfig, Error, QueryVector, RankedResult, RankingConfig, RankingEngine, RecordId,
    Result,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info};

/// Callback fired with every published result set
pub type Subscriber = Arc<dyn Fn(&Arc<RankedResult>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The dataset has no records; every ranking is empty
    NoData,
    Ready,
}

/// One running interactive session.
///
/// Holds the live dataset, the current query and the recompute scheduler.
/// Every query mutation schedules a recompute; the recompute itself runs from
/// [`Session::poll`], [`Session::flush`] or the driver task.
pub struct Session {
    dataset: Arc<Dataset>,
    engine: RankingEngine,
    query: RwLock<QueryState>,
    scheduler: Mutex<UpdateScheduler>,
    latest: RwLock<Arc<RankedResult>>,
    /// Held across rank, store and notify so generations publish in order
    publishing: Mutex<()>,
    subscribers: RwLock<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
    generation: AtomicU64,
    wake: Notify,
    closed: AtomicBool,
}

impl Session {
    /// Create a session and compute the initial ranking for the midpoint query
    pub fn new(dataset: Arc<Dataset>, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        if config.dim() != dataset.dim() {
            return Err(Error::InvalidDimension {
                expected: dataset.dim(),
                actual: config.dim(),
            });
        }

        let engine = RankingEngine::new(RankingConfig::from(config));
        let query = QueryState::new(dataset.dim());
        let initial = engine.rank(query.vector(), &dataset);

        info!(
            "Session ready: {} records, {} axes, top {} every {:?}",
            dataset.len(),
            dataset.dim(),
            config.top_n,
            config.throttle()
        );

        Ok(Self {
            dataset,
            engine,
            query: RwLock::new(query),
            scheduler: Mutex::new(UpdateScheduler::new(config.throttle())),
            latest: RwLock::new(Arc::new(initial)),
            publishing: Mutex::new(()),
            subscribers: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
            generation: AtomicU64::new(0),
            wake: Notify::new(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn status(&self) -> SessionStatus {
        if self.dataset.is_empty() {
            SessionStatus::NoData
        } else {
            SessionStatus::Ready
        }
    }

    /// Current query value
    pub fn query(&self) -> QueryVector {
        self.query.read().snapshot()
    }

    /// Most recently published result set
    pub fn latest(&self) -> Arc<RankedResult> {
        Arc::clone(&self.latest.read())
    }

    pub fn set_query(&self, vector: QueryVector) -> Result<()> {
        self.query.write().set(vector)?;
        self.on_input();
        Ok(())
    }

    /// Move one slider
    pub fn set_axis(&self, axis: usize, value: f32) -> Result<()> {
        self.query.write().set_axis(axis, value)?;
        self.on_input();
        Ok(())
    }

    /// Put every axis back at the midpoint
    pub fn reset_query(&self) {
        self.query.write().reset();
        self.on_input();
    }

    /// Use a record's shape as the query; its missing axes become 0
    pub fn adopt_shape_of(&self, id: &RecordId) -> Result<()> {
        let record = self
            .dataset
            .get(id)
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
        self.query.write().adopt(&record.vector)?;
        debug!("Adopted shape of {}", id);
        self.on_input();
        Ok(())
    }

    /// Signal one input event. Bursts collapse into a single recompute.
    pub fn on_input(&self) {
        let armed = self.scheduler.lock().schedule(Instant::now());
        if armed {
            self.wake.notify_one();
        }
    }

    /// When the pending recompute is due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.scheduler.lock().deadline()
    }

    /// Recompute if the pending deadline has passed at `now`
    pub fn poll(&self, now: Instant) -> Option<Arc<RankedResult>> {
        let due = self.scheduler.lock().poll(now);
        due.then(|| self.recompute())
    }

    /// Recompute immediately if an input is pending
    pub fn flush(&self) -> Option<Arc<RankedResult>> {
        let pending = self.scheduler.lock().flush();
        pending.then(|| self.recompute())
    }

    /// Rank the current query and publish the result to every subscriber.
    ///
    /// Concurrent calls are serialized, so `latest()` and subscribers always
    /// see generations in increasing order. Subscribers must not call
    /// `recompute`, `poll` or `flush` from inside the callback.
    pub fn recompute(&self) -> Arc<RankedResult> {
        let _publishing = self.publishing.lock();
        let query = self.query();
        let started = std::time::Instant::now();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let result = Arc::new(self.engine.rank(&query, &self.dataset).with_generation(generation));
        debug!(
            "Recompute #{}: {} of {} qualifying ({} peak-excluded, {} incomparable) in {:?}",
            generation,
            result.stats.returned,
            result.stats.qualifying,
            result.stats.peak_excluded,
            result.stats.incomparable,
            started.elapsed()
        );

        *self.latest.write() = Arc::clone(&result);

        let subscribers: Vec<Subscriber> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, s)| Arc::clone(s))
            .collect();
        for subscriber in subscribers {
            subscriber(&result);
        }
        result
    }

    /// Number of recomputes published since the session started
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Arc<RankedResult>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Stop the driver task after its current wait
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn notified(&self) -> Notified<'_> {
        self.wake.notified()
    }

    pub(crate) fn scheduler_counts(&self) -> (u64, u64) {
        let scheduler = self.scheduler.lock();
        (scheduler.fired_count(), scheduler.coalesced_count())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("records", &self.dataset.len())
            .field("query", &self.query())
            .field("generation", &self.generation())
            .field("closed", &self.is_closed())
            .finish()
    }
}
