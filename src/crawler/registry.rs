//! Visited registry
//!
//! The registry is the single authority on which pages have been claimed for
//! crawling. Every admission decision goes through [`VisitedRegistry::claim`],
//! which checks and inserts under one lock, so a page reached through many
//! links is fetched once and the page budget cuts off at exactly the Nth claim.
//!
//! The registry also tracks in-flight crawl tasks. When the budget runs out it
//! enters a terminal stopped state and cancels the shared shutdown token, which
//! every tracked task observes.

use crate::url::NormalizedUrl;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Everything extracted from one successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// The URL the page was fetched from
    pub url: String,

    /// Page heading, possibly empty
    pub title: String,

    /// First paragraph, possibly empty
    pub excerpt: String,

    /// Absolute links to the same site, in document order
    pub internal_links: Vec<String>,

    /// Absolute links to other sites, in document order
    pub external_links: Vec<String>,

    /// Absolute image URLs, in document order
    pub image_urls: Vec<String>,
}

/// Result of trying to claim a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The caller owns this page and should fetch it
    Claimed,
    /// Another task claimed this page first
    AlreadyVisited,
    /// The page budget is used up; the crawl is shutting down
    BudgetExhausted,
}

/// Identifier of a tracked crawl task
pub type TaskId = u64;

#[derive(Debug, Default)]
struct RegistryState {
    /// `None` while a claimed page is still being fetched
    pages: HashMap<NormalizedUrl, Option<PageRecord>>,
    stopped: bool,
    in_flight: HashMap<TaskId, String>,
    next_task_id: TaskId,
}

/// Shared gate for "is this URL new work"
#[derive(Debug)]
pub struct VisitedRegistry {
    budget: usize,
    shutdown: CancellationToken,
    state: Mutex<RegistryState>,
}

impl VisitedRegistry {
    /// Creates a registry that admits at most `budget` distinct pages
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            shutdown: CancellationToken::new(),
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Maximum number of pages that may be claimed
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Token cancelled when the registry stops
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Atomically claims a page for crawling
    ///
    /// Exactly one caller ever receives [`ClaimOutcome::Claimed`] for a given
    /// key. Once the registry has stopped, every call returns
    /// [`ClaimOutcome::BudgetExhausted`] without looking at the key. A new key
    /// arriving when the registry is full stops the registry and cancels every
    /// in-flight task.
    pub fn claim(&self, key: &NormalizedUrl) -> ClaimOutcome {
        let mut state = self.lock();

        if state.stopped {
            return ClaimOutcome::BudgetExhausted;
        }

        if state.pages.contains_key(key) {
            return ClaimOutcome::AlreadyVisited;
        }

        if state.pages.len() >= self.budget {
            state.stopped = true;
            tracing::info!(
                "Reached maximum number of pages to crawl ({}); cancelling {} in-flight tasks",
                self.budget,
                state.in_flight.len()
            );
            for url in state.in_flight.values() {
                tracing::debug!("Cancelling in-flight crawl of {}", url);
            }
            self.shutdown.cancel();
            return ClaimOutcome::BudgetExhausted;
        }

        state.pages.insert(key.clone(), None);
        ClaimOutcome::Claimed
    }

    /// Attaches the finished record to a claimed page
    ///
    /// # Panics
    ///
    /// Panics if `key` was never claimed or already has a record. Either case
    /// means the caller skipped the claim protocol.
    pub fn record(&self, key: &NormalizedUrl, record: PageRecord) {
        let outcome = {
            let mut state = self.lock();
            match state.pages.get_mut(key) {
                Some(slot) if slot.is_none() => {
                    *slot = Some(record);
                    Ok(())
                }
                Some(_) => Err("already has a record"),
                None => Err("was never claimed"),
            }
        };

        if let Err(reason) = outcome {
            panic!("cannot record page {}: key {}", key, reason);
        }
    }

    /// Returns true once the budget has been exhausted
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Number of claimed pages, with or without a record
    pub fn len(&self) -> usize {
        self.lock().pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers a running crawl task
    ///
    /// The task stays in the in-flight set until the returned guard is dropped,
    /// whether it finishes, fails, or is cancelled. The guard's token fires when
    /// the registry stops.
    pub fn track(&self, url: &str) -> InFlightGuard<'_> {
        let mut state = self.lock();
        let id = state.next_task_id;
        state.next_task_id += 1;
        state.in_flight.insert(id, url.to_string());

        InFlightGuard {
            registry: self,
            id,
            token: self.shutdown.child_token(),
        }
    }

    /// Number of crawl tasks currently running
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight.len()
    }

    /// Copies the current contents into an immutable [`VisitedSet`]
    pub fn snapshot(&self) -> VisitedSet {
        let state = self.lock();
        VisitedSet {
            pages: state
                .pages
                .iter()
                .map(|(key, record)| (key.clone(), record.clone()))
                .collect(),
        }
    }

    fn untrack(&self, id: TaskId) {
        self.lock().in_flight.remove(&id);
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // No method panics while holding the lock mid-update
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Membership of one task in the in-flight set
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    registry: &'a VisitedRegistry,
    id: TaskId,
    token: CancellationToken,
}

impl InFlightGuard<'_> {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Cancellation signal for this task
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.untrack(self.id);
    }
}

/// Immutable result of a crawl: every claimed page, keyed by normalized URL
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    pages: BTreeMap<NormalizedUrl, Option<PageRecord>>,
}

impl VisitedSet {
    /// Number of claimed pages, including ones that never got a record
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn contains(&self, key: &NormalizedUrl) -> bool {
        self.pages.contains_key(key)
    }

    /// The record for `key`, if the page was fetched and extracted
    pub fn get(&self, key: &NormalizedUrl) -> Option<&PageRecord> {
        self.pages.get(key).and_then(Option::as_ref)
    }

    /// Completed records in key order
    pub fn records(&self) -> impl Iterator<Item = (&NormalizedUrl, &PageRecord)> {
        self.pages
            .iter()
            .filter_map(|(key, record)| record.as_ref().map(|r| (key, r)))
    }

    /// Keys that were claimed but never recorded
    pub fn pending(&self) -> impl Iterator<Item = &NormalizedUrl> {
        self.pages
            .iter()
            .filter(|(_, record)| record.is_none())
            .map(|(key, _)| key)
    }

    /// Number of completed records
    pub fn record_count(&self) -> usize {
        self.records().count()
    }
}
