//! Crawler coordinator - main crawl orchestration logic
//!
//! Every discovered link gets its own task, which runs these steps in order:
//! 1. Domain check: links off the seed's site are dropped
//! 2. Claim: the visited registry admits each page once, within the budget
//! 3. Admission: a permit from the global fetch limiter
//! 4. Fetch (with retries); the permit is released as soon as the body arrives
//! 5. Extract and record the page
//! 6. Spawn one child task per internal link and join them all
//!
//! A task owns the children it spawns and is not finished until they are, so
//! the crawl is done when the seed's task returns. When the budget runs out
//! the registry cancels the shutdown token; a task waiting for a permit or a
//! response gives up, and its parent still joins it before finishing.

use crate::config::{validate, Config};
use crate::crawler::extractor::{HtmlExtractor, PageExtractor};
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::registry::{ClaimOutcome, VisitedRegistry, VisitedSet};
use crate::url::{is_same_site, parse_seed, site_key, NormalizedUrl};
use crate::{CrawlError, UrlError};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// State shared by every crawl task
struct CrawlContext {
    /// Site key of the seed; only links on this site are crawled
    site: String,
    registry: VisitedRegistry,
    fetcher: Fetcher,
    extractor: Box<dyn PageExtractor>,
    limiter: Semaphore,
}

impl CrawlContext {
    /// Crawls `url` and everything reachable from it
    fn visit(self: Arc<Self>, url: String) -> BoxFuture<'static, ()> {
        async move {
            let task = self.registry.track(&url);
            self.crawl_page(&url, task.token()).await;
        }
        .boxed()
    }

    async fn crawl_page(self: &Arc<Self>, url: &str, shutdown: &CancellationToken) {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Skipping unparsable link {}: {}", url, e);
                return;
            }
        };

        if !is_same_site(&parsed, &self.site) {
            tracing::trace!("Skipping off-site link {}", url);
            return;
        }

        let key = match NormalizedUrl::from_url(&parsed) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!("Failed to normalize {}: {}", url, e);
                return;
            }
        };

        match self.registry.claim(&key) {
            ClaimOutcome::Claimed => {}
            ClaimOutcome::AlreadyVisited => {
                tracing::trace!("Already visited {}", key);
                return;
            }
            ClaimOutcome::BudgetExhausted => {
                tracing::trace!("Page budget exhausted, discarding {}", url);
                return;
            }
        }

        // Waiting for a slot and the fetch itself are the only long waits
        // that can be abandoned; a body still in flight is discarded.
        let fetched = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                tracing::trace!("Abandoned {} after shutdown", url);
                return;
            }
            fetched = self.admit_and_fetch(url) => fetched,
        };
        let Some(document) = fetched else {
            return;
        };

        let record = self.extractor.extract(&document, &parsed);
        let links = record.internal_links.clone();
        self.registry.record(&key, record);
        tracing::debug!("Recorded {} with {} internal links", key, links.len());

        if shutdown.is_cancelled() {
            return;
        }

        let mut children = JoinSet::new();
        for link in links {
            children.spawn(Arc::clone(self).visit(link));
        }
        join_all(&mut children).await;
    }

    /// Holds a limiter permit from admission until the body has arrived
    async fn admit_and_fetch(&self, url: &str) -> Option<String> {
        let _permit = self.limiter.acquire().await.ok()?;

        tracing::info!("Crawling: {}", url);
        match self.fetcher.fetch(url).await {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                None
            }
        }
    }
}

/// Waits for every task in the set
///
/// A panicking child is a broken invariant, so the panic is re-raised in the
/// parent instead of being swallowed.
async fn join_all(tasks: &mut JoinSet<()>) {
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    seed: Url,
    seed_key: NormalizedUrl,
    context: CrawlContext,
}

impl Coordinator {
    /// Creates a coordinator for one crawl
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute HTTP(S) URL where the crawl starts
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - Invalid configuration or seed, or the HTTP client failed to build
    pub fn new(seed: &str, config: &Config) -> Result<Self, CrawlError> {
        validate(config)?;

        let seed = parse_seed(seed)?;
        let site = site_key(&seed).ok_or(UrlError::MissingDomain)?;
        let seed_key = NormalizedUrl::from_url(&seed)?;

        let client = build_http_client(&config.fetch)?;

        Ok(Self {
            seed,
            seed_key,
            context: CrawlContext {
                site,
                registry: VisitedRegistry::new(config.crawler.max_pages),
                fetcher: Fetcher::from_config(client, &config.fetch),
                extractor: Box::new(HtmlExtractor),
                limiter: Semaphore::new(config.crawler.max_concurrency),
            },
        })
    }

    /// Replaces the default HTML extractor
    pub fn with_extractor(mut self, extractor: impl PageExtractor + 'static) -> Self {
        self.context.extractor = Box::new(extractor);
        self
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Runs the crawl to completion
    ///
    /// Returns once the seed's task and all of its descendants have finished
    /// or been cancelled. Individual page failures only show up as missing
    /// records; the crawl itself fails only if the seed page produced no record.
    pub async fn run(self) -> Result<VisitedSet, CrawlError> {
        let Coordinator {
            seed,
            seed_key,
            context,
        } = self;
        let context = Arc::new(context);
        let start_time = Instant::now();

        tracing::info!(
            "Starting crawl of {} (max pages: {}, max concurrency: {})",
            seed,
            context.registry.budget(),
            context.limiter.available_permits()
        );

        let mut root = JoinSet::new();
        root.spawn(Arc::clone(&context).visit(seed.to_string()));
        join_all(&mut root).await;

        let visited = context.registry.snapshot();
        tracing::info!(
            "Crawl completed: {} pages recorded, {} claimed without a record, in {:?}",
            visited.record_count(),
            visited.pending().count(),
            start_time.elapsed()
        );

        if visited.get(&seed_key).is_none() {
            return Err(CrawlError::SeedUnreachable {
                url: seed.to_string(),
            });
        }

        Ok(visited)
    }
}
