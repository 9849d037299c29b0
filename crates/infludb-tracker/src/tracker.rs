//! Batch orchestration and the caller-facing account operations.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tokio::sync::watch;

use infludb_core::{classify, resolve_import_rows, Category, ImportRow, Platform, TrackedAccount};
use infludb_db::AccountStore;
use infludb_scraper::{Dispatch, Extractor, Extractors};

use crate::error::TrackerError;
use crate::report::{AccountOutcome, BatchReport, ImportSummary};

pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Runs extractions for tracked accounts and writes their outcomes.
///
/// Every outcome ends up in the account's persisted `category`. Callers
/// that display accounts should [`subscribe`](Self::subscribe) and re-read
/// the store when the generation counter moves.
pub struct Tracker {
    store: Arc<dyn AccountStore>,
    extractors: Extractors,
    max_concurrent: usize,
    refresh: watch::Sender<u64>,
}

impl Tracker {
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>, extractors: Extractors) -> Self {
        let (refresh, _) = watch::channel(0);
        Self {
            store,
            extractors,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            refresh,
        }
    }

    /// Upper bound on extractions in flight within one batch. Clamped to ≥ 1.
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Refresh generation counter. Moves once per finished batch and after
    /// each add, delete or import staging step.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.refresh.subscribe()
    }

    fn notify_refresh(&self) {
        self.refresh.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    /// Checks that need no network: a supported platform whose extractor
    /// exists, and a link that points at that same platform.
    fn preflight(&self, account: &TrackedAccount) -> Result<&dyn Extractor, TrackerError> {
        let Dispatch::Supported(extractor) = self.extractors.dispatch(account.platform) else {
            return Err(TrackerError::UnsupportedPlatform(
                account.platform.to_string(),
            ));
        };
        let inferred = Platform::infer_from_link(&account.link);
        if inferred != account.platform {
            return Err(TrackerError::PlatformMismatch {
                link: account.link.clone(),
                declared: account.platform,
                inferred,
            });
        }
        Ok(extractor)
    }

    async fn persist(&self, account: &TrackedAccount) {
        if let Err(e) = self.store.upsert(account).await {
            tracing::error!(link = %account.link, error = %e, "failed to persist account outcome");
        }
    }

    /// Extract one account and persist the result. Never fails and never
    /// unwinds: errors and panics both become `failed`.
    async fn run_one(&self, account: TrackedAccount, extractor: &dyn Extractor) -> AccountOutcome {
        let result = AssertUnwindSafe(extractor.extract(&account.link))
            .catch_unwind()
            .await;

        let (stored, error) = match result {
            Ok(Ok(followers)) => {
                let category = classify(followers);
                tracing::info!(
                    link = %account.link,
                    platform = %account.platform,
                    followers,
                    %category,
                    "extracted follower count"
                );
                (account.with_outcome(followers, category), None)
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    link = %account.link,
                    platform = %account.platform,
                    kind = e.kind().as_str(),
                    error = %e,
                    "extraction failed"
                );
                (account.with_outcome(0, Category::Failed), Some(e.to_string()))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(
                    link = %account.link,
                    platform = %account.platform,
                    panic = %message,
                    "extractor panicked"
                );
                (account.with_outcome(0, Category::Failed), Some(message))
            }
        };

        self.persist(&stored).await;
        outcome_of(&stored, error)
    }

    /// Run one batch over `accounts`.
    ///
    /// Accounts failing pre-flight are written as `failed_platform` without
    /// any network call. The rest run with at most `max_concurrent` in
    /// flight; each persists its own outcome as soon as it completes, and a
    /// failure in one never affects the others. The refresh counter moves
    /// once, after every task has finished.
    pub async fn update(&self, accounts: Vec<TrackedAccount>) -> BatchReport {
        let mut report = BatchReport::default();
        let mut dispatchable = Vec::with_capacity(accounts.len());

        for account in accounts {
            match self.preflight(&account) {
                Ok(extractor) => dispatchable.push((account, extractor)),
                Err(e) => {
                    tracing::warn!(link = %account.link, error = %e, "rejected before extraction");
                    let stored = account.with_outcome(0, Category::FailedPlatform);
                    self.persist(&stored).await;
                    report.record(outcome_of(&stored, Some(e.to_string())));
                }
            }
        }

        tracing::info!(
            dispatched = dispatchable.len(),
            rejected = report.failed_platform,
            max_concurrent = self.max_concurrent,
            "starting extraction batch"
        );

        // Built up front so the stream items are plain futures, not a
        // closure over borrowed extractors.
        let tasks: Vec<_> = dispatchable
            .into_iter()
            .map(|(account, extractor)| self.run_one(account, extractor))
            .collect();
        let outcomes: Vec<AccountOutcome> = stream::iter(tasks)
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;
        for outcome in outcomes {
            report.record(outcome);
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            failed_platform = report.failed_platform,
            "extraction batch complete"
        );
        self.notify_refresh();
        report
    }

    /// Validate, store as `pending`, then extract a single account.
    ///
    /// # Errors
    ///
    /// Validation errors ([`TrackerError::MissingField`],
    /// [`TrackerError::UnsupportedPlatform`], [`TrackerError::PlatformMismatch`])
    /// are returned before anything is stored or fetched.
    /// [`TrackerError::Store`] if the pending record cannot be written.
    pub async fn add_and_scrape_one(
        &self,
        name: &str,
        link: &str,
        platform: &str,
    ) -> Result<AccountOutcome, TrackerError> {
        let name = name.trim();
        let link = link.trim();
        if name.is_empty() {
            return Err(TrackerError::MissingField("name"));
        }
        if link.is_empty() {
            return Err(TrackerError::MissingField("link"));
        }
        let declared = Platform::from_tag(platform);
        if !declared.is_supported() {
            return Err(TrackerError::UnsupportedPlatform(
                platform.trim().to_string(),
            ));
        }

        let account = TrackedAccount::pending(name, link, declared);
        let extractor = self.preflight(&account)?;

        self.store.upsert(&account).await?;
        self.notify_refresh();

        let outcome = self.run_one(account, extractor).await;
        self.notify_refresh();
        Ok(outcome)
    }

    /// Run a batch over every stored account.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Store`] if the accounts cannot be listed.
    pub async fn update_all(&self) -> Result<BatchReport, TrackerError> {
        let accounts = self.store.list().await?;
        Ok(self.update(accounts).await)
    }

    /// Run a batch over the given links. Links not in the store are skipped.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Store`] if a lookup fails.
    pub async fn update_selected(&self, links: &[String]) -> Result<BatchReport, TrackerError> {
        let mut accounts = Vec::with_capacity(links.len());
        for link in links {
            match self.store.get(link).await? {
                Some(account) => accounts.push(account),
                None => tracing::warn!(%link, "not tracked; skipping"),
            }
        }
        Ok(self.update(accounts).await)
    }

    /// # Errors
    ///
    /// [`TrackerError::Store`] wrapping `DbError::NotFound` if `link` is not
    /// tracked.
    pub async fn delete(&self, link: &str) -> Result<(), TrackerError> {
        self.store.delete(link).await?;
        self.notify_refresh();
        Ok(())
    }

    /// # Errors
    ///
    /// [`TrackerError::Store`] if the accounts cannot be listed.
    pub async fn list(&self) -> Result<Vec<TrackedAccount>, TrackerError> {
        Ok(self.store.list().await?)
    }

    /// Stage import rows, then run one batch over the resolvable ones.
    ///
    /// Rows missing a name or link are dropped. Rows whose platform cannot
    /// be resolved are stored as `failed_platform` and not extracted.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Store`] if staging fails. Rows staged before the
    /// failure stay stored.
    pub async fn import_rows(&self, rows: Vec<ImportRow>) -> Result<ImportSummary, TrackerError> {
        let plan = resolve_import_rows(rows);
        for account in plan.unsupported.iter().chain(plan.queued.iter()) {
            self.store.upsert(account).await?;
        }
        self.notify_refresh();

        tracing::info!(
            queued = plan.queued.len(),
            unsupported = plan.unsupported.len(),
            dropped = plan.dropped,
            "import staged"
        );

        let queued = plan.queued.len();
        let report = self.update(plan.queued).await;
        Ok(ImportSummary {
            queued,
            unsupported: plan.unsupported.len(),
            dropped: plan.dropped,
            report,
        })
    }
}

fn outcome_of(account: &TrackedAccount, error: Option<String>) -> AccountOutcome {
    AccountOutcome {
        link: account.link.clone(),
        platform: account.platform,
        followers: account.followers,
        category: account.category,
        error,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "extractor panicked".to_string())
}
