//! The rate-limit-aware batch fetch loop.
//!
//! One logical worker issues lookup calls strictly one after another;
//! the doze is a blocking wait on that same path. Raw documents are
//! handed to the caller through a bounded channel, so consumption is
//! lazy and dropping the receiver cancels the run before the next send.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::batch::{partition, MAX_LOOKUP_BATCH};
use crate::error::FetchResult;
use crate::ratelimit::RateLimitStatus;

/// The result of one lookup call.
#[derive(Debug, Clone, Default)]
pub struct LookupPage {
    /// Raw JSON documents, one per returned tweet, in the order the
    /// collaborator returned them.
    pub tweets: Vec<String>,

    /// Rate limit feedback for this call, when the transport exposes it.
    pub rate_limit: Option<RateLimitStatus>,
}

/// A collaborator that resolves a batch of ids into raw tweet documents.
#[async_trait]
pub trait TweetLookup: Send + Sync {
    /// Look up at most [`MAX_LOOKUP_BATCH`] ids.
    async fn lookup(&self, ids: &[u64]) -> FetchResult<LookupPage>;
}

/// Drives the sequential fetch loop over a [`TweetLookup`] collaborator.
pub struct TweetFetcher<L> {
    lookup: L,
}

impl<L> TweetFetcher<L>
where
    L: TweetLookup + 'static,
{
    pub const fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Fetch the given ids, yielding each tweet's raw JSON document.
    ///
    /// Batches are issued one at a time. A failed batch is logged and
    /// its ids dropped for this run; the loop moves on to the next
    /// batch rather than aborting or retrying. After each successful
    /// batch the server's rate limit feedback is inspected and the loop
    /// dozes if the quota is nearly exhausted.
    ///
    /// Dropping the returned receiver stops the loop; no in-flight call
    /// is aborted mid-batch.
    #[must_use]
    pub fn fetch(self, ids: Vec<u64>) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(MAX_LOOKUP_BATCH);
        tokio::spawn(async move {
            run_fetch_loop(self.lookup, ids, tx).await;
        });
        rx
    }
}

async fn run_fetch_loop<L: TweetLookup>(lookup: L, ids: Vec<u64>, tx: mpsc::Sender<String>) {
    let batches = partition(&ids, MAX_LOOKUP_BATCH);
    let total = batches.len();

    for (n, batch) in batches.into_iter().enumerate() {
        debug!(batch = n + 1, total, ids = batch.len(), "Looking up batch");

        let page = match lookup.lookup(&batch).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    batch = n + 1,
                    ids = batch.len(),
                    error = %e,
                    "Batch lookup failed, attempting to continue"
                );
                continue;
            }
        };

        for raw in page.tweets {
            if tx.send(raw).await.is_err() {
                info!("Receiver dropped, stopping fetch");
                return;
            }
        }

        if let Some(status) = page.rate_limit {
            maybe_doze(status).await;
        }
    }
}

/// Respect the server's authority on rate limits.
async fn maybe_doze(status: RateLimitStatus) {
    if let Some(doze) = status.doze_duration() {
        info!(
            seconds = doze.as_secs(),
            remaining = status.remaining_calls,
            "Rate limit nearly exhausted, dozing"
        );
        sleep(doze).await;
        info!("Resuming");
    }
}
