//! Shared batch loop for the row-oriented stages.
//!
//! Items are processed strictly in caller order, one at a time; a failure
//! is recorded into the item's output slot and the loop moves on. The
//! store callback runs after every item so a crash loses at most the row
//! in flight.

use anyhow::Result;
use tracing::{error, info};

use crate::retry::{with_retry, RetryPolicy};
use crate::services::ModelAdapter;

/// Work for one batch item, prepared up front so the loop itself stays
/// free of stage-specific logic.
#[derive(Clone, Debug)]
pub enum Job {
    /// Write this message without calling the model (capability mismatch).
    Skip(String),
    /// Invoke the model with this prompt and these image data URLs.
    Invoke {
        prompt: String,
        images: Vec<String>,
    },
}

/// Tally of a finished batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchStats {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

/// Process `jobs` in order through `adapter`, retrying per `policy`.
///
/// `store(index, cell)` receives the model text, the `sentinel` on
/// exhaustion, or the skip message; it is expected to persist the batch's
/// output file before returning.
pub async fn run_batch<P>(
    jobs: Vec<Job>,
    adapter: &ModelAdapter,
    policy: &RetryPolicy,
    sentinel: &str,
    mut store: P,
) -> Result<BatchStats>
where
    P: FnMut(usize, String) -> Result<()>,
{
    let total = jobs.len();
    let mut stats = BatchStats::default();

    for (index, job) in jobs.into_iter().enumerate() {
        let cell = match job {
            Job::Skip(message) => {
                info!("item {}/{}: skipped ({})", index + 1, total, message);
                stats.skipped += 1;
                message
            }
            Job::Invoke { prompt, images } => {
                let outcome =
                    with_retry(policy, || adapter.generate(&prompt, &images)).await;
                if outcome.is_failed() {
                    error!(
                        "item {}/{}: all attempts failed, recording sentinel",
                        index + 1,
                        total
                    );
                    stats.failed += 1;
                } else {
                    info!("item {}/{}: done", index + 1, total);
                    stats.succeeded += 1;
                }
                outcome.into_cell(sentinel)
            }
        };

        store(index, cell)?;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_total_sums_all_buckets() {
        let stats = BatchStats {
            succeeded: 3,
            failed: 1,
            skipped: 2,
        };
        assert_eq!(stats.total(), 6);
    }
}
