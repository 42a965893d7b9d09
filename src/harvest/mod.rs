//! Harvest coordinator - fan-out/fan-in over targets
//!
//! One task per target, bounded by a semaphore, dispatched to the matching
//! platform client through a registry. Outcomes are collected in completion
//! order; a single target's failure never aborts the batch. Progress is
//! reported after every task completion and a shared cancellation flag is
//! observed at task and page boundaries.

mod cancel;
mod progress;
mod window;

pub use cancel::CancelFlag;
pub use progress::ProgressEvent;
pub use window::DateWindow;

use crate::matcher::{match_posts, MatchResult};
use crate::platform::{Platform, PlatformClient};
use crate::resolve::{Target, TargetSet};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// Default number of targets processed concurrently
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Why a target produced no matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Posts were fetched but none contained a keyword
    NoMatches,

    /// The platform could not be queried for this target
    FetchError,

    /// No client is registered for the target's platform
    UnsupportedPlatform,
}

impl EmptyReason {
    /// Human-readable label used in the report's unmatched sheet
    pub fn label(&self) -> &'static str {
        match self {
            EmptyReason::NoMatches => "no matches",
            EmptyReason::FetchError => "fetch error",
            EmptyReason::UnsupportedPlatform => "unsupported platform",
        }
    }
}

/// A processed target that produced no matches
#[derive(Debug, Clone)]
pub struct EmptyOutcome {
    pub target: Target,
    pub reason: EmptyReason,
}

/// All matches of one target, in fetch order
#[derive(Debug, Clone)]
pub struct TargetMatches {
    pub target: Target,
    pub matches: Vec<MatchResult>,
}

/// Fan-in result of one harvest run
#[derive(Debug, Clone, Default)]
pub struct HarvestSummary {
    /// Targets with at least one match, grouped per target, completion order
    pub matched: Vec<TargetMatches>,

    /// Targets with no matches, each with a reason code
    pub empties: Vec<EmptyOutcome>,
}

impl HarvestSummary {
    /// Total outcomes recorded (matched + empty)
    pub fn outcome_count(&self) -> usize {
        self.matched.len() + self.empties.len()
    }
}

enum Outcome {
    Matched(TargetMatches),
    Empty(EmptyOutcome),
}

/// Fan-out/fan-in driver over the resolved targets
pub struct Coordinator {
    clients: HashMap<Platform, Arc<dyn PlatformClient>>,
    concurrency: usize,
}

impl Coordinator {
    pub fn new(concurrency: usize) -> Self {
        Self {
            clients: HashMap::new(),
            concurrency: concurrency.max(1),
        }
    }

    /// Registers a platform client; at most one per platform
    pub fn register(&mut self, client: Arc<dyn PlatformClient>) {
        self.clients.insert(client.platform(), client);
    }

    /// Harvests every target and collects outcomes in completion order
    ///
    /// Exactly one outcome per target, unless the run is cancelled, in which
    /// case not-yet-started tasks are skipped and completed work is kept.
    /// Progress events are emitted after each completion; `Finished` is
    /// always the last event.
    pub async fn run(
        &self,
        targets: &TargetSet,
        keywords: &[String],
        window: DateWindow,
        cancel: CancelFlag,
        progress: Option<mpsc::UnboundedSender<ProgressEvent>>,
    ) -> HarvestSummary {
        let total = targets.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<Option<Outcome>> = JoinSet::new();

        for target in targets.iter().cloned() {
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();
            let client = self.clients.get(&target.platform).cloned();
            let keywords = keywords.to_vec();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                if cancel.is_cancelled() {
                    return None;
                }
                Some(process_target(client, target, &keywords, &window, &cancel).await)
            });
        }

        let mut summary = HarvestSummary::default();
        let mut completed = 0usize;

        while let Some(joined) = tasks.join_next().await {
            completed += 1;

            match joined {
                Ok(Some(Outcome::Matched(matches))) => summary.matched.push(matches),
                Ok(Some(Outcome::Empty(empty))) => summary.empties.push(empty),
                Ok(None) => continue, // skipped due to cancellation
                Err(e) => {
                    tracing::error!("Harvest task failed: {}", e);
                    continue;
                }
            }

            let percent = ((completed * 100) / total.max(1)) as u8;
            progress::emit(
                progress.as_ref(),
                ProgressEvent::Status {
                    percent,
                    message: format!(
                        "Processed {}/{}. Matched: {}, empty: {}",
                        completed,
                        total,
                        summary.matched.len(),
                        summary.empties.len()
                    ),
                },
            );
        }

        progress::emit(progress.as_ref(), ProgressEvent::Finished);
        summary
    }
}

/// Processes one target; every error becomes an empty outcome
async fn process_target(
    client: Option<Arc<dyn PlatformClient>>,
    target: Target,
    keywords: &[String],
    window: &DateWindow,
    cancel: &CancelFlag,
) -> Outcome {
    let Some(client) = client else {
        tracing::warn!(
            "No client registered for platform {} (target {})",
            target.platform,
            target.platform_id
        );
        return Outcome::Empty(EmptyOutcome {
            target,
            reason: EmptyReason::UnsupportedPlatform,
        });
    };

    match client.fetch_posts(&target, window, cancel).await {
        Ok(posts) => {
            let matches = match_posts(&target, &posts, keywords);
            if matches.is_empty() {
                Outcome::Empty(EmptyOutcome {
                    target,
                    reason: EmptyReason::NoMatches,
                })
            } else {
                Outcome::Matched(TargetMatches { target, matches })
            }
        }
        Err(e) => {
            tracing::warn!("Fetch failed for {}: {}", target.platform_id, e);
            Outcome::Empty(EmptyOutcome {
                target,
                reason: EmptyReason::FetchError,
            })
        }
    }
}
