//! Fan-out/gather for buckets running many independent, time-bounded checks

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Verdict of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub success: bool,
    pub detail: Option<String>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            success: true,
            detail: None,
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: Some(detail.into()),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Labelled verdict as returned by [`gather`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub label: String,
    pub success: bool,
    pub detail: Option<String>,
}

/// What a check that overran its budget counts as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Unconfirmed counts as success
    Pass,
    /// Unconfirmed counts as failure
    Fail,
}

impl TimeoutPolicy {
    fn verdict(self) -> Verdict {
        match self {
            TimeoutPolicy::Pass => Verdict::pass().with_detail("timed out"),
            TimeoutPolicy::Fail => Verdict::fail("timed out"),
        }
    }
}

/// Run `check` for every item concurrently, each raced against `budget`.
///
/// All checks are spawned before any is awaited. Exactly one outcome per
/// item is returned, in input order. Checks that overrun are abandoned and
/// resolved with `policy`.
pub async fn gather<T, F, Fut>(items: Vec<(String, T)>, budget: Duration, policy: TimeoutPolicy, check: F) -> Vec<Outcome>
where
    T: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Verdict> + Send + 'static,
{
    fan_out(items, Some((budget, policy)), check).await
}

/// Like [`gather`] without a budget: every check runs to completion before
/// this returns, so nothing it started is left running afterwards.
pub async fn gather_all<T, F, Fut>(items: Vec<(String, T)>, check: F) -> Vec<Outcome>
where
    T: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Verdict> + Send + 'static,
{
    fan_out(items, None, check).await
}

async fn fan_out<T, F, Fut>(items: Vec<(String, T)>, budget: Option<(Duration, TimeoutPolicy)>, check: F) -> Vec<Outcome>
where
    T: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Verdict> + Send + 'static,
{
    let total = items.len();
    let (tx, mut rx) = mpsc::channel::<(usize, String, Verdict)>(total.max(1));

    for (index, (label, item)) in items.into_iter().enumerate() {
        let fut = check(item);
        let tx = tx.clone();
        tokio::spawn(async move {
            let handle = tokio::spawn(fut);
            let joined = match budget {
                Some((budget, policy)) => match tokio::time::timeout(budget, handle).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        debug!(check = %label, "check overran its budget");
                        let _ = tx.send((index, label, policy.verdict())).await;
                        return;
                    }
                },
                None => handle.await,
            };
            let verdict = joined.unwrap_or_else(|e| Verdict::fail(format!("check aborted: {e}")));
            let _ = tx.send((index, label, verdict)).await;
        });
    }
    drop(tx);

    let mut slots: Vec<Option<Outcome>> = vec![None; total];
    let mut received = 0;
    while received < total {
        let Some((index, label, verdict)) = rx.recv().await else {
            break;
        };
        slots[index] = Some(Outcome {
            label,
            success: verdict.success,
            detail: verdict.detail,
        });
        received += 1;
    }

    slots.into_iter().flatten().collect()
}
