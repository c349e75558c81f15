//! First-responder-wins race across lookup providers.
//!
//! A race starts one task per provider and waits for whichever comes first:
//! a value in a capacity-1 result channel, or the deadline. Losing tasks are
//! told to stop through a [`CancellationToken`] but are never awaited.

use std::sync::Arc;
use std::time::Duration;

use ceprace_types::{LookupKey, LookupResult, RaceOutcome};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::provider::{LookupProvider, attempt};

/// Rejected race inputs. A race that starts always ends in a [`RaceOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RaceError {
    #[error("a race needs at least one provider")]
    NoProviders,

    #[error("race timeout must be greater than zero")]
    ZeroTimeout,
}

/// Deadline and cancellation signal shared by every attempt in one race.
///
/// Cloning shares the same token; nothing here outlives the race that made it.
#[derive(Debug, Clone)]
pub struct RaceContext {
    deadline: Instant,
    token: CancellationToken,
}

impl RaceContext {
    pub fn new(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            token: CancellationToken::new(),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// True once the race has been settled or the deadline has passed.
    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Completes when the race is cancelled or the deadline passes.
    pub async fn done(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = sleep_until(self.deadline) => {}
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// Run one race of `providers` for `key`, bounded by `timeout`.
///
/// Returns as soon as the first provider publishes a result or the deadline
/// passes, whichever is observed first. When both are ready at the same
/// moment the deadline wins. Providers that fail never publish, so a race in
/// which every provider fails still ends in [`RaceOutcome::TimedOut`] at the
/// deadline.
///
/// Dropping the returned future cancels every attempt.
pub async fn race(
    key: &LookupKey,
    providers: &[Arc<dyn LookupProvider>],
    timeout: Duration,
) -> Result<RaceOutcome, RaceError> {
    if providers.is_empty() {
        return Err(RaceError::NoProviders);
    }
    if timeout.is_zero() {
        return Err(RaceError::ZeroTimeout);
    }

    let started = Instant::now();
    let context = RaceContext::new(timeout);
    let _cancel_on_drop = context.token.clone().drop_guard();

    // The slot exists before any attempt can try to write into it.
    let (sender, mut receiver) = mpsc::channel::<LookupResult>(1);

    debug!(
        %key,
        providers = providers.len(),
        timeout_ms = timeout.as_millis() as u64,
        "race started"
    );
    for provider in providers {
        tokio::spawn(attempt(context.clone(), key.clone(), Arc::clone(provider), sender.clone()));
    }
    // Only attempts hold senders now, so `recv` yields `None` once all of them gave up.
    drop(sender);

    let outcome = tokio::select! {
        biased;
        _ = sleep_until(context.deadline()) => RaceOutcome::TimedOut,
        Some(result) = receiver.recv() => RaceOutcome::Resolved(result),
    };
    context.cancel();

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &outcome {
        RaceOutcome::Resolved(result) => info!(%key, provider = %result.source(), elapsed_ms, "race resolved"),
        RaceOutcome::TimedOut => warn!(%key, elapsed_ms, "race timed out"),
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeProvider, sample_result};
    use ceprace_types::ProviderId;

    fn key() -> LookupKey {
        LookupKey::new("01153000").unwrap()
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[tokio::test]
    async fn rejects_empty_provider_list() {
        let err = race(&key(), &[], ms(100)).await.unwrap_err();
        assert_eq!(err, RaceError::NoProviders);
    }

    #[tokio::test]
    async fn rejects_zero_timeout() {
        let providers = vec![FakeProvider::succeeds("A", ms(0)).shared()];
        let err = race(&key(), &providers, Duration::ZERO).await.unwrap_err();
        assert_eq!(err, RaceError::ZeroTimeout);
    }

    #[tokio::test]
    async fn single_success_resolves() {
        let providers = vec![FakeProvider::succeeds("A", ms(10)).shared()];
        let outcome = race(&key(), &providers, ms(500)).await.unwrap();
        assert_eq!(outcome.result().map(|r| r.source().as_str()), Some("A"));
    }

    #[tokio::test]
    async fn faster_provider_wins_regardless_of_order() {
        let slow = FakeProvider::succeeds("B", ms(200)).shared();
        let fast = FakeProvider::succeeds("A", ms(100)).shared();

        let outcome = race(&key(), &[slow.clone(), fast.clone()], ms(1000)).await.unwrap();
        assert_eq!(outcome.result().unwrap().source(), &ProviderId::new("A"));

        let outcome = race(&key(), &[fast, slow], ms(1000)).await.unwrap();
        assert_eq!(outcome.result().unwrap().source(), &ProviderId::new("A"));
    }

    #[tokio::test]
    async fn failed_provider_never_wins_even_when_faster() {
        let providers = vec![
            FakeProvider::fails("broken", ms(5)).shared(),
            FakeProvider::succeeds("ok", ms(80)).shared(),
        ];
        let outcome = race(&key(), &providers, ms(1000)).await.unwrap();
        assert_eq!(outcome.result().unwrap().source().as_str(), "ok");
    }

    #[tokio::test]
    async fn all_failing_times_out_at_deadline() {
        let providers = vec![
            FakeProvider::fails("A", ms(5)).shared(),
            FakeProvider::fails("B", ms(10)).shared(),
        ];
        let started = Instant::now();
        let outcome = race(&key(), &providers, ms(200)).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(outcome, RaceOutcome::TimedOut);
        assert!(elapsed >= ms(200), "returned before the deadline: {elapsed:?}");
        assert!(elapsed < ms(400), "returned too long after the deadline: {elapsed:?}");
    }

    #[tokio::test]
    async fn late_success_is_discarded() {
        let late = FakeProvider::succeeds("late", ms(400));
        let probe = late.probe();
        let started = Instant::now();

        let outcome = race(&key(), &[late.shared()], ms(150)).await.unwrap();

        assert_eq!(outcome, RaceOutcome::TimedOut);
        assert!(started.elapsed() < ms(350));
        // The attempt is dropped on cancellation, so its lookup never completes.
        tokio::time::sleep(ms(350)).await;
        assert!(probe.started());
        assert!(!probe.finished());
    }

    #[tokio::test]
    async fn losers_are_cancelled_once_a_winner_publishes() {
        let winner = FakeProvider::succeeds("A", ms(20));
        let loser = FakeProvider::succeeds("B", ms(300));
        let loser_probe = loser.probe();

        let outcome = race(&key(), &[winner.shared(), loser.shared()], ms(1000)).await.unwrap();
        assert!(outcome.is_resolved());

        tokio::time::sleep(ms(400)).await;
        assert!(loser_probe.started());
        assert!(!loser_probe.finished());
    }

    #[tokio::test]
    async fn simultaneous_successes_yield_exactly_one_result() {
        let providers: Vec<_> = (0..8)
            .map(|index| FakeProvider::succeeds(format!("P{index}"), ms(30)).shared())
            .collect();
        let outcome = race(&key(), &providers, ms(1000)).await.unwrap();
        let winner = outcome.result().unwrap().source().as_str().to_string();
        assert!(winner.starts_with('P'));
    }

    #[tokio::test]
    async fn repeated_races_are_independent() {
        let providers = vec![
            FakeProvider::succeeds("A", ms(20)).shared(),
            FakeProvider::fails("B", ms(5)).shared(),
        ];
        let first = race(&key(), &providers, ms(500)).await.unwrap();
        let second = race(&key(), &providers, ms(500)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, RaceOutcome::Resolved(sample_result("A")));
    }

    #[tokio::test]
    async fn scenario_fast_brasilapi_beats_slow_viacep() {
        let brasil = FakeProvider::succeeds(ProviderId::BRASIL_API, ms(50)).shared();
        let via = FakeProvider::succeeds(ProviderId::VIA_CEP, ms(300)).shared();

        let outcome = race(&key(), &[via, brasil], ms(1000)).await.unwrap();
        let result = outcome.result().unwrap();
        assert_eq!(result.source(), &ProviderId::BRASIL_API);
        assert_eq!(result.street(), "Rua X");
    }

    #[tokio::test]
    async fn scenario_both_slower_than_deadline_times_out() {
        let brasil = FakeProvider::succeeds(ProviderId::BRASIL_API, ms(1200)).shared();
        let via = FakeProvider::succeeds(ProviderId::VIA_CEP, ms(1500)).shared();

        let outcome = race(&key(), &[brasil, via], ms(1000)).await.unwrap();
        assert_eq!(outcome, RaceOutcome::TimedOut);
        assert!(outcome.result().is_none());
    }

    #[tokio::test]
    async fn context_reports_done_after_cancel() {
        let context = RaceContext::new(ms(10_000));
        assert!(!context.is_done());
        context.cancel();
        assert!(context.is_done());
        context.done().await;
    }

    #[tokio::test]
    async fn context_reports_done_after_deadline() {
        let context = RaceContext::new(ms(20));
        context.done().await;
        assert!(context.is_done());
    }
}
