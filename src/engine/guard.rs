use super::dispatcher::{DispatchSource, Dispatcher};
use super::EngineError;
use crate::core::Move;
use log::{debug, error, warn};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Cancels the guard. Dropping it without calling `cancel` leaves the guard armed.
pub struct GuardCancel(oneshot::Sender<()>);

impl GuardCancel {
    pub fn cancel(self) {
        let _ = self.0.send(());
    }
}

/// 保険タイマー
///
/// Sends a random candidate once the budget runs out, unless cancelled
/// first.
pub struct DeadlineGuard {
    handle: JoinHandle<Option<Move>>,
}

impl DeadlineGuard {
    pub fn arm(
        dispatcher: Arc<Dispatcher>,
        candidates: Vec<Move>,
        budget: Duration,
    ) -> (DeadlineGuard, GuardCancel) {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            tokio::select! {
                // 送信側が drop された場合 (Err) はキャンセル扱いにしない
                Ok(()) = &mut cancel_rx => {
                    debug!("deadline guard cancelled");
                    None
                }
                _ = tokio::time::sleep(budget) => {
                    let budget_ms = budget.as_millis() as u64;
                    let err = EngineError::DeadlineExceeded { budget_ms };
                    warn!("{}; sending a random candidate", err);
                    let mv = {
                        let mut rng = rand::thread_rng();
                        candidates.choose(&mut rng).copied()
                    }?;
                    dispatcher.dispatch(mv, DispatchSource::Deadline).then_some(mv)
                }
            }
        });

        (DeadlineGuard { handle }, GuardCancel(cancel_tx))
    }

    /// Resolves when the guard was cancelled or has fired; `Some` only if it sent a move.
    pub async fn finished(&mut self) -> Option<Move> {
        match (&mut self.handle).await {
            Ok(sent) => sent,
            Err(e) => {
                error!("deadline guard task failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Direction, Position};
    use tokio::sync::mpsc;

    fn candidates() -> Vec<Move> {
        vec![
            Move::new(Position::new(0, 1), Direction::Right),
            Move::new(Position::new(0, 2), Direction::Right),
        ]
    }

    #[tokio::test]
    async fn fires_with_a_candidate_after_the_budget() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(Dispatcher::new(tx));
        let (mut guard, _cancel) =
            DeadlineGuard::arm(Arc::clone(&dispatcher), candidates(), Duration::from_millis(20));

        let sent = guard.finished().await.unwrap();
        assert!(candidates().contains(&sent));
        assert_eq!(rx.recv().await, Some(sent));
        assert_eq!(dispatcher.dispatched().unwrap().source, DispatchSource::Deadline);
    }

    #[tokio::test]
    async fn cancelled_guard_never_dispatches() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(Dispatcher::new(tx));
        let (mut guard, cancel) =
            DeadlineGuard::arm(Arc::clone(&dispatcher), candidates(), Duration::from_millis(50));

        cancel.cancel();
        assert_eq!(guard.finished().await, None);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(rx.try_recv().is_err());
        assert!(dispatcher.dispatched().is_none());
    }

    #[tokio::test]
    async fn dropped_cancel_handle_keeps_the_guard_armed() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(Dispatcher::new(tx));
        let (mut guard, cancel) =
            DeadlineGuard::arm(Arc::clone(&dispatcher), candidates(), Duration::from_millis(20));

        drop(cancel);
        let sent = guard.finished().await;
        assert!(sent.is_some());
        assert_eq!(rx.recv().await, sent);
    }

    #[tokio::test]
    async fn guard_loses_to_an_earlier_dispatch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(Dispatcher::new(tx));
        let early = Move::new(Position::new(9, 9), Direction::Left);
        dispatcher.dispatch(early, DispatchSource::Pipeline);

        let (mut guard, _cancel) =
            DeadlineGuard::arm(Arc::clone(&dispatcher), candidates(), Duration::from_millis(10));
        assert_eq!(guard.finished().await, None);
        assert_eq!(rx.recv().await, Some(early));
        assert!(rx.try_recv().is_err());
    }
}
