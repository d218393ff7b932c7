use crate::core::Move;
use log::{debug, warn};
use once_cell::sync::OnceCell;
use tokio::sync::mpsc::UnboundedSender;

/// Which side of the race sent the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchSource {
    Pipeline,
    Deadline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    pub mv: Move,
    pub source: DispatchSource,
}

/// 1リクエストにつき1回だけ手を送る
///
/// The first `dispatch` claims the cell and forwards the move; every later
/// call is a no-op returning `false`.
pub struct Dispatcher {
    sent: OnceCell<Dispatched>,
    outbound: UnboundedSender<Move>,
}

impl Dispatcher {
    pub fn new(outbound: UnboundedSender<Move>) -> Self {
        Dispatcher {
            sent: OnceCell::new(),
            outbound,
        }
    }

    pub fn dispatch(&self, mv: Move, source: DispatchSource) -> bool {
        if self.sent.set(Dispatched { mv, source }).is_err() {
            debug!("{:?} lost the race, {} not sent", source, mv);
            return false;
        }
        if let Err(e) = self.outbound.send(mv) {
            warn!("outbound channel closed, {} dropped: {}", mv, e);
        }
        true
    }

    pub fn dispatched(&self) -> Option<Dispatched> {
        self.sent.get().copied()
    }
}
