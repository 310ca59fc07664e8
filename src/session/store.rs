//! Timeline and cost state shared between the controller and its session.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::SessionPhase;
use crate::timeline::{Timeline, TimelineView};
use crate::types::CostTotals;

/// State owned by one controller.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Conversation {
    pub timeline: Timeline,
    pub costs: CostTotals,
}

/// Single owner of the [`Conversation`]; re-publishes the view after every
/// mutation.
///
/// The mutex is held only while a closure runs and never across `.await`.
#[derive(Debug)]
pub(crate) struct ConversationStore {
    inner: Mutex<Conversation>,
    view_tx: watch::Sender<TimelineView>,
    phase_tx: watch::Sender<SessionPhase>,
}

impl ConversationStore {
    pub(crate) fn new() -> Self {
        let (view_tx, _) = watch::channel(TimelineView::default());
        let (phase_tx, _) = watch::channel(SessionPhase::Idle);
        Self {
            inner: Mutex::new(Conversation::default()),
            view_tx,
            phase_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Conversation> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Conversation) -> R) -> R {
        f(&self.lock())
    }

    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut Conversation) -> R) -> R {
        let mut guard = self.lock();
        let out = f(&mut guard);
        self.publish(&guard);
        out
    }

    /// Apply `f` unless `cancel` has fired. The check happens under the same
    /// lock as the mutation, so nothing lands after a cancel's purge.
    pub(crate) fn mutate_live<R>(
        &self,
        cancel: &CancellationToken,
        f: impl FnOnce(&mut Conversation) -> R,
    ) -> Option<R> {
        let mut guard = self.lock();
        if cancel.is_cancelled() {
            return None;
        }
        let out = f(&mut guard);
        self.publish(&guard);
        Some(out)
    }

    pub(crate) fn phase(&self) -> SessionPhase {
        *self.phase_tx.borrow()
    }

    pub(crate) fn set_phase(&self, phase: SessionPhase) {
        self.phase_tx.send_replace(phase);
        let guard = self.lock();
        self.publish(&guard);
    }

    pub(crate) fn view(&self) -> TimelineView {
        self.view_tx.borrow().clone()
    }

    pub(crate) fn watch_view(&self) -> watch::Receiver<TimelineView> {
        self.view_tx.subscribe()
    }

    pub(crate) fn watch_phase(&self) -> watch::Receiver<SessionPhase> {
        self.phase_tx.subscribe()
    }

    fn publish(&self, conversation: &Conversation) {
        let view = TimelineView::project(
            &conversation.timeline,
            conversation.costs,
            self.phase().is_active(),
        );
        self.view_tx.send_replace(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn mutate_republishes_view() {
        let store = ConversationStore::new();
        let rx = store.watch_view();
        store.mutate(|c| c.timeline.push(Message::user("hi")));
        assert_eq!(rx.borrow().items.len(), 1);
        assert_eq!(store.view().items[0].content, "hi");
    }

    #[test]
    fn mutate_live_skips_after_cancel() {
        let store = ConversationStore::new();
        let cancel = CancellationToken::new();
        assert_eq!(store.mutate_live(&cancel, |_| 1), Some(1));
        cancel.cancel();
        let applied = store.mutate_live(&cancel, |c| c.timeline.push(Message::user("late")));
        assert!(applied.is_none());
        assert!(store.read(|c| c.timeline.is_empty()));
    }

    #[test]
    fn phase_change_updates_streaming_flag_in_view() {
        let store = ConversationStore::new();
        store.set_phase(SessionPhase::Streaming);
        assert!(store.view().is_streaming);
        store.set_phase(SessionPhase::Completed);
        assert!(!store.view().is_streaming);
    }
}
