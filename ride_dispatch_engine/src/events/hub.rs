use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
        Mutex,
        MutexGuard,
    },
};

use log::*;
use tokio::sync::Notify;

use super::ChairEvent;
use crate::db_types::ChairId;

#[derive(Default)]
struct ChairSlot {
    pending: Mutex<Option<ChairEvent>>,
    wakeup: Notify,
}

impl ChairSlot {
    fn pending(&self) -> MutexGuard<'_, Option<ChairEvent>> {
        // A poisoned slot only ever holds a complete event, so it is safe to keep using it
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Default)]
struct HubState {
    slots: Mutex<HashMap<ChairId, Arc<ChairSlot>>>,
    closed: AtomicBool,
}

/// Registry of single-slot, coalescing mailboxes, one per chair.
///
/// The hub is owned by the service that creates it and is cheap to clone. Publishing overwrites whatever event is
/// still pending for the chair. [`NotificationHub::shutdown`] wakes every waiting subscriber and ends their streams.
#[derive(Clone, Default)]
pub struct NotificationHub {
    state: Arc<HubState>,
}

impl Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NotificationHub (closed: {})", self.is_closed())
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, chair_id: ChairId) -> Arc<ChairSlot> {
        let mut slots = self.state.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.entry(chair_id).or_default().clone()
    }

    /// Puts `event` in the chair's slot, replacing any event the chair has not picked up yet.
    pub fn publish(&self, chair_id: ChairId, event: ChairEvent) {
        let slot = self.slot(chair_id);
        let replaced = slot.pending().replace(event);
        if let Some(old) = replaced {
            debug!("📬️ {chair_id} had not collected {} for {} yet. It has been superseded.", old.status, old.ride_id);
        }
        slot.wakeup.notify_one();
    }

    /// Takes the pending event for the chair without waiting. Consumers wait with [`Self::next_event`]; this is for
    /// inspecting a slot in tests.
    #[cfg(any(feature = "test_utils", test))]
    pub fn try_take(&self, chair_id: ChairId) -> Option<ChairEvent> {
        self.slot(chair_id).pending().take()
    }

    /// Waits for the next event for the chair. Returns `None` once the hub has been shut down.
    ///
    /// Cancel-safe: dropping the future leaves any pending event in the slot.
    pub async fn next_event(&self, chair_id: ChairId) -> Option<ChairEvent> {
        let slot = self.slot(chair_id);
        loop {
            let notified = slot.wakeup.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_closed() {
                return None;
            }
            if let Some(event) = slot.pending().take() {
                return Some(event);
            }
            notified.await;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        info!("📬️ Shutting down the notification hub");
        self.state.closed.store(true, Ordering::SeqCst);
        let slots = self.state.slots.lock().unwrap_or_else(|e| e.into_inner());
        for slot in slots.values() {
            slot.wakeup.notify_waiters();
        }
    }
}
