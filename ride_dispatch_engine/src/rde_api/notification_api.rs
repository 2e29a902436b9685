use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{ChairId, UserId},
    events::NotificationHub,
    rde_api::notification_objects::{ChairNotification, RiderNotification},
    traits::{NotificationError, NotificationManagement},
};

/// `NotificationApi` produces what chairs and riders see on their notification endpoints.
///
/// Chairs get a stream: a snapshot of their current ride, then one notification per event taken from their slot in
/// the hub. Riders poll, and every poll is answered straight from the store.
pub struct NotificationApi<B> {
    db: B,
    hub: NotificationHub,
    retry_after_ms: u64,
}

impl<B> Debug for NotificationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NotificationApi (retry after {}ms, {:?})", self.retry_after_ms, self.hub)
    }
}

impl<B> NotificationApi<B>
where B: NotificationManagement
{
    pub fn new(db: B, hub: NotificationHub, retry_after_ms: u64) -> Self {
        Self { db, hub, retry_after_ms }
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    pub fn retry_after_ms(&self) -> u64 {
        self.retry_after_ms
    }

    /// The first message of a chair's stream. Acknowledges everything the chair has been shown.
    pub async fn chair_snapshot(&self, chair_id: ChairId) -> Result<ChairNotification, NotificationError> {
        let notice = self.db.chair_snapshot(chair_id).await?;
        trace!("📬️ Snapshot for {chair_id}: {notice:?}");
        Ok(ChairNotification::new(notice.map(Into::into), self.retry_after_ms))
    }

    /// Waits for the next event in the chair's slot and records its delivery.
    ///
    /// Events that were already delivered (by the snapshot, or by a cumulative acknowledgement) are skipped. Returns
    /// `None` once the hub has been shut down. Dropping the future before it resolves leaves an untaken event in the
    /// slot.
    pub async fn next_chair_notification(
        &self,
        chair_id: ChairId,
    ) -> Result<Option<ChairNotification>, NotificationError> {
        loop {
            let Some(event) = self.hub.next_event(chair_id).await else {
                debug!("📬️ Hub closed. Ending the stream for {chair_id}");
                return Ok(None);
            };
            match self.db.deliver_chair_event(chair_id, &event).await? {
                Some(notice) => {
                    debug!("📬️ {} for {} delivered to {chair_id}", notice.status.status, notice.ride.id);
                    return Ok(Some(ChairNotification::new(Some(notice.into()), self.retry_after_ms)));
                },
                None => trace!("📬️ Skipping stale event {event:?} for {chair_id}"),
            }
        }
    }

    /// The rider's latest ride, as it stands in the store right now.
    pub async fn rider_notification(&self, user_id: UserId) -> Result<RiderNotification, NotificationError> {
        let notice = self.db.rider_snapshot(user_id).await?;
        Ok(RiderNotification::new(notice.map(Into::into), self.retry_after_ms))
    }
}
