//! Key expiration.
//!
//! Expiry is lazy first: [`KeyValueStore`] drops an expired key the moment it
//! is touched. The sweeper spawned here additionally removes keys nobody
//! touches, so they do not linger in memory.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, trace};

use crate::key_value_store::KeyValueStore;

pub fn is_expired(expiration: Option<Instant>, now: Instant) -> bool {
    expiration.is_some_and(|deadline| now >= deadline)
}

pub fn deadline_after(ttl: Duration) -> Instant {
    Instant::now() + ttl
}

/// Periodically removes expired keys from `store`.
pub fn spawn_expiry_sweeper(store: Arc<Mutex<KeyValueStore>>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let removed = store.lock().await.remove_expired_keys();

            if removed > 0 {
                debug!(removed, "swept expired keys");
            } else {
                trace!("expiry sweep found nothing to remove");
            }
        }
    })
}
