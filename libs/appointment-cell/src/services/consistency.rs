// libs/appointment-cell/src/services/consistency.rs
//
// Per-(doctor, date) scheduling locks. Every check-then-write on a doctor's
// day runs while holding that day's lock, so two overlapping requests cannot
// both pass evaluation before either commits.
//

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::AppointmentError;

pub type LockKey = (Uuid, NaiveDate);

pub struct SchedulingLocks {
    slots: Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>,
    timeout: Duration,
}

/// Holds one doctor-day lock. Dropping it releases the lock and forgets the
/// entry if nobody else is waiting on it.
pub struct SchedulingLockGuard<'a> {
    key: LockKey,
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a SchedulingLocks,
}

impl Drop for SchedulingLockGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.forget_if_idle(&self.key);
        debug!("Scheduling lock released: {:?}", self.key);
    }
}

impl SchedulingLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    pub async fn acquire(&self, key: LockKey) -> Result<SchedulingLockGuard<'_>, AppointmentError> {
        let lock = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(slots.entry(key).or_default())
        };

        match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
            Ok(guard) => {
                debug!("Scheduling lock acquired: {:?}", key);
                Ok(SchedulingLockGuard {
                    key,
                    guard: Some(guard),
                    locks: self,
                })
            }
            Err(_) => {
                warn!("Timed out after {:?} waiting for scheduling lock {:?}", self.timeout, key);
                self.forget_if_idle(&key);
                Err(AppointmentError::LockTimeout)
            }
        }
    }

    /// Acquires several keys in ascending order. All callers share that order,
    /// which keeps multi-day operations such as rescheduling deadlock-free.
    pub async fn acquire_all(
        &self,
        keys: impl IntoIterator<Item = LockKey>,
    ) -> Result<Vec<SchedulingLockGuard<'_>>, AppointmentError> {
        let mut keys: Vec<LockKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            guards.push(self.acquire(key).await?);
        }
        Ok(guards)
    }

    /// Number of doctor-days with a live lock entry.
    pub fn tracked(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn forget_if_idle(&self, key: &LockKey) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if slots.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            slots.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(day: u32) -> LockKey {
        (
            Uuid::nil(),
            NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_entries_are_forgotten_after_release() {
        let locks = SchedulingLocks::new(Duration::from_millis(100));
        {
            let _guard = locks.acquire(key(2)).await.unwrap();
            assert_eq!(locks.tracked(), 1);
        }
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn test_second_holder_times_out() {
        let locks = SchedulingLocks::new(Duration::from_millis(50));
        let _held = locks.acquire(key(2)).await.unwrap();

        let second = locks.acquire(key(2)).await;
        assert!(matches!(second, Err(AppointmentError::LockTimeout)));
        assert_eq!(locks.tracked(), 1);
    }

    #[tokio::test]
    async fn test_different_days_do_not_block() {
        let locks = SchedulingLocks::new(Duration::from_millis(50));
        let _monday = locks.acquire(key(2)).await.unwrap();
        assert!(locks.acquire(key(3)).await.is_ok());
    }

    #[tokio::test]
    async fn test_acquire_all_dedups_keys() {
        let locks = SchedulingLocks::new(Duration::from_millis(50));
        let guards = locks.acquire_all([key(3), key(2), key(3)]).await.unwrap();
        assert_eq!(guards.len(), 2);
        assert_eq!(guards[0].key, key(2));
    }
}
