pub mod booking;
pub mod conflict;
pub mod consistency;
pub mod slots;

pub use booking::BookingService;
pub use conflict::ConflictEvaluator;
pub use consistency::{SchedulingLockGuard, SchedulingLocks};
pub use slots::SlotEnumerator;
