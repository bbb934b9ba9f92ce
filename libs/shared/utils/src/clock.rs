use chrono::{Local, NaiveDateTime};

/// Source of the evaluation instant. Scheduling code never reads the system
/// time directly; handlers ask a `Clock` and pass the result down as `now`.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in the clinic's local timezone.
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
