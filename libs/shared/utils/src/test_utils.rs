use std::sync::Mutex;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::json;
use uuid::Uuid;

use shared_config::SchedulingConfig;

use crate::clock::Clock;

pub struct TestConfig {
    pub slot_granularity_minutes: u32,
    pub booking_lock_timeout_ms: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            slot_granularity_minutes: 15,
            booking_lock_timeout_ms: 2_000,
        }
    }
}

impl TestConfig {
    pub fn to_scheduling_config(&self) -> SchedulingConfig {
        SchedulingConfig {
            slot_granularity_minutes: self.slot_granularity_minutes,
            booking_lock_timeout_ms: self.booking_lock_timeout_ms,
            ..SchedulingConfig::default()
        }
    }
}

/// Clock pinned to a chosen instant; tests can move it forward explicitly.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid test time")
}

pub fn instant(day: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    day.and_time(time(h, m))
}

pub struct MockClinicData;

impl MockClinicData {
    pub fn appointment_type_json(id: Uuid, name: &str, duration_minutes: u32) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "duration_minutes": duration_minutes
        })
    }

    pub fn doctor_json(
        id: Uuid,
        first_name: &str,
        last_name: &str,
        daily_start: &str,
        daily_end: &str,
        offered_types: Vec<serde_json::Value>,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "first_name": first_name,
            "last_name": last_name,
            "specialty": "General Practice",
            "availability": {
                "daily_start": daily_start,
                "daily_end": daily_end,
                "working_days": []
            },
            "offered_types": offered_types
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default().to_scheduling_config();
        assert_eq!(config.slot_granularity_minutes, 15);
        assert_eq!(config.booking_lock_timeout_ms, 2_000);
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::at(instant(date(2026, 3, 2), 8, 0));
        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), instant(date(2026, 3, 2), 9, 30));
    }
}
