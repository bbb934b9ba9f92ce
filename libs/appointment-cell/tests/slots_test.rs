mod common;

use std::num::NonZeroU32;

use assert_matches::assert_matches;
use chrono::Duration;

use appointment_cell::models::SlotQueryError;
use appointment_cell::services::{ConflictEvaluator, SlotEnumerator};
use shared_utils::test_utils::{instant, time};
use shared_utils::time::format_hhmm;

use common::{booking, candidate, clinic, doctor, early_monday, monday, saturday, weekdays_only};

fn enumerator(minutes: u32) -> SlotEnumerator {
    SlotEnumerator::new(NonZeroU32::new(minutes).unwrap())
}

fn formatted(times: &[chrono::NaiveTime]) -> Vec<String> {
    times.iter().map(|t| format_hhmm(*t)).collect()
}

#[test]
fn test_morning_shift_lists_every_quarter_hour_that_fits() {
    let clinic = clinic();
    let morning = doctor("James", "Wilson", time(9, 0), time(12, 0), vec![clinic.checkup.clone()]);

    let times = enumerator(15)
        .enumerate_free_slots(&morning, monday(), &clinic.checkup, &[], early_monday())
        .unwrap();

    let expected: Vec<String> = (0..11)
        .map(|i| format_hhmm(time(9, 0) + Duration::minutes(15 * i)))
        .collect();
    assert_eq!(formatted(&times), expected);
    assert_eq!(expected.first().map(String::as_str), Some("09:00"));
    assert_eq!(expected.last().map(String::as_str), Some("11:30"));
}

#[test]
fn test_existing_bookings_remove_overlapping_starts() {
    let clinic = clinic();
    let morning = doctor("James", "Wilson", time(9, 0), time(12, 0), vec![clinic.checkup.clone()]);
    let existing = vec![booking(&morning, monday(), time(10, 0), &clinic.checkup)];

    let times = enumerator(15)
        .enumerate_free_slots(&morning, monday(), &clinic.checkup, &existing, early_monday())
        .unwrap();
    let times = formatted(&times);

    assert!(times.contains(&"09:30".to_string()));
    assert!(!times.contains(&"09:45".to_string()));
    assert!(!times.contains(&"10:00".to_string()));
    assert!(!times.contains(&"10:15".to_string()));
    assert!(times.contains(&"10:30".to_string()));
}

#[test]
fn test_past_date_is_refused() {
    let clinic = clinic();
    let yesterday = monday() - Duration::days(1);

    assert_matches!(
        enumerator(15).enumerate_free_slots(&clinic.house, yesterday, &clinic.checkup, &[], early_monday()),
        Err(SlotQueryError::PastDate)
    );
}

#[test]
fn test_unsupported_type_is_refused_before_past_date() {
    let clinic = clinic();
    let yesterday = monday() - Duration::days(1);

    assert_matches!(
        enumerator(15).enumerate_free_slots(&clinic.house, yesterday, &clinic.surgery, &[], early_monday()),
        Err(SlotQueryError::UnsupportedAppointmentType)
    );
}

#[test]
fn test_today_skips_starts_already_gone() {
    let clinic = clinic();
    let now = instant(monday(), 15, 50);

    let times = enumerator(15)
        .enumerate_free_slots(&clinic.house, monday(), &clinic.checkup, &[], now)
        .unwrap();

    assert_eq!(formatted(&times), vec!["16:00", "16:15", "16:30"]);
}

#[test]
fn test_non_working_day_has_no_slots() {
    let clinic = clinic();
    let house = weekdays_only(clinic.house.clone());

    let times = enumerator(15)
        .enumerate_free_slots(&house, saturday(), &clinic.checkup, &[], early_monday())
        .unwrap();

    assert!(times.is_empty());
}

#[test]
fn test_type_longer_than_the_day_has_no_slots() {
    let clinic = clinic();
    let short_day = doctor("Allison", "Cameron", time(9, 0), time(9, 45), vec![clinic.consultation.clone()]);

    let times = enumerator(15)
        .enumerate_free_slots(&short_day, monday(), &clinic.consultation, &[], early_monday())
        .unwrap();

    assert!(times.is_empty());
}

#[test]
fn test_late_shift_stops_before_midnight() {
    let clinic = clinic();
    let late = doctor("Lisa", "Cuddy", time(22, 0), time(23, 59), vec![clinic.checkup.clone()]);

    let times = enumerator(15)
        .enumerate_free_slots(&late, monday(), &clinic.checkup, &[], early_monday())
        .unwrap();

    assert_eq!(formatted(&times).last().map(String::as_str), Some("23:15"));
}

#[test]
fn test_coarser_granularity_yields_fewer_starts() {
    let clinic = clinic();

    let times = enumerator(60)
        .enumerate_free_slots(&clinic.house, monday(), &clinic.consultation, &[], early_monday())
        .unwrap();

    assert_eq!(times.len(), 8);
    assert_eq!(times[0], time(9, 0));
    assert_eq!(times[7], time(16, 0));
}

#[test]
fn test_every_listed_start_is_admitted_by_the_evaluator() {
    let clinic = clinic();
    let existing = vec![
        booking(&clinic.house, monday(), time(9, 30), &clinic.consultation),
        booking(&clinic.house, monday(), time(13, 15), &clinic.vaccination),
    ];
    let now = instant(monday(), 9, 5);
    let slots = enumerator(5);
    let evaluator = ConflictEvaluator::new();

    let listed = slots
        .enumerate_free_slots(&clinic.house, monday(), &clinic.checkup, &existing, now)
        .unwrap();

    let mut cursor = time(8, 0);
    while cursor <= time(17, 0) {
        let request = candidate(&clinic.house, monday(), cursor, &clinic.checkup);
        let admitted = evaluator.evaluate(&request, &clinic.house, &existing, now).is_ok();
        assert_eq!(admitted, listed.contains(&cursor), "disagreement at {}", cursor);
        cursor += Duration::minutes(5);
    }
}

#[test]
fn test_default_granularity_comes_from_config_default() {
    assert_eq!(
        SlotEnumerator::default().granularity_minutes(),
        i64::from(shared_config::DEFAULT_SLOT_GRANULARITY_MINUTES)
    );
}
