use super::common::*;
use crate::projects::admission::evaluate;
use crate::projects::{AdmissionState, PolicyConfig, ScheduleWindow};

fn window() -> ScheduleWindow {
    ScheduleWindow {
        application_start: Some(at(2024, 3, 1, 9)),
        application_end: Some(at(2024, 4, 10, 18)),
        ..ScheduleWindow::default()
    }
}

fn limited(max: i64) -> PolicyConfig {
    PolicyConfig {
        max_participants: Some(max),
        allow_duplicate: None,
    }
}

#[test]
fn disabled_form_is_closed_regardless_of_window_and_capacity() {
    assert_eq!(
        evaluate(now(), &window(), &limited(50), 0, false),
        AdmissionState::Closed
    );
    assert_eq!(
        evaluate(at(2023, 1, 1, 0), &window(), &limited(1), 10, false),
        AdmissionState::Closed
    );
}

#[test]
fn window_bounds_are_checked_before_capacity() {
    assert_eq!(
        evaluate(at(2024, 2, 28, 9), &window(), &limited(1), 5, true),
        AdmissionState::NotStarted
    );
    assert_eq!(
        evaluate(at(2024, 4, 11, 0), &window(), &limited(1), 5, true),
        AdmissionState::Ended
    );
}

#[test]
fn window_bounds_are_inclusive() {
    let schedule = window();
    let start = schedule.application_start.expect("start");
    let end = schedule.application_end.expect("end");

    assert_eq!(
        evaluate(start, &schedule, &PolicyConfig::default(), 0, true),
        AdmissionState::Open
    );
    assert_eq!(
        evaluate(end, &schedule, &PolicyConfig::default(), 0, true),
        AdmissionState::Open
    );
}

#[test]
fn capacity_is_full_at_the_limit() {
    assert_eq!(
        evaluate(now(), &window(), &limited(50), 50, true),
        AdmissionState::Full
    );
    assert_eq!(
        evaluate(now(), &window(), &limited(50), 49, true),
        AdmissionState::Open
    );
}

#[test]
fn non_positive_limits_are_unlimited() {
    for max in [0, -1] {
        assert_eq!(
            evaluate(now(), &window(), &limited(max), 10_000, true),
            AdmissionState::Open
        );
    }
}

#[test]
fn open_ended_schedule_is_open() {
    assert_eq!(
        evaluate(
            now(),
            &ScheduleWindow::default(),
            &PolicyConfig::default(),
            0,
            true
        ),
        AdmissionState::Open
    );
}

#[test]
fn every_closed_state_explains_itself() {
    for state in [
        AdmissionState::Closed,
        AdmissionState::NotStarted,
        AdmissionState::Ended,
        AdmissionState::Full,
    ] {
        assert!(!state.is_open());
        assert!(!state.message().is_empty());
        assert_ne!(state.message(), AdmissionState::Open.message());
    }
}
