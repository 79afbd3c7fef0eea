use chrono::{NaiveDate, NaiveDateTime};
use rollcall_core::db::open_db_in_memory;
use rollcall_core::{
    resolve_active_period, AddPeriodRequest, Period, RepoError, ScheduleRepository,
    ScheduleService, SqliteScheduleRepository, Weekday,
};

// 2024-01-01 is a Monday.
fn monday(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn tuesday(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn math_monday() -> Period {
    Period::from_times("Math", Weekday::Monday, "09:00", "10:00").unwrap()
}

#[test]
fn resolves_period_on_half_open_interval() {
    let periods = vec![math_monday()];

    let at_start = resolve_active_period(&periods, monday(9, 0)).unwrap();
    assert_eq!(at_start.subject, "Math");

    let before_end = resolve_active_period(&periods, monday(9, 59)).unwrap();
    assert_eq!(before_end.subject, "Math");

    // End boundary is exclusive.
    assert!(resolve_active_period(&periods, monday(10, 0)).is_none());
    assert!(resolve_active_period(&periods, monday(8, 59)).is_none());
}

#[test]
fn unscheduled_day_resolves_to_none() {
    let periods = vec![math_monday()];
    assert!(resolve_active_period(&periods, tuesday(9, 30)).is_none());
}

#[test]
fn identical_slots_on_different_days_never_both_match() {
    let periods = vec![
        math_monday(),
        Period::from_times("Physics", Weekday::Tuesday, "09:00", "10:00").unwrap(),
    ];

    assert_eq!(
        resolve_active_period(&periods, monday(9, 30)).unwrap().subject,
        "Math"
    );
    assert_eq!(
        resolve_active_period(&periods, tuesday(9, 30)).unwrap().subject,
        "Physics"
    );
}

#[test]
fn overlapping_input_returns_first_match_in_given_order() {
    // Overlaps cannot be written through the service, but an externally
    // written schedule may still contain them; first in order wins.
    let periods = vec![
        Period::from_times("Math", Weekday::Monday, "09:00", "10:00").unwrap(),
        Period::from_times("Physics", Weekday::Monday, "09:30", "10:30").unwrap(),
    ];

    assert_eq!(
        resolve_active_period(&periods, monday(9, 45)).unwrap().subject,
        "Math"
    );
}

#[test]
fn seconds_within_the_final_minute_still_match() {
    let periods = vec![math_monday()];
    let late = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(9, 59, 59)
        .unwrap();
    assert!(resolve_active_period(&periods, late).is_some());
}

#[test]
fn service_adds_lists_and_resolves_against_storage() {
    let conn = open_db_in_memory().unwrap();
    let service = ScheduleService::new(SqliteScheduleRepository::new(&conn));

    let created = service
        .add_period(&AddPeriodRequest {
            subject: "Math".to_string(),
            day: Weekday::Monday,
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
        })
        .unwrap();

    let listed = service.list_periods().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], created);

    let resolved = service.resolve_at(monday(9, 15)).unwrap().unwrap();
    assert_eq!(resolved.subject, "Math");
    assert!(service.resolve_at(monday(10, 5)).unwrap().is_none());
}

#[test]
fn service_rejects_overlapping_same_day_period() {
    let conn = open_db_in_memory().unwrap();
    let service = ScheduleService::new(SqliteScheduleRepository::new(&conn));

    service
        .add_period(&AddPeriodRequest {
            subject: "Math".to_string(),
            day: Weekday::Monday,
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
        })
        .unwrap();

    let err = service
        .add_period(&AddPeriodRequest {
            subject: "Physics".to_string(),
            day: Weekday::Monday,
            start_time: "09:30".to_string(),
            end_time: "10:30".to_string(),
        })
        .unwrap_err();

    match err {
        RepoError::ScheduleOverlap { subject, day } => {
            assert_eq!(subject, "Math");
            assert_eq!(day, Weekday::Monday);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Same slot on another day and an adjacent slot are both fine.
    service
        .add_period(&AddPeriodRequest {
            subject: "Physics".to_string(),
            day: Weekday::Tuesday,
            start_time: "09:30".to_string(),
            end_time: "10:30".to_string(),
        })
        .unwrap();
    service
        .add_period(&AddPeriodRequest {
            subject: "Chemistry".to_string(),
            day: Weekday::Monday,
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
        })
        .unwrap();
}

#[test]
fn service_removes_period_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteScheduleRepository::new(&conn);
    let service = ScheduleService::new(SqliteScheduleRepository::new(&conn));

    let created = service
        .add_period(&AddPeriodRequest {
            subject: "Math".to_string(),
            day: Weekday::Monday,
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
        })
        .unwrap();

    service.remove_period(created.id).unwrap();
    assert!(repo.list_periods().unwrap().is_empty());

    let err = service.remove_period(created.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}
