use chrono::{NaiveDate, NaiveDateTime};
use rollcall_core::db::open_db_in_memory;
use rollcall_core::model::record::{AttendanceRecord, RecordId};
use rollcall_core::{
    AttendanceError, AttendanceRepository, AttendanceService, Period, PeriodId, RecordListQuery,
    RecordOutcome, RepoError, RepoResult, ScheduleRepository, SqliteAttendanceRepository,
    SqliteScheduleRepository, SqliteStudentRepository, Student, StudentRepository, Weekday,
};
use rusqlite::Connection;

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

fn seed_roster_and_schedule(conn: &Connection) {
    SqliteStudentRepository::new(conn)
        .create_student(&Student::new("S1", "Alice", "CS"))
        .unwrap();
    SqliteScheduleRepository::new(conn)
        .create_period(&Period::from_times("Math", Weekday::Monday, "09:00", "10:00").unwrap())
        .unwrap();
}

fn sqlite_service(
    conn: &Connection,
) -> AttendanceService<
    SqliteStudentRepository<'_>,
    SqliteScheduleRepository<'_>,
    SqliteAttendanceRepository<'_>,
> {
    AttendanceService::new(
        SqliteStudentRepository::new(conn),
        SqliteScheduleRepository::new(conn),
        SqliteAttendanceRepository::new(conn),
    )
}

fn stored_row_count(conn: &Connection) -> u32 {
    conn.query_row("SELECT COUNT(*) FROM attendance_records;", [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn end_to_end_first_call_records_then_deduplicates() {
    let conn = open_db_in_memory().unwrap();
    seed_roster_and_schedule(&conn);
    let service = sqlite_service(&conn);

    let first = service.record_attendance("S1", monday(9, 15)).unwrap();
    match &first {
        RecordOutcome::Recorded(record) => {
            assert_eq!(record.usn, "S1");
            assert_eq!(record.period_subject, "Math");
            assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        }
        other => panic!("expected Recorded, got {other:?}"),
    }

    let second = service.record_attendance("S1", monday(9, 20)).unwrap();
    assert!(!second.is_new());
    assert_eq!(second.period_subject(), "Math");

    let after_period = service.record_attendance("S1", monday(10, 5)).unwrap_err();
    assert!(matches!(after_period, AttendanceError::NoActivePeriod { .. }));

    assert_eq!(stored_row_count(&conn), 1);
}

#[test]
fn repeated_polling_yields_one_recorded_and_rest_already_recorded() {
    let conn = open_db_in_memory().unwrap();
    seed_roster_and_schedule(&conn);
    let service = sqlite_service(&conn);

    let mut new_count = 0;
    for minute in 0..10 {
        let outcome = service.record_attendance("S1", monday(9, minute)).unwrap();
        if outcome.is_new() {
            new_count += 1;
        }
    }

    assert_eq!(new_count, 1);
    assert_eq!(stored_row_count(&conn), 1);
}

#[test]
fn unknown_student_fails_without_writing() {
    let conn = open_db_in_memory().unwrap();
    seed_roster_and_schedule(&conn);
    let service = sqlite_service(&conn);

    let err = service
        .record_attendance("NONEXISTENT_ID", monday(9, 15))
        .unwrap_err();
    match err {
        AttendanceError::UnknownStudent(usn) => assert_eq!(usn, "NONEXISTENT_ID"),
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(stored_row_count(&conn), 0);
}

#[test]
fn no_active_period_on_unscheduled_day() {
    let conn = open_db_in_memory().unwrap();
    seed_roster_and_schedule(&conn);
    let service = sqlite_service(&conn);

    let err = service.record_attendance("S1", tuesday(9, 15)).unwrap_err();
    match err {
        AttendanceError::NoActivePeriod { at } => {
            // Diagnostic message carries the attempted wall-clock time.
            assert_eq!(at, tuesday(9, 15));
            assert!(format!("{}", AttendanceError::NoActivePeriod { at })
                .contains("2024-01-02 09:15:00"));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(stored_row_count(&conn), 0);
}

#[test]
fn usn_lookup_is_normalized() {
    let conn = open_db_in_memory().unwrap();
    seed_roster_and_schedule(&conn);
    let service = sqlite_service(&conn);

    let outcome = service.record_attendance(" s1 ", monday(9, 15)).unwrap();
    assert!(outcome.is_new());
    assert_eq!(stored_row_count(&conn), 1);
}

// Probe repos for ordering and race-remap contracts.

struct PanickingScheduleRepo;

impl ScheduleRepository for PanickingScheduleRepo {
    fn create_period(&self, _period: &Period) -> RepoResult<PeriodId> {
        panic!("schedule must not be consulted");
    }
    fn list_periods(&self) -> RepoResult<Vec<Period>> {
        panic!("schedule must not be consulted");
    }
    fn list_periods_for_day(&self, _day: Weekday) -> RepoResult<Vec<Period>> {
        panic!("schedule must not be consulted");
    }
    fn delete_period(&self, _id: PeriodId) -> RepoResult<()> {
        panic!("schedule must not be consulted");
    }
}

struct EmptyRecordRepo;

impl AttendanceRepository for EmptyRecordRepo {
    fn find_record(
        &self,
        _usn: &str,
        _subject: &str,
        _date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>> {
        Ok(None)
    }
    fn insert_record(&self, record: &AttendanceRecord) -> RepoResult<RecordId> {
        Ok(record.id)
    }
    fn list_records(&self, _query: &RecordListQuery) -> RepoResult<Vec<AttendanceRecord>> {
        Ok(Vec::new())
    }
    fn count_present(&self, _subject: &str, _date: NaiveDate) -> RepoResult<u32> {
        Ok(0)
    }
}

#[test]
fn unknown_student_never_consults_the_schedule() {
    let conn = open_db_in_memory().unwrap();
    let service = AttendanceService::new(
        SqliteStudentRepository::new(&conn),
        PanickingScheduleRepo,
        EmptyRecordRepo,
    );

    let err = service
        .record_attendance("NONEXISTENT_ID", monday(9, 15))
        .unwrap_err();
    assert!(matches!(err, AttendanceError::UnknownStudent(_)));
}

struct ConflictOnInsertRepo;

impl AttendanceRepository for ConflictOnInsertRepo {
    fn find_record(
        &self,
        _usn: &str,
        _subject: &str,
        _date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>> {
        // Simulates the losing side of the race: the row did not exist at
        // lookup time but lands before our insert.
        Ok(None)
    }
    fn insert_record(&self, _record: &AttendanceRecord) -> RepoResult<RecordId> {
        Err(RepoError::Conflict)
    }
    fn list_records(&self, _query: &RecordListQuery) -> RepoResult<Vec<AttendanceRecord>> {
        Ok(Vec::new())
    }
    fn count_present(&self, _subject: &str, _date: NaiveDate) -> RepoResult<u32> {
        Ok(0)
    }
}

#[test]
fn lost_insert_race_is_remapped_to_already_recorded() {
    let conn = open_db_in_memory().unwrap();
    seed_roster_and_schedule(&conn);
    let service = AttendanceService::new(
        SqliteStudentRepository::new(&conn),
        SqliteScheduleRepository::new(&conn),
        ConflictOnInsertRepo,
    );

    let outcome = service.record_attendance("S1", monday(9, 15)).unwrap();
    match outcome {
        RecordOutcome::AlreadyRecorded {
            usn,
            period_subject,
            date,
        } => {
            assert_eq!(usn, "S1");
            assert_eq!(period_subject, "Math");
            assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        }
        other => panic!("expected AlreadyRecorded, got {other:?}"),
    }
}
