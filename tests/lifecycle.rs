use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rusqlite::Connection;

use titan::store::NewTask;
use titan::{Error, ManualClock, Manager, Priority, Status, TimerMode};

fn manager(mode: TimerMode) -> Manager<ManualClock> {
    let conn = Connection::open_in_memory().unwrap();
    let clock = ManualClock::new(Utc.ymd(2023, 11, 15).and_hms(9, 0, 0));
    Manager::with_clock(conn, mode, clock).unwrap()
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        assignee: "Alex".to_string(),
        company: "Titan".to_string(),
        category: "Sales".to_string(),
        priority: Priority::Medium,
        planned_date: NaiveDate::from_ymd(2023, 11, 15),
        estimated_hours: 2.0,
    }
}

fn assert_hours(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} hours, got {}",
        expected,
        actual
    );
}

#[test]
fn created_task_starts_cold() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("Fix Walmart CSV Error")).unwrap();

    let task = mgr.task(id).unwrap();
    assert_eq!(task.status, Status::ToDo);
    assert_hours(task.accumulated_hours, 0.0);
    assert_eq!(task.timer_start, None);
    assert_eq!(task.rating, None);
}

#[test]
fn start_then_pause_banks_one_hour() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("Q4 Strategy Report")).unwrap();

    mgr.start_timer(id).unwrap();
    let running = mgr.task(id).unwrap();
    assert_eq!(running.status, Status::InProgress);
    assert!(running.is_running());

    mgr.clock().advance(Duration::hours(1));
    mgr.pause_timer(id).unwrap();

    let task = mgr.task(id).unwrap();
    assert_hours(task.accumulated_hours, 1.0);
    assert_eq!(task.timer_start, None);
    assert_eq!(task.status, Status::InProgress);
}

#[test]
fn stop_banks_time_and_finishes() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("Prepare FBA Shipment #442")).unwrap();

    mgr.start_timer(id).unwrap();
    mgr.clock().advance(Duration::minutes(150));
    mgr.stop_timer(id).unwrap();

    let task = mgr.task(id).unwrap();
    assert_hours(task.accumulated_hours, 2.5);
    assert_eq!(task.status, Status::Done);
    assert_eq!(task.timer_start, None);
}

#[test]
fn pause_and_resume_accumulate_additively() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("TikTok Shop Integration")).unwrap();

    mgr.start_timer(id).unwrap();
    mgr.clock().advance(Duration::hours(1));
    mgr.pause_timer(id).unwrap();

    mgr.start_timer(id).unwrap();
    mgr.clock().advance(Duration::hours(2));
    mgr.stop_timer(id).unwrap();

    let task = mgr.task(id).unwrap();
    assert_hours(task.accumulated_hours, 3.0);
    assert_eq!(task.status, Status::Done);
}

#[test]
fn forty_five_minute_audit_scenario() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("Audit Inventory")).unwrap();

    mgr.start_timer(id).unwrap();
    mgr.clock().advance(Duration::minutes(45));
    mgr.stop_timer(id).unwrap();

    let task = mgr.task(id).unwrap();
    assert_eq!(task.status, Status::Done);
    assert_hours(task.accumulated_hours, 0.75);
    assert_eq!(task.timer_start, None);
}

#[test]
fn redundant_start_keeps_the_original_mark() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("Warehouse Inventory Audit")).unwrap();

    mgr.start_timer(id).unwrap();
    mgr.clock().advance(Duration::hours(1));
    // Second start while running must not overwrite the mark and lose the
    // hour already elapsed.
    mgr.start_timer(id).unwrap();
    mgr.clock().advance(Duration::hours(1));
    mgr.stop_timer(id).unwrap();

    assert_hours(mgr.task(id).unwrap().accumulated_hours, 2.0);
}

#[test]
fn pause_without_timer_is_invalid_and_mutates_nothing() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("Update Amazon Listings")).unwrap();

    let err = mgr.pause_timer(id).unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }));
    let err = mgr.stop_timer(id).unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }));

    let task = mgr.task(id).unwrap();
    assert_hours(task.accumulated_hours, 0.0);
    assert_eq!(task.status, Status::ToDo);
}

#[test]
fn timer_operations_on_missing_task_are_not_found() {
    let mut mgr = manager(TimerMode::ThreeState);
    assert!(matches!(mgr.start_timer(99), Err(Error::NotFound(99))));
    assert!(matches!(mgr.pause_timer(99), Err(Error::NotFound(99))));
    assert!(matches!(mgr.stop_timer(99), Err(Error::NotFound(99))));
    assert!(matches!(
        mgr.edit(99, Status::Done, "Mike", 1.0),
        Err(Error::NotFound(99))
    ));
}

#[test]
fn starting_a_done_task_is_invalid() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("done already")).unwrap();
    mgr.start_timer(id).unwrap();
    mgr.stop_timer(id).unwrap();

    assert!(matches!(
        mgr.start_timer(id),
        Err(Error::InvalidState { .. })
    ));
}

#[test]
fn backwards_clock_never_shrinks_the_total() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("clock skew")).unwrap();

    mgr.start_timer(id).unwrap();
    mgr.clock().advance(Duration::minutes(-5));
    mgr.stop_timer(id).unwrap();

    assert_hours(mgr.task(id).unwrap().accumulated_hours, 0.0);
}

#[test]
fn rating_requires_done() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("rate me")).unwrap();

    let err = mgr.rate(id, 5, Some("great")).unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }));

    mgr.start_timer(id).unwrap();
    mgr.stop_timer(id).unwrap();

    mgr.rate(id, 5, Some("great")).unwrap();
    let task = mgr.task(id).unwrap();
    assert_eq!(task.rating, Some(5));
    assert_eq!(task.feedback.as_deref(), Some("great"));

    // Overwrites, no history.
    mgr.rate(id, 3, None).unwrap();
    let task = mgr.task(id).unwrap();
    assert_eq!(task.rating, Some(3));
    assert_eq!(task.feedback, None);
}

#[test]
fn out_of_range_rating_is_rejected() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("rate me")).unwrap();
    mgr.start_timer(id).unwrap();
    mgr.stop_timer(id).unwrap();

    assert!(matches!(mgr.rate(id, 0, None), Err(Error::Validation(_))));
    assert!(matches!(mgr.rate(id, 6, None), Err(Error::Validation(_))));
    assert_eq!(mgr.task(id).unwrap().rating, None);
}

#[test]
fn edit_overwrites_wholesale_and_leaves_the_timer_mark() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("escape hatch")).unwrap();
    mgr.start_timer(id).unwrap();
    mgr.clock().advance(Duration::hours(1));

    mgr.edit(id, Status::Done, "Sarah", 7.5).unwrap();

    // The edit form never touched the timer mark, so a done task can be
    // left with a running timer. Preserved as observed.
    let task = mgr.task(id).unwrap();
    assert_eq!(task.status, Status::Done);
    assert_eq!(task.assignee, "Sarah");
    assert_hours(task.accumulated_hours, 7.5);
    assert!(task.timer_start.is_some());
}

#[test]
fn edit_rejects_negative_hours() {
    let mut mgr = manager(TimerMode::ThreeState);
    let id = mgr.create(&new_task("no negatives")).unwrap();
    assert!(matches!(
        mgr.edit(id, Status::ToDo, "Alex", -1.0),
        Err(Error::Validation(_))
    ));
}

#[test]
fn toggle_mode_starts_and_stops_with_one_command() {
    let mut mgr = manager(TimerMode::Toggle);
    let id = mgr.create(&new_task("legacy toggle")).unwrap();

    mgr.toggle_timer(id).unwrap();
    let task = mgr.task(id).unwrap();
    assert_eq!(task.status, Status::InProgress);
    assert!(task.is_running());

    mgr.clock().advance(Duration::minutes(90));
    mgr.toggle_timer(id).unwrap();

    let task = mgr.task(id).unwrap();
    assert_eq!(task.status, Status::Done);
    assert_hours(task.accumulated_hours, 1.5);
    assert_eq!(task.timer_start, None);
}

#[test]
fn modes_reject_each_others_commands() {
    let mut toggle = manager(TimerMode::Toggle);
    let id = toggle.create(&new_task("toggle only")).unwrap();
    assert!(matches!(
        toggle.start_timer(id),
        Err(Error::InvalidState { .. })
    ));
    assert!(matches!(
        toggle.pause_timer(id),
        Err(Error::InvalidState { .. })
    ));
    assert!(matches!(
        toggle.stop_timer(id),
        Err(Error::InvalidState { .. })
    ));

    let mut three = manager(TimerMode::ThreeState);
    let id = three.create(&new_task("three state only")).unwrap();
    assert!(matches!(
        three.toggle_timer(id),
        Err(Error::InvalidState { .. })
    ));
}

#[test]
fn state_survives_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.sqlite");
    let clock_start = Utc.ymd(2023, 11, 15).and_hms(9, 0, 0);

    let id = {
        let conn = Connection::open(&path).unwrap();
        let clock = ManualClock::new(clock_start);
        let mut mgr = Manager::with_clock(conn, TimerMode::ThreeState, clock).unwrap();
        let id = mgr.create(&new_task("persisted")).unwrap();
        mgr.start_timer(id).unwrap();
        mgr.clock().advance(Duration::hours(2));
        mgr.stop_timer(id).unwrap();
        id
    };

    let conn = Connection::open(&path).unwrap();
    let clock = ManualClock::new(clock_start);
    let mgr = Manager::with_clock(conn, TimerMode::ThreeState, clock).unwrap();
    let task = mgr.task(id).unwrap();
    assert_eq!(task.status, Status::Done);
    assert_hours(task.accumulated_hours, 2.0);
    assert_eq!(task.timer_start, None);
}
