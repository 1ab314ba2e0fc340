//! Restart tests for the SQLite-backed engine.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;

use leave_payroll_engine::config::EngineConfig;
use leave_payroll_engine::directory::{FixedClock, InMemoryAttendance, InMemoryDirectory};
use leave_payroll_engine::engine::HrEngine;
use leave_payroll_engine::leave::LeaveRequest;
use leave_payroll_engine::models::{
    Actor, AttendanceStatus, BalanceCategory, Employee, EmployeeCategory, EmployeeStatus,
    LeaveStatus, PayrollMonth, Role,
};
use leave_payroll_engine::store::Store;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn make_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn april() -> PayrollMonth {
    PayrollMonth::new(2026, 4).unwrap()
}

fn collaborators() -> (Arc<InMemoryDirectory>, Arc<InMemoryAttendance>) {
    let directory = InMemoryDirectory::with_employees(vec![Employee {
        id: "E001".to_string(),
        name: "Asha Rao".to_string(),
        category: EmployeeCategory::Staff,
        base_salary: dec("26000"),
        status: EmployeeStatus::Active,
        role: Role::Employee,
    }]);
    let attendance = InMemoryAttendance::new();
    for day in april().days().filter(|d| d.weekday() != Weekday::Sun) {
        attendance
            .record("E001", day, AttendanceStatus::Present, dec("8"))
            .unwrap();
    }
    (Arc::new(directory), Arc::new(attendance))
}

fn open_engine(database_url: &str) -> HrEngine {
    let (directory, attendance) = collaborators();
    HrEngine::with_store(
        EngineConfig::builtin(),
        Store::open(database_url).unwrap(),
        directory,
        attendance,
        Arc::new(FixedClock::at_date(make_date("2026-04-01"))),
    )
}

fn request(start: &str, end: &str) -> LeaveRequest {
    LeaveRequest {
        leave_type: "CL".to_string(),
        start_date: make_date(start),
        end_date: make_date(end),
        reason: "Family function".to_string(),
        is_half_day: false,
        half_day_session: None,
    }
}

fn casual_used(engine: &HrEngine) -> Decimal {
    engine
        .get_leave_balance("E001", Some(2026))
        .unwrap()
        .balances
        .iter()
        .find(|line| line.category == BalanceCategory::Casual)
        .map(|line| line.used)
        .unwrap()
}

#[test]
fn test_restart_keeps_leaves_balances_and_payroll() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("hr-engine.db").display());
    let actor = Actor::new("E001", Role::Employee);

    let (leaves, records) = {
        let engine = open_engine(&url);
        let approved = engine.submit_leave(&actor, &request("2026-04-06", "2026-04-07")).unwrap();
        engine.approve_leave(approved.id, "HR01").unwrap();
        let rejected = engine.submit_leave(&actor, &request("2026-04-20", "2026-04-20")).unwrap();
        engine.reject_leave(rejected.id, "HR01", None).unwrap();

        let run = engine.run_payroll(april(), None, "HR01").unwrap();
        assert_eq!(run.records.len(), 1);
        assert_eq!(casual_used(&engine), dec("2"));

        (engine.list_leaves("E001", None, None), engine.get_payroll(april(), None))
    };

    let engine = open_engine(&url);
    assert_eq!(engine.list_leaves("E001", None, None), leaves);
    assert_eq!(engine.get_payroll(april(), None), records);
    assert_eq!(engine.payslip_history("E001").len(), 1);
    assert_eq!(casual_used(&engine), dec("2"));

    let statuses: Vec<LeaveStatus> = leaves.iter().map(|a| a.status).collect();
    assert_eq!(statuses, vec![LeaveStatus::Rejected, LeaveStatus::Approved]);

    // New applications continue the id sequence
    let next = engine.submit_leave(&actor, &request("2026-04-27", "2026-04-27")).unwrap();
    assert_eq!(next.id, 3);
}

#[test]
fn test_rerun_after_restart_replaces_the_record() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("hr-engine.db").display());

    {
        let engine = open_engine(&url);
        engine.run_payroll(april(), None, "HR01").unwrap();
    }

    let engine = open_engine(&url);
    let run = engine.run_payroll(april(), None, "HR02").unwrap();
    assert_eq!(run.records.len(), 1);

    let stored = engine.get_payroll(april(), None);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].processed_by, "HR02");
}
