//! End-to-end leave workflow tests against the engine facade.

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use leave_payroll_engine::config::EngineConfig;
use leave_payroll_engine::directory::{FixedClock, InMemoryAttendance, InMemoryDirectory};
use leave_payroll_engine::engine::HrEngine;
use leave_payroll_engine::error::EngineError;
use leave_payroll_engine::leave::LeaveRequest;
use leave_payroll_engine::models::{
    Actor, BalanceCategory, Employee, EmployeeCategory, EmployeeStatus, HalfDaySession,
    LeaveStatus, PayrollMonth, Role,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn make_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn employee(id: &str, category: EmployeeCategory, role: Role) -> Employee {
    Employee {
        id: id.to_string(),
        name: format!("Employee {}", id),
        category,
        base_salary: dec("30000"),
        status: EmployeeStatus::Active,
        role,
    }
}

fn create_engine() -> HrEngine {
    let directory = InMemoryDirectory::with_employees(vec![
        employee("E001", EmployeeCategory::Staff, Role::Employee),
        employee("W001", EmployeeCategory::Worker, Role::Employee),
        employee("M001", EmployeeCategory::Management, Role::Employee),
        employee("T001", EmployeeCategory::Trainee, Role::Employee),
        employee("A001", EmployeeCategory::Staff, Role::Admin),
    ]);
    HrEngine::new(
        EngineConfig::builtin(),
        Arc::new(directory),
        Arc::new(InMemoryAttendance::new()),
        Arc::new(FixedClock::at_date(make_date("2026-04-01"))),
    )
}

fn request(leave_type: &str, start: &str, end: &str) -> LeaveRequest {
    LeaveRequest {
        leave_type: leave_type.to_string(),
        start_date: make_date(start),
        end_date: make_date(end),
        reason: "Personal work".to_string(),
        is_half_day: false,
        half_day_session: None,
    }
}

fn as_employee(id: &str) -> Actor {
    Actor::new(id, Role::Employee)
}

fn used(engine: &HrEngine, employee_id: &str, category: BalanceCategory) -> Decimal {
    engine
        .get_leave_balance(employee_id, Some(2026))
        .unwrap()
        .balances
        .iter()
        .find(|line| line.category == category)
        .map(|line| line.used)
        .unwrap()
}

// =============================================================================
// Workflow
// =============================================================================

#[test]
fn test_used_matches_approved_days() {
    let engine = create_engine();
    let actor = as_employee("E001");

    let first = engine
        .submit_leave(&actor, &request("CL", "2026-04-06", "2026-04-07"))
        .unwrap();
    let second = engine
        .submit_leave(&actor, &request("CL", "2026-05-11", "2026-05-13"))
        .unwrap();
    let third = engine
        .submit_leave(&actor, &request("CL", "2026-06-01", "2026-06-01"))
        .unwrap();

    engine.approve_leave(first.id, "HR01").unwrap();
    engine.approve_leave(second.id, "HR01").unwrap();
    engine.reject_leave(third.id, "HR01", Some("Peak season")).unwrap();

    assert_eq!(used(&engine, "E001", BalanceCategory::Casual), dec("5"));
    assert_eq!(used(&engine, "E001", BalanceCategory::Sick), Decimal::ZERO);
}

#[test]
fn test_cap_rejection_leaves_state_unchanged() {
    let engine = create_engine();
    let actor = as_employee("E001");
    engine
        .submit_leave(&actor, &request("CL", "2026-04-06", "2026-04-15"))
        .unwrap();
    let before = engine.list_leaves("E001", Some(2026), None);

    let result = engine.submit_leave(&actor, &request("CL", "2026-04-20", "2026-04-22"));

    match result {
        Err(EngineError::MonthlyCapExceeded {
            max_per_month,
            already_used,
            requested,
            ..
        }) => {
            assert_eq!(max_per_month, dec("12"));
            assert_eq!(already_used, dec("10"));
            assert_eq!(requested, dec("3"));
        }
        other => panic!("expected MonthlyCapExceeded, got {:?}", other),
    }
    assert_eq!(engine.list_leaves("E001", Some(2026), None), before);
    assert_eq!(used(&engine, "E001", BalanceCategory::Casual), Decimal::ZERO);
}

#[test]
fn test_two_half_days_total_one_day() {
    let engine = create_engine();
    let actor = as_employee("E001");

    for (date, session) in [
        ("2026-04-06", HalfDaySession::FirstHalf),
        ("2026-04-07", HalfDaySession::SecondHalf),
    ] {
        let mut half_day = request("CL", date, date);
        half_day.is_half_day = true;
        half_day.half_day_session = Some(session);
        engine.submit_leave(&actor, &half_day).unwrap();
    }

    let total: Decimal = engine
        .list_leaves("E001", Some(2026), None)
        .iter()
        .map(|a| a.days_requested)
        .sum();
    assert_eq!(total, dec("1.0"));
}

#[test]
fn test_cancel_only_from_pending() {
    let engine = create_engine();
    let actor = as_employee("E001");
    let pending = engine
        .submit_leave(&actor, &request("SL", "2026-04-06", "2026-04-06"))
        .unwrap();
    let approved = engine
        .submit_leave(&actor, &request("SL", "2026-04-08", "2026-04-08"))
        .unwrap();
    engine.approve_leave(approved.id, "HR01").unwrap();

    let cancelled = engine.cancel_leave(pending.id, "E001").unwrap();
    assert_eq!(cancelled.status, LeaveStatus::Cancelled);

    let result = engine.cancel_leave(approved.id, "E001");
    assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    assert_eq!(used(&engine, "E001", BalanceCategory::Sick), dec("1"));
}

#[test]
fn test_ineligible_categories_always_not_eligible() {
    let engine = create_engine();
    for employee_id in ["M001", "T001"] {
        for leave_type in ["CL", "SL", "EL", "Half-Day", "LOP"] {
            let mut blank_reason = request(leave_type, "2026-04-06", "2026-04-06");
            blank_reason.reason = "  ".to_string();
            let mut past_half_day = request(leave_type, "2026-03-02", "2026-03-04");
            past_half_day.is_half_day = true;

            for leave in [
                request(leave_type, "2026-04-06", "2026-04-06"),
                request(leave_type, "2026-04-10", "2026-04-06"),
                blank_reason,
                past_half_day,
            ] {
                let result = engine.submit_leave(&as_employee(employee_id), &leave);
                assert!(
                    matches!(result, Err(EngineError::NotEligible { .. })),
                    "{} {} {}..{} gave {:?}",
                    employee_id,
                    leave_type,
                    leave.start_date,
                    leave.end_date,
                    result
                );
            }
        }
    }
    assert!(engine.list_all_leaves(None).is_empty());
}

#[test]
fn test_admin_may_backdate() {
    let engine = create_engine();

    let result = engine.submit_leave(
        &Actor::new("A001", Role::Admin),
        &request("CL", "2026-03-30", "2026-03-30"),
    );
    assert!(result.is_ok());

    let result = engine.submit_leave(&as_employee("E001"), &request("CL", "2026-03-30", "2026-03-30"));
    assert!(matches!(result, Err(EngineError::BackdatedNotAllowed { .. })));
}

#[test]
fn test_worker_balance_is_smaller() {
    let engine = create_engine();
    let result = engine.submit_leave(&as_employee("W001"), &request("CL", "2026-04-06", "2026-04-12"));

    match result {
        Err(EngineError::InsufficientBalance {
            available,
            requested,
            ..
        }) => {
            assert_eq!(available, dec("6"));
            assert_eq!(requested, dec("7"));
        }
        other => panic!("expected InsufficientBalance, got {:?}", other),
    }
}

#[test]
fn test_concurrent_over_approval_fails_one() {
    let engine = create_engine();
    let actor = as_employee("E001");

    // Each fits the balance alone; together they exceed it
    let first = engine
        .submit_leave(&actor, &request("CL", "2026-04-06", "2026-04-12"))
        .unwrap();
    let second = engine
        .submit_leave(&actor, &request("CL", "2026-05-04", "2026-05-10"))
        .unwrap();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = [first.id, second.id]
            .into_iter()
            .map(|id| {
                let engine = &engine;
                scope.spawn(move || engine.approve_leave(id, "HR01"))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let approved = results.iter().filter(|r| r.is_ok()).count();
    let corrupted = results
        .iter()
        .filter(|r| matches!(r, Err(EngineError::BalanceCorruption { .. })))
        .count();
    assert_eq!(approved, 1);
    assert_eq!(corrupted, 1);

    assert_eq!(used(&engine, "E001", BalanceCategory::Casual), dec("7"));
    assert_eq!(engine.list_all_leaves(None).len(), 1);
}

#[test]
fn test_payroll_reflects_approved_unpaid_leave() {
    let engine = create_engine();
    let actor = as_employee("E001");
    let unpaid = engine
        .submit_leave(&actor, &request("LOP", "2026-04-06", "2026-04-06"))
        .unwrap();
    engine.approve_leave(unpaid.id, "HR01").unwrap();

    let month = PayrollMonth::new(2026, 4).unwrap();
    let run = engine.run_payroll(month, Some("E001"), "HR01").unwrap();
    let record = &run.records[0];

    assert_eq!(record.days.unpaid_leave_days, dec("1"));
    assert_eq!(record.deduction_breakdown.unpaid_leave, dec("1153.85"));
    assert_eq!(record.days.absent_days, dec("25"));

    let again = engine.run_payroll(month, Some("E001"), "HR01").unwrap();
    assert_eq!(run, again);
    assert_eq!(engine.get_payroll(month, None).len(), 1);
}
