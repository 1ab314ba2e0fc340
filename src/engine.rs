//! The engine facade.
//!
//! [`HrEngine`] owns the configuration and the store, reads employees,
//! attendance and time through its collaborators, and runs every operation
//! inside one store transaction.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::directory::{AttendanceLedger, Clock, EmployeeDirectory};
use crate::error::{EngineError, EngineResult};
use crate::leave::{self, LeaveReport, LeaveRequest, ledger};
use crate::models::{
    Actor, BalanceView, Employee, LeaveApplication, LeaveStatus, LeaveTypeCode, PayrollMonth,
    PayrollRecord, PayrollRun, PayrollSummary,
};
use crate::payroll::{self, PayrollRunner};
use crate::store::Store;

/// The leave and payroll engine.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use leave_payroll_engine::config::EngineConfig;
/// use leave_payroll_engine::directory::{FixedClock, InMemoryAttendance, InMemoryDirectory};
/// use leave_payroll_engine::engine::HrEngine;
/// use leave_payroll_engine::models::{Employee, EmployeeCategory, EmployeeStatus, Role};
///
/// let directory = InMemoryDirectory::with_employees(vec![Employee {
///     id: "E001".to_string(),
///     name: "Asha Rao".to_string(),
///     category: EmployeeCategory::Staff,
///     base_salary: Decimal::from(30000),
///     status: EmployeeStatus::Active,
///     role: Role::Employee,
/// }]);
/// let engine = HrEngine::new(
///     EngineConfig::builtin(),
///     Arc::new(directory),
///     Arc::new(InMemoryAttendance::new()),
///     Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap())),
/// );
///
/// let balance = engine.get_leave_balance("E001", None).unwrap();
/// assert!(balance.eligible);
/// assert_eq!(balance.year, 2026);
/// ```
pub struct HrEngine {
    config: EngineConfig,
    store: Store,
    directory: Arc<dyn EmployeeDirectory>,
    attendance: Arc<dyn AttendanceLedger>,
    clock: Arc<dyn Clock>,
}

impl HrEngine {
    /// Creates an engine with an empty in-memory store.
    pub fn new(
        config: EngineConfig,
        directory: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_store(config, Store::new(), directory, attendance, clock)
    }

    /// Creates an engine over an existing store, such as one from
    /// [`Store::open`].
    pub fn with_store(
        config: EngineConfig,
        store: Store,
        directory: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            directory,
            attendance,
            clock,
        }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.directory
            .employee(employee_id)
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })
    }

    fn payroll_runner(&self) -> PayrollRunner<'_> {
        PayrollRunner::new(
            &self.store,
            &self.config,
            self.directory.as_ref(),
            self.attendance.as_ref(),
        )
    }

    /// Submits a leave request on behalf of `actor`.
    pub fn submit_leave(
        &self,
        actor: &Actor,
        request: &LeaveRequest,
    ) -> EngineResult<LeaveApplication> {
        let employee = self.employee(&actor.employee_id)?;
        let now = self.clock.now();

        let result = self
            .store
            .transaction(|tx| leave::submit(tx, &self.config, &employee, actor, request, now));

        match &result {
            Ok(application) => info!(
                application_id = application.id,
                employee_id = %application.employee_id,
                leave_type = %application.leave_type,
                start_date = %application.start_date,
                end_date = %application.end_date,
                days_requested = %application.days_requested,
                "Leave application submitted"
            ),
            Err(e) => warn!(
                employee_id = %employee.id,
                leave_type = %request.leave_type,
                error = %e,
                "Leave application rejected"
            ),
        }
        result
    }

    /// Cancels a pending application owned by `requester_id`.
    pub fn cancel_leave(
        &self,
        application_id: u64,
        requester_id: &str,
    ) -> EngineResult<LeaveApplication> {
        let result = self
            .store
            .transaction(|tx| leave::cancel(tx, application_id, requester_id));
        log_transition(&result, application_id, requester_id, "Leave application cancelled");
        result
    }

    /// Approves a pending application and debits the balance ledger.
    pub fn approve_leave(
        &self,
        application_id: u64,
        approver_id: &str,
    ) -> EngineResult<LeaveApplication> {
        let now = self.clock.now();
        let result = self.store.transaction(|tx| {
            leave::approve(
                tx,
                &self.config,
                self.directory.as_ref(),
                application_id,
                approver_id,
                now,
            )
        });
        log_transition(&result, application_id, approver_id, "Leave application approved");
        result
    }

    /// Rejects a pending application.
    pub fn reject_leave(
        &self,
        application_id: u64,
        approver_id: &str,
        reason: Option<&str>,
    ) -> EngineResult<LeaveApplication> {
        let now = self.clock.now();
        let result = self
            .store
            .transaction(|tx| leave::reject(tx, application_id, approver_id, reason, now));
        log_transition(&result, application_id, approver_id, "Leave application rejected");
        result
    }

    /// Lists one employee's applications starting in `year` (default: the
    /// current year), newest submission first.
    pub fn list_leaves(
        &self,
        employee_id: &str,
        year: Option<i32>,
        status: Option<LeaveStatus>,
    ) -> Vec<LeaveApplication> {
        let year = year.unwrap_or_else(|| self.clock.today().year());
        self.store
            .read(|tables| leave::employee_leaves(tables, employee_id, year, status))
    }

    /// Lists every employee's applications in one state (default: pending).
    pub fn list_all_leaves(&self, status: Option<LeaveStatus>) -> Vec<LeaveApplication> {
        let status = status.unwrap_or(LeaveStatus::Pending);
        self.store
            .read(|tables| leave::leaves_by_status(tables, status))
    }

    /// Returns the balance view for `year` (default: the current year).
    ///
    /// The balance row of an eligible employee is initialized on first
    /// access.
    pub fn get_leave_balance(
        &self,
        employee_id: &str,
        year: Option<i32>,
    ) -> EngineResult<BalanceView> {
        let employee = self.employee(employee_id)?;
        let year = year.unwrap_or_else(|| self.clock.today().year());

        if !self.config.category(employee.category)?.leave_eligible {
            return ledger::balance_view(&self.config, &employee, None, year);
        }

        let balance = self
            .store
            .transaction(|tx| ledger::get_or_initialize(tx, &self.config, &employee, year))?;
        ledger::balance_view(&self.config, &employee, Some(&balance), year)
    }

    /// Builds the leave report for `[from, to]`.
    pub fn leave_report(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        leave_type: Option<LeaveTypeCode>,
        status: Option<LeaveStatus>,
    ) -> EngineResult<LeaveReport> {
        if to < from {
            return Err(EngineError::invalid_input(
                "to",
                format!("end of range {} is before start {}", to, from),
            ));
        }
        Ok(self
            .store
            .read(|tables| leave::leave_report(tables, from, to, leave_type, status)))
    }

    /// Runs payroll for one employee or for every active employee.
    pub fn run_payroll(
        &self,
        month: PayrollMonth,
        employee_id: Option<&str>,
        processed_by: &str,
    ) -> EngineResult<PayrollRun> {
        let processed_at = self.clock.now();
        let result = self
            .payroll_runner()
            .run(month, employee_id, processed_by, processed_at);
        if let Err(e) = &result {
            warn!(
                month = %month,
                employee_id = employee_id.unwrap_or("*"),
                error = %e,
                "Payroll run rejected"
            );
        }
        result
    }

    /// Returns the stored records of a month, optionally for one employee.
    pub fn get_payroll(&self, month: PayrollMonth, employee_id: Option<&str>) -> Vec<PayrollRecord> {
        self.store
            .read(|tables| payroll::payroll_records(tables, month, employee_id))
    }

    /// Totals across the stored records of a month.
    pub fn payroll_summary(&self, month: PayrollMonth) -> PayrollSummary {
        self.store
            .read(|tables| payroll::payroll_summary(tables, month))
    }

    /// An employee's most recent payroll records, newest month first.
    pub fn payslip_history(&self, employee_id: &str) -> Vec<PayrollRecord> {
        self.store
            .read(|tables| payroll::payslip_history(tables, employee_id))
    }
}

fn log_transition(
    result: &EngineResult<LeaveApplication>,
    application_id: u64,
    actor_id: &str,
    message: &'static str,
) {
    match result {
        Ok(application) => info!(
            application_id,
            employee_id = %application.employee_id,
            actor_id,
            status = %application.status,
            "{}",
            message
        ),
        Err(e) => warn!(
            application_id,
            actor_id,
            error = %e,
            "Leave transition refused"
        ),
    }
}
