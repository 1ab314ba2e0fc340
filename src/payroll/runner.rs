//! Payroll runs against the store.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::calculation::{PayrollInput, calculate_payroll};
use crate::config::EngineConfig;
use crate::directory::{AttendanceLedger, EmployeeDirectory};
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, PayrollFailure, PayrollMonth, PayrollRecord, PayrollRun};
use crate::store::Store;

/// Computes and upserts payroll records.
///
/// Each employee is computed in its own transaction: a failure for one
/// employee never rolls back another's record.
#[derive(Clone, Copy)]
pub struct PayrollRunner<'a> {
    store: &'a Store,
    config: &'a EngineConfig,
    directory: &'a dyn EmployeeDirectory,
    attendance: &'a dyn AttendanceLedger,
}

impl<'a> PayrollRunner<'a> {
    /// Creates a runner over the given store and collaborators.
    pub fn new(
        store: &'a Store,
        config: &'a EngineConfig,
        directory: &'a dyn EmployeeDirectory,
        attendance: &'a dyn AttendanceLedger,
    ) -> Self {
        Self {
            store,
            config,
            directory,
            attendance,
        }
    }

    /// Runs payroll for one employee, or for every active employee when
    /// `employee_id` is `None`.
    ///
    /// # Errors
    ///
    /// For a single employee: `EmployeeNotFound` or `EmployeeInactive`.
    /// A run over all employees skips inactive ones and collects
    /// per-employee failures in [`PayrollRun::failures`].
    pub fn run(
        &self,
        month: PayrollMonth,
        employee_id: Option<&str>,
        processed_by: &str,
        processed_at: DateTime<Utc>,
    ) -> EngineResult<PayrollRun> {
        match employee_id {
            Some(employee_id) => {
                let employee = self.directory.employee(employee_id).ok_or_else(|| {
                    EngineError::EmployeeNotFound {
                        employee_id: employee_id.to_string(),
                    }
                })?;
                if !employee.is_active() {
                    return Err(EngineError::EmployeeInactive {
                        employee_id: employee.id,
                    });
                }
                let record = self.run_employee(&employee, month, processed_by, processed_at)?;
                Ok(PayrollRun {
                    month,
                    records: vec![record],
                    failures: Vec::new(),
                })
            }
            None => Ok(self.run_all(month, processed_by, processed_at)),
        }
    }

    fn run_all(
        &self,
        month: PayrollMonth,
        processed_by: &str,
        processed_at: DateTime<Utc>,
    ) -> PayrollRun {
        let mut run = PayrollRun {
            month,
            records: Vec::new(),
            failures: Vec::new(),
        };

        for employee in self.directory.active_employees() {
            match self.run_employee(&employee, month, processed_by, processed_at) {
                Ok(record) => run.records.push(record),
                Err(e) => {
                    warn!(
                        employee_id = %employee.id,
                        month = %month,
                        error = %e,
                        "Payroll computation failed"
                    );
                    run.failures.push(PayrollFailure {
                        employee_id: employee.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            month = %month,
            processed = run.records.len(),
            failed = run.failures.len(),
            "Payroll run completed"
        );
        run
    }

    fn run_employee(
        &self,
        employee: &Employee,
        month: PayrollMonth,
        processed_by: &str,
        processed_at: DateTime<Utc>,
    ) -> EngineResult<PayrollRecord> {
        let attendance = self.attendance.monthly_summary(&employee.id, month);

        self.store.transaction(|tx| {
            let applications = tx.applications_of(&employee.id);
            let input = PayrollInput {
                employee,
                month,
                attendance,
                applications: &applications,
            };
            let record = calculate_payroll(&input, self.config, processed_by, processed_at)?;
            let replaced = tx.payroll_record(&employee.id, month).is_some();
            tx.put_payroll_record(record.clone());

            info!(
                employee_id = %employee.id,
                month = %month,
                gross_pay = %record.gross_pay,
                deductions = %record.deductions,
                net_pay = %record.net_pay,
                replaced,
                "Payroll record stored"
            );
            Ok(record)
        })
    }
}
