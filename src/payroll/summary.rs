//! Read-side payroll queries.

use rust_decimal::Decimal;

use crate::models::{PayrollMonth, PayrollRecord, PayrollSummary};
use crate::store::Tables;

/// Number of records returned by [`payslip_history`].
pub const PAYSLIP_HISTORY_LIMIT: usize = 12;

/// Stored records for a month, optionally for one employee, by employee id.
pub fn payroll_records(
    tables: &Tables,
    month: PayrollMonth,
    employee_id: Option<&str>,
) -> Vec<PayrollRecord> {
    tables
        .payroll_records()
        .filter(|r| r.month == month)
        .filter(|r| employee_id.is_none_or(|id| r.employee_id == id))
        .cloned()
        .collect()
}

/// Totals across every stored record of a month.
pub fn payroll_summary(tables: &Tables, month: PayrollMonth) -> PayrollSummary {
    let mut summary = PayrollSummary {
        month,
        total_employees: 0,
        total_basic: Decimal::ZERO,
        total_allowances: Decimal::ZERO,
        total_overtime: Decimal::ZERO,
        total_deductions: Decimal::ZERO,
        total_net_pay: Decimal::ZERO,
    };
    for record in tables.payroll_records().filter(|r| r.month == month) {
        summary.total_employees += 1;
        summary.total_basic += record.basic_salary;
        summary.total_allowances += record.allowances;
        summary.total_overtime += record.overtime_pay;
        summary.total_deductions += record.deductions;
        summary.total_net_pay += record.net_pay;
    }
    summary
}

/// An employee's most recent records, newest month first.
pub fn payslip_history(tables: &Tables, employee_id: &str) -> Vec<PayrollRecord> {
    let mut records: Vec<PayrollRecord> = tables
        .payroll_records()
        .filter(|r| r.employee_id == employee_id)
        .cloned()
        .collect();
    records.sort_by(|a, b| b.month.cmp(&a.month));
    records.truncate(PAYSLIP_HISTORY_LIMIT);
    records
}
