//! Leave balance ledger operations.
//!
//! Rows are keyed by (employee, calendar year) and created on first access
//! from the employee category's entitlement. Every function here runs inside
//! a store transaction, so initialization and debits share one lock.

use rust_decimal::Decimal;
use tracing::{debug, error};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    BalanceCategory, BalanceView, CategoryBalanceView, Employee, LeaveBalance,
};
use crate::store::Transaction;

/// Returns the balance row for (employee, year), creating it if absent.
///
/// Calling this twice in a row returns the same row; the second call never
/// writes.
pub fn get_or_initialize(
    tx: &mut Transaction<'_>,
    config: &EngineConfig,
    employee: &Employee,
    year: i32,
) -> EngineResult<LeaveBalance> {
    if let Some(balance) = tx.balance(&employee.id, year) {
        return Ok(balance);
    }

    let entitlement = config.category(employee.category)?.entitlement;
    debug!(
        employee_id = %employee.id,
        year,
        category = %employee.category,
        "Initializing leave balance"
    );
    Ok(tx.put_balance(LeaveBalance::new(employee.id.clone(), year, entitlement)))
}

/// Increases `used` for one category.
///
/// # Errors
///
/// Returns `BalanceCorruption` if the debit would push `used` above
/// `total`. The caller's transaction is then discarded as a whole.
pub fn debit(
    tx: &mut Transaction<'_>,
    mut balance: LeaveBalance,
    category: BalanceCategory,
    amount: Decimal,
) -> EngineResult<LeaveBalance> {
    let entry = balance.entry(category);
    if entry.used + amount > entry.total {
        error!(
            employee_id = %balance.employee_id,
            year = balance.year,
            category = %category,
            total = %entry.total,
            used = %entry.used,
            amount = %amount,
            "Balance debit would exceed entitlement"
        );
        return Err(EngineError::BalanceCorruption {
            employee_id: balance.employee_id.clone(),
            year: balance.year,
            category,
            total: entry.total,
            used: entry.used,
            amount,
        });
    }

    balance.entry_mut(category).used += amount;
    Ok(tx.put_balance(balance))
}

/// Builds the answer to a balance query.
///
/// Employees whose category is not leave-eligible get `eligible: false` and
/// no lines.
pub fn balance_view(
    config: &EngineConfig,
    employee: &Employee,
    balance: Option<&LeaveBalance>,
    year: i32,
) -> EngineResult<BalanceView> {
    let eligible = config.category(employee.category)?.leave_eligible;
    let balances = match balance {
        Some(balance) if eligible => BalanceCategory::ALL
            .into_iter()
            .map(|category| {
                let entry = balance.entry(category);
                let (code, name) = config
                    .leave_type_for(category)
                    .map(|d| (d.code.code().to_string(), d.name.clone()))
                    .unwrap_or_else(|| (category.to_string(), category.to_string()));
                CategoryBalanceView {
                    category,
                    code,
                    name,
                    total: entry.total,
                    used: entry.used,
                    available: entry.available(),
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(BalanceView {
        eligible,
        employee_id: employee.id.clone(),
        category: employee.category,
        year,
        balances,
    })
}
