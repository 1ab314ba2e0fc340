//! Staged writes over a locked snapshot of the tables.

use std::collections::{BTreeMap, HashMap};

use crate::models::{LeaveApplication, LeaveBalance, PayrollMonth, PayrollRecord};

use super::Tables;

/// Writes staged by a transaction, applied to the tables on commit.
#[derive(Debug, Clone, Default)]
pub(super) struct Changes {
    pub(super) applications: BTreeMap<u64, LeaveApplication>,
    pub(super) balances: HashMap<(String, i32), LeaveBalance>,
    pub(super) payroll: BTreeMap<(String, PayrollMonth), PayrollRecord>,
    pub(super) next_application_id: Option<u64>,
}

impl Changes {
    /// True if at least one row was written.
    pub(super) fn has_rows(&self) -> bool {
        !(self.applications.is_empty() && self.balances.is_empty() && self.payroll.is_empty())
    }

    pub(super) fn apply(self, tables: &mut Tables) {
        tables.applications.extend(self.applications);
        tables.balances.extend(self.balances);
        tables.payroll.extend(self.payroll);
        if let Some(next) = self.next_application_id {
            tables.next_application_id = next;
        }
    }
}

/// A unit of work holding the store lock.
///
/// Reads see the committed tables overlaid with this transaction's own
/// writes. Nothing is visible to other callers until
/// [`Store::transaction`](super::Store::transaction) commits.
#[derive(Debug)]
pub struct Transaction<'a> {
    base: &'a Tables,
    changes: Changes,
}

impl<'a> Transaction<'a> {
    pub(super) fn new(base: &'a Tables) -> Self {
        Self {
            base,
            changes: Changes::default(),
        }
    }

    pub(super) fn into_changes(self) -> Changes {
        self.changes
    }

    /// Reserves the next application id.
    pub fn next_application_id(&mut self) -> u64 {
        let id = self
            .changes
            .next_application_id
            .unwrap_or(self.base.next_application_id);
        self.changes.next_application_id = Some(id + 1);
        id
    }

    /// Returns an application by id.
    pub fn application(&self, id: u64) -> Option<LeaveApplication> {
        self.changes
            .applications
            .get(&id)
            .or_else(|| self.base.applications.get(&id))
            .cloned()
    }

    /// Returns every application of one employee, oldest id first.
    pub fn applications_of(&self, employee_id: &str) -> Vec<LeaveApplication> {
        let mut merged: BTreeMap<u64, &LeaveApplication> = self
            .base
            .applications
            .iter()
            .filter(|(_, a)| a.employee_id == employee_id)
            .map(|(id, a)| (*id, a))
            .collect();
        for (id, application) in &self.changes.applications {
            if application.employee_id == employee_id {
                merged.insert(*id, application);
            }
        }
        merged.into_values().cloned().collect()
    }

    /// Inserts or replaces an application.
    pub fn put_application(&mut self, application: LeaveApplication) {
        self.changes
            .applications
            .insert(application.id, application);
    }

    /// Returns the balance row for (employee, year), if one exists.
    pub fn balance(&self, employee_id: &str, year: i32) -> Option<LeaveBalance> {
        let key = (employee_id.to_string(), year);
        self.changes
            .balances
            .get(&key)
            .or_else(|| self.base.balances.get(&key))
            .cloned()
    }

    /// Writes a balance row and returns the row as written.
    ///
    /// The written version is one past the committed row's version (0 when
    /// there is none), however many times the row is written within this
    /// transaction.
    pub fn put_balance(&mut self, mut balance: LeaveBalance) -> LeaveBalance {
        let committed = self
            .base
            .balances
            .get(&(balance.employee_id.clone(), balance.year))
            .map_or(0, |b| b.version);
        balance.version = committed + 1;
        self.changes
            .balances
            .insert((balance.employee_id.clone(), balance.year), balance.clone());
        balance
    }

    /// Returns the payroll record for (employee, month), if one exists.
    pub fn payroll_record(&self, employee_id: &str, month: PayrollMonth) -> Option<PayrollRecord> {
        let key = (employee_id.to_string(), month);
        self.changes
            .payroll
            .get(&key)
            .or_else(|| self.base.payroll.get(&key))
            .cloned()
    }

    /// Inserts or replaces the payroll record for its (employee, month).
    pub fn put_payroll_record(&mut self, record: PayrollRecord) {
        self.changes
            .payroll
            .insert((record.employee_id.clone(), record.month), record);
    }
}
