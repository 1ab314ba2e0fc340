//! Storage for leave applications, balances and payroll records.
//!
//! All tables sit behind one lock. [`Store::new`] keeps them in memory only;
//! [`Store::open`] also journals every commit to SQLite and loads the
//! committed rows on startup. Every operation runs in a
//! [`Transaction`]: reads and validation happen under the lock, writes are
//! staged, and the staged writes are applied only if the operation returns
//! `Ok`. Transactions are serialized, so two concurrent operations on the
//! same balance row always observe each other's committed writes.
//!
//! # Example
//!
//! ```
//! use leave_payroll_engine::models::{Entitlement, LeaveBalance};
//! use leave_payroll_engine::store::Store;
//! use leave_payroll_engine::error::EngineError;
//!
//! let store = Store::new();
//!
//! // A failing transaction leaves no trace.
//! let result: Result<(), EngineError> = store.transaction(|tx| {
//!     tx.put_balance(LeaveBalance::new("E001", 2026, Entitlement::default()));
//!     Err(EngineError::invalid_input("demo", "rolled back"))
//! });
//! assert!(result.is_err());
//! assert!(store.read(|tables| tables.balance("E001", 2026).is_none()));
//! ```

mod sqlite;
mod transaction;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::error::EngineResult;
use crate::models::{LeaveApplication, LeaveBalance, PayrollMonth, PayrollRecord};

use sqlite::SqliteJournal;

pub use transaction::Transaction;

/// The committed tables.
#[derive(Debug)]
pub struct Tables {
    applications: BTreeMap<u64, LeaveApplication>,
    balances: HashMap<(String, i32), LeaveBalance>,
    payroll: BTreeMap<(String, PayrollMonth), PayrollRecord>,
    next_application_id: u64,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            applications: BTreeMap::new(),
            balances: HashMap::new(),
            payroll: BTreeMap::new(),
            next_application_id: 1,
        }
    }
}

impl Tables {
    /// Every application, in id order.
    pub fn applications(&self) -> impl Iterator<Item = &LeaveApplication> {
        self.applications.values()
    }

    /// Returns an application by id.
    pub fn application(&self, id: u64) -> Option<&LeaveApplication> {
        self.applications.get(&id)
    }

    /// Returns the balance row for (employee, year).
    pub fn balance(&self, employee_id: &str, year: i32) -> Option<&LeaveBalance> {
        self.balances.get(&(employee_id.to_string(), year))
    }

    /// Every balance row.
    pub fn balances(&self) -> impl Iterator<Item = &LeaveBalance> {
        self.balances.values()
    }

    /// Every payroll record, ordered by (employee, month).
    pub fn payroll_records(&self) -> impl Iterator<Item = &PayrollRecord> {
        self.payroll.values()
    }

    /// Returns the payroll record for (employee, month).
    pub fn payroll_record(&self, employee_id: &str, month: PayrollMonth) -> Option<&PayrollRecord> {
        self.payroll.get(&(employee_id.to_string(), month))
    }
}

/// The engine's transactional store.
#[derive(Debug, Default)]
pub struct Store {
    tables: Mutex<Tables>,
    journal: Option<SqliteJournal>,
}

impl Store {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a SQLite-backed store, creating the database and running
    /// migrations as needed.
    ///
    /// `database_url` is a sqlx SQLite URL such as `sqlite://hr-engine.db`
    /// or `sqlite::memory:`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the database cannot be opened, migrated or
    /// read.
    pub fn open(database_url: &str) -> EngineResult<Self> {
        let (journal, tables) = SqliteJournal::open(database_url)?;
        info!(database_url, "Opened SQLite store");
        Ok(Self {
            tables: Mutex::new(tables),
            journal: Some(journal),
        })
    }

    /// Runs `operation` as one atomic transaction.
    ///
    /// The staged writes are committed if `operation` returns `Ok` and
    /// discarded otherwise. A SQLite-backed store writes them to the
    /// database first, in one database transaction; if that fails the
    /// operation fails and memory is left untouched.
    pub fn transaction<T, F>(&self, operation: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> EngineResult<T>,
    {
        let mut tables = self.lock();
        let mut tx = Transaction::new(&tables);
        let value = operation(&mut tx)?;
        let changes = tx.into_changes();
        if let Some(journal) = self.journal.as_ref().filter(|_| changes.has_rows()) {
            journal.commit(&changes)?;
        }
        changes.apply(&mut tables);
        Ok(value)
    }

    /// Runs a read-only query against the committed tables.
    pub fn read<T, F>(&self, query: F) -> T
    where
        F: FnOnce(&Tables) -> T,
    {
        query(&self.lock())
    }

    // Writes are staged until commit, so a poisoned lock still guards
    // consistent tables.
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{Entitlement, HalfDaySession, LeaveStatus, LeaveTypeCode};
    use chrono::{DateTime, NaiveDate, Utc};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::thread;

    fn create_application(id: u64, employee_id: &str) -> LeaveApplication {
        let date = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
        LeaveApplication {
            id,
            employee_id: employee_id.to_string(),
            leave_type: LeaveTypeCode::HalfDay,
            start_date: date,
            end_date: date,
            days_requested: Decimal::new(5, 1),
            is_half_day: true,
            half_day_session: Some(HalfDaySession::FirstHalf),
            reason: "Appointment".to_string(),
            status: LeaveStatus::Pending,
            approved_by: None,
            approved_on: None,
            rejection_reason: None,
            applied_on: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn entitlement() -> Entitlement {
        Entitlement {
            casual: Decimal::from(12),
            sick: Decimal::from(12),
            earned: Decimal::from(15),
        }
    }

    #[test]
    fn test_committed_transaction_is_visible() {
        let store = Store::new();
        let id = store
            .transaction(|tx| {
                let id = tx.next_application_id();
                tx.put_application(create_application(id, "E001"));
                Ok(id)
            })
            .unwrap();

        assert_eq!(id, 1);
        assert!(store.read(|t| t.application(1).is_some()));
    }

    #[test]
    fn test_failed_transaction_is_discarded() {
        let store = Store::new();
        let result: EngineResult<()> = store.transaction(|tx| {
            let id = tx.next_application_id();
            tx.put_application(create_application(id, "E001"));
            tx.put_balance(LeaveBalance::new("E001", 2026, entitlement()));
            Err(EngineError::invalid_input("test", "abort"))
        });

        assert!(result.is_err());
        assert_eq!(store.read(|t| t.applications().count()), 0);
        assert!(store.read(|t| t.balance("E001", 2026).is_none()));

        // The reserved id was not consumed either.
        let id = store.transaction(|tx| Ok(tx.next_application_id())).unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_transaction_reads_its_own_writes() {
        let store = Store::new();
        store
            .transaction(|tx| {
                tx.put_application(create_application(1, "E001"));
                tx.put_application(create_application(2, "E002"));
                assert!(tx.application(1).is_some());
                assert_eq!(tx.applications_of("E001").len(), 1);

                tx.put_balance(LeaveBalance::new("E001", 2026, entitlement()));
                assert_eq!(tx.balance("E001", 2026).unwrap().version, 1);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_put_balance_bumps_version() {
        let store = Store::new();
        for _ in 0..3 {
            store
                .transaction(|tx| {
                    let balance = tx
                        .balance("E001", 2026)
                        .unwrap_or_else(|| LeaveBalance::new("E001", 2026, entitlement()));
                    tx.put_balance(balance);
                    Ok(())
                })
                .unwrap();
        }
        assert_eq!(store.read(|t| t.balance("E001", 2026).unwrap().version), 3);
    }

    #[test]
    fn test_version_moves_once_per_commit() {
        let store = Store::new();
        store
            .transaction(|tx| {
                let mut balance = LeaveBalance::new("E001", 2026, entitlement());
                tx.put_balance(balance.clone());
                balance.casual.used = Decimal::ONE;
                tx.put_balance(balance);
                Ok(())
            })
            .unwrap();

        let balance = store.read(|t| t.balance("E001", 2026).cloned()).unwrap();
        assert_eq!(balance.version, 1);
        assert_eq!(balance.casual.used, Decimal::ONE);
    }

    #[test]
    fn test_concurrent_transactions_are_serialized() {
        let store = Arc::new(Store::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .transaction(|tx| {
                            let id = tx.next_application_id();
                            tx.put_application(create_application(id, "E001"));
                            Ok(id)
                        })
                        .unwrap()
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<u64>>());
    }
}
