//! SQLite persistence for the store.
//!
//! The journal owns a worker thread with its own single-threaded tokio
//! runtime and a one-connection sqlx pool. [`Store`](super::Store) keeps
//! serving reads from memory; every committed transaction is first written
//! here in one database transaction and only then applied in memory. On
//! open, the committed rows are loaded back into fresh [`Tables`].

use std::fmt::Display;
use std::str::FromStr;
use std::sync::mpsc;
use std::thread;

use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    BalanceEntry, HalfDaySession, LeaveApplication, LeaveBalance, LeaveStatus, LeaveTypeCode,
    PayrollRecord,
};

use super::Tables;
use super::transaction::Changes;

fn storage_error(action: &str, error: impl Display) -> EngineError {
    EngineError::StorageError {
        message: format!("{}: {}", action, error),
    }
}

fn journal_closed() -> EngineError {
    EngineError::StorageError {
        message: "the SQLite journal thread has stopped".to_string(),
    }
}

struct CommitRequest {
    changes: Changes,
    reply: mpsc::Sender<EngineResult<()>>,
}

/// Durable copy of the store's tables in a SQLite database.
#[derive(Debug)]
pub(super) struct SqliteJournal {
    requests: mpsc::Sender<CommitRequest>,
}

impl SqliteJournal {
    /// Connects to `database_url`, applies migrations and loads every
    /// committed row.
    pub(super) fn open(database_url: &str) -> EngineResult<(Self, Tables)> {
        let (requests, inbox) = mpsc::channel::<CommitRequest>();
        let (ready, startup) = mpsc::channel::<EngineResult<Tables>>();
        let database_url = database_url.to_string();

        thread::Builder::new()
            .name("sqlite-journal".to_string())
            .spawn(move || run_worker(&database_url, inbox, ready))
            .map_err(|e| storage_error("Failed to start the journal thread", e))?;

        let tables = startup.recv().map_err(|_| journal_closed())??;
        Ok((Self { requests }, tables))
    }

    /// Writes `changes` in one database transaction and waits for it to
    /// commit.
    pub(super) fn commit(&self, changes: &Changes) -> EngineResult<()> {
        let (reply, response) = mpsc::channel();
        self.requests
            .send(CommitRequest {
                changes: changes.clone(),
                reply,
            })
            .map_err(|_| journal_closed())?;
        response.recv().map_err(|_| journal_closed())?
    }
}

fn run_worker(
    database_url: &str,
    inbox: mpsc::Receiver<CommitRequest>,
    ready: mpsc::Sender<EngineResult<Tables>>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = ready.send(Err(storage_error("Failed to start the journal runtime", e)));
            return;
        }
    };

    let opened = runtime.block_on(async {
        let pool = connect(database_url).await?;
        let tables = load(&pool).await?;
        Ok::<_, EngineError>((pool, tables))
    });
    let pool = match opened {
        Ok((pool, tables)) => {
            if ready.send(Ok(tables)).is_err() {
                return;
            }
            pool
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    // Ends when the journal, and with it the last sender, is dropped
    while let Ok(request) = inbox.recv() {
        let result = runtime.block_on(write(&pool, &request.changes));
        if let Err(e) = &result {
            warn!(error = %e, "SQLite commit failed");
        }
        let _ = request.reply.send(result);
    }
    runtime.block_on(pool.close());
}

#[instrument(skip(database_url))]
async fn connect(database_url: &str) -> EngineResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| storage_error("Invalid database URL", e))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    // A single long-lived connection also keeps `sqlite::memory:` alive
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|e| storage_error("Failed to connect", e))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| storage_error("Migration failed", e))?;

    Ok(pool)
}

#[instrument(skip(pool))]
async fn load(pool: &SqlitePool) -> EngineResult<Tables> {
    let mut tables = Tables::default();

    let rows = sqlx::query(
        r#"
        SELECT id, employee_id, leave_type, start_date, end_date, days_requested, is_half_day,
               half_day_session, reason, status, approved_by, approved_on, rejection_reason,
               applied_on
        FROM leave_applications
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| storage_error("Failed to load leave applications", e))?;
    for row in &rows {
        let application = application_from_row(row)?;
        tables.applications.insert(application.id, application);
    }
    tables.next_application_id = tables
        .applications
        .keys()
        .next_back()
        .map_or(1, |id| id + 1);

    let rows = sqlx::query(
        r#"
        SELECT employee_id, year, casual_total, casual_used, sick_total, sick_used,
               earned_total, earned_used, version
        FROM leave_balances
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| storage_error("Failed to load leave balances", e))?;
    for row in &rows {
        let balance = balance_from_row(row)?;
        tables
            .balances
            .insert((balance.employee_id.clone(), balance.year), balance);
    }

    let rows = sqlx::query("SELECT record FROM payroll")
        .fetch_all(pool)
        .await
        .map_err(|e| storage_error("Failed to load payroll records", e))?;
    for row in &rows {
        let json: String = column(row, "record")?;
        let record: PayrollRecord = serde_json::from_str(&json)
            .map_err(|e| storage_error("Unreadable payroll record", e))?;
        tables
            .payroll
            .insert((record.employee_id.clone(), record.month), record);
    }

    info!(
        applications = tables.applications.len(),
        balances = tables.balances.len(),
        payroll_records = tables.payroll.len(),
        "Loaded committed rows from SQLite"
    );
    Ok(tables)
}

#[instrument(skip_all, fields(
    applications = changes.applications.len(),
    balances = changes.balances.len(),
    payroll_records = changes.payroll.len()
))]
async fn write(pool: &SqlitePool, changes: &Changes) -> EngineResult<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| storage_error("Failed to begin transaction", e))?;

    for application in changes.applications.values() {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO leave_applications (
                id, employee_id, leave_type, start_date, end_date, days_requested, is_half_day,
                half_day_session, reason, status, approved_by, approved_on, rejection_reason,
                applied_on
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(to_i64(application.id, "id")?)
        .bind(&application.employee_id)
        .bind(application.leave_type.code())
        .bind(application.start_date)
        .bind(application.end_date)
        .bind(application.days_requested.to_string())
        .bind(application.is_half_day)
        .bind(application.half_day_session.map(session_code))
        .bind(&application.reason)
        .bind(application.status.to_string())
        .bind(&application.approved_by)
        .bind(application.approved_on)
        .bind(&application.rejection_reason)
        .bind(application.applied_on)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error("Failed to write leave application", e))?;
    }

    for balance in changes.balances.values() {
        let expected_version = balance.version.saturating_sub(1);
        let query = if expected_version == 0 {
            sqlx::query(
                r#"
                INSERT INTO leave_balances (
                    casual_total, casual_used, sick_total, sick_used, earned_total, earned_used,
                    version, employee_id, year
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (employee_id, year) DO NOTHING
                "#,
            )
        } else {
            sqlx::query(
                r#"
                UPDATE leave_balances
                SET casual_total = ?, casual_used = ?, sick_total = ?, sick_used = ?,
                    earned_total = ?, earned_used = ?, version = ?
                WHERE employee_id = ? AND year = ? AND version = ?
                "#,
            )
        };
        let query = query
            .bind(balance.casual.total.to_string())
            .bind(balance.casual.used.to_string())
            .bind(balance.sick.total.to_string())
            .bind(balance.sick.used.to_string())
            .bind(balance.earned.total.to_string())
            .bind(balance.earned.used.to_string())
            .bind(to_i64(balance.version, "version")?)
            .bind(&balance.employee_id)
            .bind(balance.year);
        let query = if expected_version == 0 {
            query
        } else {
            query.bind(to_i64(expected_version, "version")?)
        };

        let result = query
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to write leave balance", e))?;
        if result.rows_affected() == 0 {
            warn!(
                employee_id = %balance.employee_id,
                year = balance.year,
                expected_version,
                "Stale leave balance write rejected"
            );
            return Err(EngineError::StaleBalance {
                employee_id: balance.employee_id.clone(),
                year: balance.year,
                expected_version,
            });
        }
    }

    for record in changes.payroll.values() {
        let json = serde_json::to_string(record)
            .map_err(|e| storage_error("Failed to encode payroll record", e))?;
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO payroll (
                employee_id, month, basic_salary, gross_pay, deductions, net_pay,
                processed_by, processed_at, record
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.employee_id)
        .bind(record.month.to_string())
        .bind(record.basic_salary.to_string())
        .bind(record.gross_pay.to_string())
        .bind(record.deductions.to_string())
        .bind(record.net_pay.to_string())
        .bind(&record.processed_by)
        .bind(record.processed_at)
        .bind(json)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error("Failed to write payroll record", e))?;
    }

    tx.commit()
        .await
        .map_err(|e| storage_error("Failed to commit transaction", e))?;
    debug!("SQLite commit succeeded");
    Ok(())
}

fn application_from_row(row: &SqliteRow) -> EngineResult<LeaveApplication> {
    let id: i64 = column(row, "id")?;
    let leave_type: String = column(row, "leave_type")?;
    let status: String = column(row, "status")?;
    let session: Option<String> = column(row, "half_day_session")?;

    Ok(LeaveApplication {
        id: u64::try_from(id).map_err(|e| storage_error("Invalid application id", e))?,
        employee_id: column(row, "employee_id")?,
        leave_type: LeaveTypeCode::from_str(&leave_type)
            .map_err(|e| storage_error("Invalid leave type", e))?,
        start_date: column(row, "start_date")?,
        end_date: column(row, "end_date")?,
        days_requested: decimal(row, "days_requested")?,
        is_half_day: column(row, "is_half_day")?,
        half_day_session: session.as_deref().map(parse_session).transpose()?,
        reason: column(row, "reason")?,
        status: LeaveStatus::from_str(&status).map_err(|e| storage_error("Invalid status", e))?,
        approved_by: column(row, "approved_by")?,
        approved_on: column(row, "approved_on")?,
        rejection_reason: column(row, "rejection_reason")?,
        applied_on: column(row, "applied_on")?,
    })
}

fn balance_from_row(row: &SqliteRow) -> EngineResult<LeaveBalance> {
    let version: i64 = column(row, "version")?;
    Ok(LeaveBalance {
        employee_id: column(row, "employee_id")?,
        year: column(row, "year")?,
        casual: BalanceEntry {
            total: decimal(row, "casual_total")?,
            used: decimal(row, "casual_used")?,
        },
        sick: BalanceEntry {
            total: decimal(row, "sick_total")?,
            used: decimal(row, "sick_used")?,
        },
        earned: BalanceEntry {
            total: decimal(row, "earned_total")?,
            used: decimal(row, "earned_used")?,
        },
        version: u64::try_from(version).map_err(|e| storage_error("Invalid version", e))?,
    })
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> EngineResult<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| storage_error(&format!("Unreadable column '{}'", name), e))
}

fn decimal(row: &SqliteRow, name: &str) -> EngineResult<Decimal> {
    let text: String = column(row, name)?;
    Decimal::from_str(&text).map_err(|e| storage_error(&format!("Invalid decimal in '{}'", name), e))
}

fn to_i64(value: u64, name: &str) -> EngineResult<i64> {
    i64::try_from(value).map_err(|e| storage_error(&format!("'{}' out of range", name), e))
}

fn session_code(session: HalfDaySession) -> &'static str {
    match session {
        HalfDaySession::FirstHalf => "first_half",
        HalfDaySession::SecondHalf => "second_half",
    }
}

fn parse_session(code: &str) -> EngineResult<HalfDaySession> {
    match code {
        "first_half" => Ok(HalfDaySession::FirstHalf),
        "second_half" => Ok(HalfDaySession::SecondHalf),
        other => Err(storage_error("Invalid half-day session", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::super::Store;
    use crate::error::{EngineError, EngineResult};
    use crate::models::{
        Entitlement, HalfDaySession, LeaveApplication, LeaveBalance, LeaveStatus, LeaveTypeCode,
    };
    use chrono::{DateTime, NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn database_url(dir: &tempfile::TempDir) -> String {
        format!("sqlite://{}", dir.path().join("hr.db").display())
    }

    fn create_application(id: u64) -> LeaveApplication {
        let date = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
        LeaveApplication {
            id,
            employee_id: "E001".to_string(),
            leave_type: LeaveTypeCode::HalfDay,
            start_date: date,
            end_date: date,
            days_requested: dec("0.5"),
            is_half_day: true,
            half_day_session: Some(HalfDaySession::SecondHalf),
            reason: "Appointment".to_string(),
            status: LeaveStatus::Approved,
            approved_by: Some("HR01".to_string()),
            approved_on: Some(DateTime::<Utc>::UNIX_EPOCH),
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
    fn test_reopened_store_keeps_committed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(&dir);

        {
            let store = Store::open(&url).unwrap();
            store
                .transaction(|tx| {
                    let id = tx.next_application_id();
                    tx.put_application(create_application(id));
                    let mut balance = LeaveBalance::new("E001", 2026, entitlement());
                    balance.casual.used = dec("1.5");
                    tx.put_balance(balance);
                    Ok(())
                })
                .unwrap();
        }

        let store = Store::open(&url).unwrap();
        assert_eq!(store.read(|t| t.application(1).cloned()), Some(create_application(1)));
        let balance = store.read(|t| t.balance("E001", 2026).cloned()).unwrap();
        assert_eq!(balance.casual.used, dec("1.5"));
        assert_eq!(balance.earned.total, Decimal::from(15));
        assert_eq!(balance.version, 1);

        // Ids continue after the highest stored one
        let id = store.transaction(|tx| Ok(tx.next_application_id())).unwrap();
        assert_eq!(id, 2);
    }

    #[test]
    fn test_failed_transaction_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(&dir);

        {
            let store = Store::open(&url).unwrap();
            let result: EngineResult<()> = store.transaction(|tx| {
                tx.put_application(create_application(1));
                Err(EngineError::invalid_input("test", "abort"))
            });
            assert!(result.is_err());
        }

        let store = Store::open(&url).unwrap();
        assert_eq!(store.read(|t| t.applications().count()), 0);
    }

    #[test]
    fn test_stale_balance_write_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(&dir);

        let first = Store::open(&url).unwrap();
        first
            .transaction(|tx| {
                tx.put_balance(LeaveBalance::new("E001", 2026, entitlement()));
                Ok(())
            })
            .unwrap();

        // Both stores now hold version 1
        let second = Store::open(&url).unwrap();
        let debit = |store: &Store| {
            store.transaction(|tx| {
                let mut balance = tx.balance("E001", 2026).unwrap();
                balance.casual.used += Decimal::ONE;
                tx.put_balance(balance);
                Ok(())
            })
        };

        debit(&first).unwrap();
        let result = debit(&second);

        assert_eq!(
            result,
            Err(EngineError::StaleBalance {
                employee_id: "E001".to_string(),
                year: 2026,
                expected_version: 1,
            })
        );
        let balance = second.read(|t| t.balance("E001", 2026).cloned()).unwrap();
        assert_eq!(balance.version, 1);
        assert_eq!(balance.casual.used, Decimal::ZERO);

        let reopened = Store::open(&url).unwrap();
        let balance = reopened.read(|t| t.balance("E001", 2026).cloned()).unwrap();
        assert_eq!(balance.version, 2);
        assert_eq!(balance.casual.used, Decimal::ONE);
    }

    #[test]
    fn test_memory_database_is_usable() {
        let store = Store::open("sqlite::memory:").unwrap();
        store
            .transaction(|tx| {
                tx.put_balance(LeaveBalance::new("E001", 2026, entitlement()));
                Ok(())
            })
            .unwrap();
        assert!(store.read(|t| t.balance("E001", 2026).is_some()));
    }
}
