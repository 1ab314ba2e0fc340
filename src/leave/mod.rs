//! The leave application state machine and balance ledger.
//!
//! Submission validates a request against the catalog, the monthly cap and
//! the yearly balance without writing the ledger. Approval is the only
//! operation that debits it.

pub mod ledger;
mod report;
mod submission;
mod transitions;

pub use report::{LeaveReport, LeaveTypeSummary, employee_leaves, leave_report, leaves_by_status};
pub use submission::{LeaveRequest, submit};
pub use transitions::{DEFAULT_REJECTION_REASON, approve, cancel, reject};
