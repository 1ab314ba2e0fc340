//! HTTP API module for the leave and payroll engine.
//!
//! This module exposes the engine operations as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ActorBody, BACK_OFFICE_ROLES, EmployeeQuery, LeaveReportQuery, ListLeavesQuery,
    RejectLeaveBody, RunPayrollBody, StatusQuery, SubmitLeaveBody, YearQuery,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
