//! Leave catalog and leave application models.
//!
//! This module contains the closed set of leave type codes, the catalog row
//! describing each type, and the [`LeaveApplication`] record whose lifecycle is
//! driven by the leave state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BalanceCategory;

/// A leave type code.
///
/// Unknown codes are rejected at the boundary, so everything past parsing
/// works with a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeaveTypeCode {
    /// Casual leave.
    #[serde(rename = "CL")]
    Casual,
    /// Sick leave.
    #[serde(rename = "SL")]
    Sick,
    /// Earned leave.
    #[serde(rename = "EL")]
    Earned,
    /// Half-day leave.
    #[serde(rename = "Half-Day")]
    HalfDay,
    /// Loss of pay (unpaid) leave.
    #[serde(rename = "LOP")]
    LossOfPay,
}

impl LeaveTypeCode {
    /// All leave type codes.
    pub const ALL: [LeaveTypeCode; 5] = [
        LeaveTypeCode::Casual,
        LeaveTypeCode::Sick,
        LeaveTypeCode::Earned,
        LeaveTypeCode::HalfDay,
        LeaveTypeCode::LossOfPay,
    ];

    /// Returns the wire code (e.g. `"CL"`).
    pub fn code(&self) -> &'static str {
        match self {
            LeaveTypeCode::Casual => "CL",
            LeaveTypeCode::Sick => "SL",
            LeaveTypeCode::Earned => "EL",
            LeaveTypeCode::HalfDay => "Half-Day",
            LeaveTypeCode::LossOfPay => "LOP",
        }
    }
}

impl fmt::Display for LeaveTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LeaveTypeCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeaveTypeCode::ALL
            .into_iter()
            .find(|c| c.code() == s.trim())
            .ok_or_else(|| {
                let valid: Vec<&str> = LeaveTypeCode::ALL.iter().map(|c| c.code()).collect();
                format!("Invalid leave type '{}'. Valid types: {}", s, valid.join(", "))
            })
    }
}

/// A row of the leave catalog.
///
/// # Example
///
/// ```
/// use leave_payroll_engine::models::{BalanceCategory, LeaveTypeCode, LeaveTypeDefinition};
/// use rust_decimal::Decimal;
///
/// let casual = LeaveTypeDefinition {
///     code: LeaveTypeCode::Casual,
///     name: "Casual Leave".to_string(),
///     max_per_year: Decimal::from(12),
///     max_per_month: Decimal::from(12),
///     advance_notice_days: 1,
///     balance_category: Some(BalanceCategory::Casual),
///     paid: true,
/// };
/// assert!(casual.tracks_balance());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveTypeDefinition {
    /// The leave type code.
    pub code: LeaveTypeCode,
    /// Human-readable name.
    pub name: String,
    /// Maximum days per calendar year.
    pub max_per_year: Decimal,
    /// Maximum days per calendar month.
    pub max_per_month: Decimal,
    /// Minimum days of advance notice.
    pub advance_notice_days: u32,
    /// The balance ledger column this type debits, if any.
    #[serde(default)]
    pub balance_category: Option<BalanceCategory>,
    /// Whether approved days are paid in payroll.
    pub paid: bool,
}

impl LeaveTypeDefinition {
    /// Returns true if approving this type debits the balance ledger.
    pub fn tracks_balance(&self) -> bool {
        self.balance_category.is_some()
    }
}

/// The lifecycle state of a leave application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Submitted, awaiting a decision.
    Pending,
    /// Approved by an approver; the balance has been debited.
    Approved,
    /// Rejected by an approver.
    Rejected,
    /// Withdrawn by the employee while pending.
    Cancelled,
}

impl LeaveStatus {
    /// Returns true if no transition leaves this state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }

    /// Returns true if days in this state count toward the monthly cap.
    pub fn counts_toward_cap(&self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(LeaveStatus::Pending),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            "cancelled" => Ok(LeaveStatus::Cancelled),
            _ => Err(format!("Invalid leave status: {}", s)),
        }
    }
}

/// Which half of the day a half-day leave covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfDaySession {
    /// Morning session.
    #[default]
    FirstHalf,
    /// Afternoon session.
    SecondHalf,
}

/// A leave application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveApplication {
    /// Generated identifier.
    pub id: u64,
    /// The employee the leave is for.
    pub employee_id: String,
    /// The leave type.
    pub leave_type: LeaveTypeCode,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Days requested: the inclusive span, or 0.5 for a half-day.
    pub days_requested: Decimal,
    /// Whether this is a half-day request.
    pub is_half_day: bool,
    /// The half-day session, present only for half-day requests.
    pub half_day_session: Option<HalfDaySession>,
    /// Free-text reason.
    pub reason: String,
    /// Lifecycle state.
    pub status: LeaveStatus,
    /// Who approved or rejected the request.
    pub approved_by: Option<String>,
    /// When the request was approved or rejected.
    pub approved_on: Option<DateTime<Utc>>,
    /// Why the request was rejected.
    pub rejection_reason: Option<String>,
    /// When the request was submitted.
    pub applied_on: DateTime<Utc>,
}

impl LeaveApplication {
    /// The calendar year whose balance this application draws on.
    pub fn balance_year(&self) -> i32 {
        self.start_date.year()
    }

    /// Returns true if any day of the leave falls within `[from, to]`.
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start_date <= to && self.end_date >= from
    }

    /// Working days of this leave that fall within `[from, to]`.
    ///
    /// Days on `rest_day` never count. A half-day counts 0.5; otherwise each
    /// other day in the overlap counts one.
    ///
    /// # Example
    ///
    /// ```
    /// use leave_payroll_engine::models::{LeaveApplication, LeaveStatus, LeaveTypeCode};
    /// use chrono::{NaiveDate, Utc, Weekday};
    /// use rust_decimal::Decimal;
    ///
    /// let leave = LeaveApplication {
    ///     id: 1,
    ///     employee_id: "E001".to_string(),
    ///     leave_type: LeaveTypeCode::Earned,
    ///     start_date: NaiveDate::from_ymd_opt(2026, 1, 30).unwrap(),
    ///     end_date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
    ///     days_requested: Decimal::from(4),
    ///     is_half_day: false,
    ///     half_day_session: None,
    ///     reason: "Travel".to_string(),
    ///     status: LeaveStatus::Approved,
    ///     approved_by: None,
    ///     approved_on: None,
    ///     rejection_reason: None,
    ///     applied_on: Utc::now(),
    /// };
    ///
    /// let january = leave.days_within(
    ///     NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
    ///     Weekday::Sun,
    /// );
    /// assert_eq!(january, Decimal::from(2));
    ///
    /// // 2026-02-01 is a Sunday
    /// let february = leave.days_within(
    ///     NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
    ///     Weekday::Sun,
    /// );
    /// assert_eq!(february, Decimal::from(1));
    /// ```
    pub fn days_within(&self, from: NaiveDate, to: NaiveDate, rest_day: Weekday) -> Decimal {
        if !self.overlaps(from, to) {
            return Decimal::ZERO;
        }
        let start = self.start_date.max(from);
        let end = self.end_date.min(to);
        let working = start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| d.weekday() != rest_day)
            .count();
        if self.is_half_day {
            return if working == 0 {
                Decimal::ZERO
            } else {
                self.days_requested
            };
        }
        Decimal::from(working)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn create_application(start: &str, end: &str, half_day: bool) -> LeaveApplication {
        let start_date = make_date(start);
        let end_date = make_date(end);
        let days_requested = if half_day {
            Decimal::new(5, 1)
        } else {
            Decimal::from((end_date - start_date).num_days() + 1)
        };
        LeaveApplication {
            id: 1,
            employee_id: "E001".to_string(),
            leave_type: LeaveTypeCode::Casual,
            start_date,
            end_date,
            days_requested,
            is_half_day: half_day,
            half_day_session: half_day.then_some(HalfDaySession::FirstHalf),
            reason: "Family".to_string(),
            status: LeaveStatus::Pending,
            approved_by: None,
            approved_on: None,
            rejection_reason: None,
            applied_on: DateTime::parse_from_rfc3339("2026-01-01T09:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_leave_type_codes_round_trip_through_from_str() {
        for code in LeaveTypeCode::ALL {
            assert_eq!(code.code().parse::<LeaveTypeCode>().unwrap(), code);
        }
    }

    #[test]
    fn test_unknown_leave_type_lists_valid_types() {
        let err = "PL".parse::<LeaveTypeCode>().unwrap_err();
        assert!(err.contains("CL, SL, EL, Half-Day, LOP"));
    }

    #[test]
    fn test_leave_type_serialization() {
        assert_eq!(
            serde_json::to_string(&LeaveTypeCode::HalfDay).unwrap(),
            "\"Half-Day\""
        );
        assert_eq!(
            serde_json::from_str::<LeaveTypeCode>("\"LOP\"").unwrap(),
            LeaveTypeCode::LossOfPay
        );
    }

    #[test]
    fn test_only_pending_is_not_terminal() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Rejected.is_terminal());
        assert!(LeaveStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_rejected_and_cancelled_do_not_count_toward_cap() {
        assert!(LeaveStatus::Pending.counts_toward_cap());
        assert!(LeaveStatus::Approved.counts_toward_cap());
        assert!(!LeaveStatus::Rejected.counts_toward_cap());
        assert!(!LeaveStatus::Cancelled.counts_toward_cap());
    }

    #[test]
    fn test_days_within_clips_to_range() {
        // Sunday 2026-03-29 through Friday 2026-04-03
        let leave = create_application("2026-03-29", "2026-04-03", false);
        assert_eq!(
            leave.days_within(make_date("2026-03-01"), make_date("2026-03-31"), Weekday::Sun),
            Decimal::from(2)
        );
        assert_eq!(
            leave.days_within(make_date("2026-04-01"), make_date("2026-04-30"), Weekday::Sun),
            Decimal::from(3)
        );
        assert_eq!(
            leave.days_within(make_date("2026-05-01"), make_date("2026-05-31"), Weekday::Sun),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_days_within_skips_rest_day() {
        // Saturday to Monday
        let leave = create_application("2026-04-04", "2026-04-06", false);
        assert_eq!(leave.days_requested, Decimal::from(3));
        assert_eq!(
            leave.days_within(make_date("2026-04-01"), make_date("2026-04-30"), Weekday::Sun),
            Decimal::from(2)
        );
        assert_eq!(
            leave.days_within(make_date("2026-04-01"), make_date("2026-04-30"), Weekday::Sat),
            Decimal::from(2)
        );
    }

    #[test]
    fn test_half_day_counts_half() {
        let leave = create_application("2026-03-10", "2026-03-10", true);
        assert_eq!(
            leave.days_within(make_date("2026-03-01"), make_date("2026-03-31"), Weekday::Sun),
            Decimal::new(5, 1)
        );

        let on_rest_day = create_application("2026-03-08", "2026-03-08", true);
        assert_eq!(
            on_rest_day.days_within(make_date("2026-03-01"), make_date("2026-03-31"), Weekday::Sun),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_balance_year_uses_start_date() {
        let leave = create_application("2026-12-30", "2027-01-02", false);
        assert_eq!(leave.balance_year(), 2026);
    }

    #[test]
    fn test_status_from_str_is_case_insensitive() {
        assert_eq!("Pending".parse::<LeaveStatus>().unwrap(), LeaveStatus::Pending);
        assert_eq!(
            "CANCELLED".parse::<LeaveStatus>().unwrap(),
            LeaveStatus::Cancelled
        );
        assert!("archived".parse::<LeaveStatus>().is_err());
    }
}
