//! Leave balance ledger models.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EmployeeCategory;

/// A balance-tracked leave category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceCategory {
    /// Casual leave.
    Casual,
    /// Sick leave.
    Sick,
    /// Earned leave.
    Earned,
}

impl BalanceCategory {
    /// All tracked categories, in ledger column order.
    pub const ALL: [BalanceCategory; 3] = [
        BalanceCategory::Casual,
        BalanceCategory::Sick,
        BalanceCategory::Earned,
    ];
}

impl fmt::Display for BalanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BalanceCategory::Casual => "casual",
            BalanceCategory::Sick => "sick",
            BalanceCategory::Earned => "earned",
        };
        f.write_str(s)
    }
}

/// Entitlement and consumption for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// Days granted for the year.
    pub total: Decimal,
    /// Days consumed by approved leave.
    pub used: Decimal,
}

impl BalanceEntry {
    /// Creates an unused entry with the given total.
    pub fn with_total(total: Decimal) -> Self {
        Self {
            total,
            used: Decimal::ZERO,
        }
    }

    /// Days still available.
    pub fn available(&self) -> Decimal {
        self.total - self.used
    }
}

/// Default yearly totals for an employee category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entitlement {
    /// Casual leave days.
    pub casual: Decimal,
    /// Sick leave days.
    pub sick: Decimal,
    /// Earned leave days.
    pub earned: Decimal,
}

/// One ledger row: (employee, year) → per-category totals and used amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// The employee.
    pub employee_id: String,
    /// The calendar year.
    pub year: i32,
    /// Casual leave.
    pub casual: BalanceEntry,
    /// Sick leave.
    pub sick: BalanceEntry,
    /// Earned leave.
    pub earned: BalanceEntry,
    /// Incremented once per committed write. A persisted write is rejected
    /// when the stored row no longer carries the version it was based on.
    pub version: u64,
}

impl LeaveBalance {
    /// Creates a fresh row from an entitlement.
    pub fn new(employee_id: impl Into<String>, year: i32, entitlement: Entitlement) -> Self {
        Self {
            employee_id: employee_id.into(),
            year,
            casual: BalanceEntry::with_total(entitlement.casual),
            sick: BalanceEntry::with_total(entitlement.sick),
            earned: BalanceEntry::with_total(entitlement.earned),
            version: 0,
        }
    }

    /// Returns the entry for a category.
    pub fn entry(&self, category: BalanceCategory) -> &BalanceEntry {
        match category {
            BalanceCategory::Casual => &self.casual,
            BalanceCategory::Sick => &self.sick,
            BalanceCategory::Earned => &self.earned,
        }
    }

    /// Returns the mutable entry for a category.
    pub fn entry_mut(&mut self, category: BalanceCategory) -> &mut BalanceEntry {
        match category {
            BalanceCategory::Casual => &mut self.casual,
            BalanceCategory::Sick => &mut self.sick,
            BalanceCategory::Earned => &mut self.earned,
        }
    }

    /// Days available in a category.
    pub fn available(&self, category: BalanceCategory) -> Decimal {
        self.entry(category).available()
    }
}

/// A category line of a balance query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBalanceView {
    /// The category.
    pub category: BalanceCategory,
    /// The leave type code that debits this category (e.g. "CL").
    pub code: String,
    /// The leave type name.
    pub name: String,
    /// Entitlement.
    pub total: Decimal,
    /// Consumed.
    pub used: Decimal,
    /// `total - used`.
    pub available: Decimal,
}

/// The answer to a balance query.
///
/// Ineligible employees get `eligible: false` and no balance lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceView {
    /// Whether the employee's category has any paid leave.
    pub eligible: bool,
    /// The employee.
    pub employee_id: String,
    /// The employee's category.
    pub category: EmployeeCategory,
    /// The queried year.
    pub year: i32,
    /// One line per tracked category (empty when not eligible).
    pub balances: Vec<CategoryBalanceView>,
}
