//! Configuration types for leave and payroll rules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, and the aggregated
//! [`EngineConfig`] the engine reads at runtime.

use std::collections::{BTreeMap, HashMap};

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    BalanceCategory, EmployeeCategory, Entitlement, LeaveTypeCode, LeaveTypeDefinition, Role,
};

/// Leave catalog file structure (`leave_types.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveCatalogConfig {
    /// Roles allowed to submit leave starting in the past.
    pub backdate_roles: Vec<Role>,
    /// One row per leave type.
    pub leave_types: Vec<LeaveTypeDefinition>,
}

/// Leave rules for one employee category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryRule {
    /// Human-readable name of the category.
    pub name: String,
    /// Whether employees of this category may apply for leave.
    pub leave_eligible: bool,
    /// Default yearly totals used when a balance row is first created.
    pub entitlement: Entitlement,
}

/// Categories file structure (`categories.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesConfig {
    /// Map of category code to its leave rules.
    pub categories: HashMap<EmployeeCategory, CategoryRule>,
}

/// Fixed monthly allowances.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AllowanceRules {
    /// Housing allowance as a fraction of base salary.
    pub housing_rate: Decimal,
    /// Flat conveyance allowance.
    pub conveyance: Decimal,
    /// Flat medical allowance.
    pub medical: Decimal,
}

/// Retirement fund contribution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetirementFundRules {
    /// Contribution rate.
    pub rate: Decimal,
    /// Salary ceiling the rate applies to.
    pub salary_ceiling: Decimal,
}

/// Flat professional tax.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfessionalTaxRules {
    /// Base salary above which the tax applies.
    pub threshold: Decimal,
    /// Monthly amount.
    pub amount: Decimal,
}

/// Payroll calculation rules.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayrollRules {
    /// The weekly rest day excluded from working days.
    pub rest_day: Weekday,
    /// Hours in a standard working day.
    pub standard_hours_per_day: Decimal,
    /// Multiplier applied to the hourly rate for overtime.
    pub overtime_multiplier: Decimal,
    /// Fixed allowances.
    pub allowances: AllowanceRules,
    /// Retirement fund contribution.
    pub retirement_fund: RetirementFundRules,
    /// Professional tax.
    pub professional_tax: ProfessionalTaxRules,
}

/// Payroll file structure (`payroll.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollConfig {
    /// Payroll rules.
    pub payroll: PayrollRules,
}

/// The complete engine configuration.
///
/// Every [`LeaveTypeCode`] has a catalog row and every
/// [`EmployeeCategory`] has a rule; construction fails otherwise.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    leave_types: BTreeMap<LeaveTypeCode, LeaveTypeDefinition>,
    categories: HashMap<EmployeeCategory, CategoryRule>,
    backdate_roles: Vec<Role>,
    payroll: PayrollRules,
}

impl EngineConfig {
    /// Creates a configuration from its component parts.
    ///
    /// Returns a description of the first completeness problem found.
    pub fn new(
        catalog: LeaveCatalogConfig,
        categories: CategoriesConfig,
        payroll: PayrollConfig,
    ) -> Result<Self, String> {
        let mut leave_types = BTreeMap::new();
        for definition in catalog.leave_types {
            if leave_types.insert(definition.code, definition).is_some() {
                return Err("duplicate leave type in catalog".to_string());
            }
        }
        if let Some(missing) = LeaveTypeCode::ALL
            .iter()
            .find(|code| !leave_types.contains_key(code))
        {
            return Err(format!("leave type {} is not defined", missing));
        }
        if let Some(missing) = EmployeeCategory::ALL
            .iter()
            .find(|c| !categories.categories.contains_key(c))
        {
            return Err(format!("category {} is not defined", missing));
        }

        // Each balance column is debited by exactly one leave type.
        for category in BalanceCategory::ALL {
            let debtors = leave_types
                .values()
                .filter(|d| d.balance_category == Some(category))
                .count();
            if debtors > 1 {
                return Err(format!(
                    "balance category {} is debited by {} leave types",
                    category, debtors
                ));
            }
        }

        Ok(Self {
            leave_types,
            categories: categories.categories,
            backdate_roles: catalog.backdate_roles,
            payroll: payroll.payroll,
        })
    }

    /// The built-in defaults, identical to `config/default`.
    pub fn builtin() -> Self {
        let definition = |code, name: &str, year: i64, month: i64, notice, category, paid| {
            LeaveTypeDefinition {
                code,
                name: name.to_string(),
                max_per_year: Decimal::from(year),
                max_per_month: Decimal::from(month),
                advance_notice_days: notice,
                balance_category: category,
                paid,
            }
        };
        let leave_types = [
            definition(
                LeaveTypeCode::Casual,
                "Casual Leave",
                12,
                12,
                1,
                Some(BalanceCategory::Casual),
                true,
            ),
            definition(
                LeaveTypeCode::Sick,
                "Sick Leave",
                12,
                12,
                0,
                Some(BalanceCategory::Sick),
                true,
            ),
            definition(
                LeaveTypeCode::Earned,
                "Earned Leave",
                12,
                12,
                7,
                Some(BalanceCategory::Earned),
                true,
            ),
            definition(LeaveTypeCode::HalfDay, "Half Day Leave", 24, 12, 0, None, true),
            definition(LeaveTypeCode::LossOfPay, "Loss of Pay", 999, 30, 0, None, false),
        ]
        .into_iter()
        .map(|d| (d.code, d))
        .collect();

        let rule = |name: &str, eligible, casual: i64, sick: i64, earned: i64| CategoryRule {
            name: name.to_string(),
            leave_eligible: eligible,
            entitlement: Entitlement {
                casual: Decimal::from(casual),
                sick: Decimal::from(sick),
                earned: Decimal::from(earned),
            },
        };
        let categories = HashMap::from([
            (EmployeeCategory::Staff, rule("Staff", true, 12, 12, 15)),
            (EmployeeCategory::Worker, rule("Worker", true, 6, 6, 10)),
            (EmployeeCategory::Management, rule("Management", false, 0, 0, 0)),
            (EmployeeCategory::Trainee, rule("Trainee", false, 0, 0, 0)),
        ]);

        Self {
            leave_types,
            categories,
            backdate_roles: vec![Role::Admin, Role::Md],
            payroll: PayrollRules {
                rest_day: Weekday::Sun,
                standard_hours_per_day: Decimal::from(8),
                overtime_multiplier: Decimal::new(15, 1),
                allowances: AllowanceRules {
                    housing_rate: Decimal::new(10, 2),
                    conveyance: Decimal::from(1600),
                    medical: Decimal::from(1250),
                },
                retirement_fund: RetirementFundRules {
                    rate: Decimal::new(12, 2),
                    salary_ceiling: Decimal::from(15000),
                },
                professional_tax: ProfessionalTaxRules {
                    threshold: Decimal::from(10000),
                    amount: Decimal::from(200),
                },
            },
        }
    }

    /// Returns the catalog row for a leave type.
    pub fn leave_type(&self, code: LeaveTypeCode) -> EngineResult<&LeaveTypeDefinition> {
        self.leave_types
            .get(&code)
            .ok_or_else(|| EngineError::invalid_input("leave_type", format!("unknown leave type {}", code)))
    }

    /// Returns every catalog row, in code order.
    pub fn leave_types(&self) -> impl Iterator<Item = &LeaveTypeDefinition> {
        self.leave_types.values()
    }

    /// Returns the leave type that debits a balance category, if any.
    pub fn leave_type_for(&self, category: BalanceCategory) -> Option<&LeaveTypeDefinition> {
        self.leave_types
            .values()
            .find(|d| d.balance_category == Some(category))
    }

    /// Returns the rule for an employee category.
    pub fn category(&self, category: EmployeeCategory) -> EngineResult<&CategoryRule> {
        self.categories.get(&category).ok_or_else(|| {
            EngineError::invalid_input("category", format!("unknown category {}", category))
        })
    }

    /// Returns true if the role may submit leave starting in the past.
    pub fn can_backdate(&self, role: Role) -> bool {
        self.backdate_roles.contains(&role)
    }

    /// Returns the payroll rules.
    pub fn payroll(&self) -> &PayrollRules {
        &self.payroll
    }
}
