//! Employee model and related types.
//!
//! Employees are owned by the directory collaborator; the engine only reads
//! them. The category code decides leave eligibility and default entitlements,
//! the role decides who may backdate a leave request.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The largest monthly base salary the engine accepts (one billion).
pub const MAX_BASE_SALARY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// The employee category code.
///
/// A closed set: every category has one row in the categories table of the
/// engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmployeeCategory {
    /// Salaried staff, full leave entitlement.
    #[serde(rename = "S001")]
    Staff,
    /// Workers, reduced leave entitlement.
    #[serde(rename = "W001")]
    Worker,
    /// Management, no paid leave.
    #[serde(rename = "M001")]
    Management,
    /// Trainees, no paid leave.
    #[serde(rename = "T001")]
    Trainee,
}

impl EmployeeCategory {
    /// All categories, in code order.
    pub const ALL: [EmployeeCategory; 4] = [
        EmployeeCategory::Staff,
        EmployeeCategory::Worker,
        EmployeeCategory::Management,
        EmployeeCategory::Trainee,
    ];

    /// Returns the category code (e.g. `"S001"`).
    pub fn code(&self) -> &'static str {
        match self {
            EmployeeCategory::Staff => "S001",
            EmployeeCategory::Worker => "W001",
            EmployeeCategory::Management => "M001",
            EmployeeCategory::Trainee => "T001",
        }
    }
}

impl fmt::Display for EmployeeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for EmployeeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmployeeCategory::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid employee category: {}", s))
    }
}

/// Whether the employee is currently employed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Active and on the payroll.
    Active,
    /// Blocked, resigned or otherwise excluded from payroll runs.
    Blocked,
}

/// The role an actor holds in the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// A regular employee.
    Employee,
    /// Human resources staff.
    #[serde(rename = "HR")]
    Hr,
    /// System administrator.
    Admin,
    /// Managing director.
    #[serde(rename = "MD")]
    Md,
}

/// Represents an employee as read from the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Full display name.
    pub name: String,
    /// The category code deciding leave eligibility.
    pub category: EmployeeCategory,
    /// Base monthly salary.
    pub base_salary: Decimal,
    /// Active or blocked.
    pub status: EmployeeStatus,
    /// The employee's back-office role.
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Employee
}

impl Employee {
    /// Returns true if the employee is on the active payroll.
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// Checks that the base salary is positive and at most
    /// [`MAX_BASE_SALARY`].
    pub fn validate_base_salary(&self) -> EngineResult<()> {
        if self.base_salary <= Decimal::ZERO || self.base_salary > MAX_BASE_SALARY {
            return Err(EngineError::invalid_input(
                "base_salary",
                format!(
                    "employee '{}' has base salary {}; expected more than 0 and at most {}",
                    self.id, self.base_salary, MAX_BASE_SALARY
                ),
            ));
        }
        Ok(())
    }

    /// Returns the actor identity of this employee.
    pub fn as_actor(&self) -> Actor {
        Actor {
            employee_id: self.id.clone(),
            role: self.role,
        }
    }
}

/// The identity on whose behalf an operation runs.
///
/// Credential checks happen before the engine is called; the engine trusts
/// the actor it is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting employee's identifier.
    pub employee_id: String,
    /// The acting employee's role.
    pub role: Role,
}

impl Actor {
    /// Creates a new actor.
    pub fn new(employee_id: impl Into<String>, role: Role) -> Self {
        Self {
            employee_id: employee_id.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_employee(category: EmployeeCategory) -> Employee {
        Employee {
            id: "E001".to_string(),
            name: "Asha Rao".to_string(),
            category,
            base_salary: Decimal::new(30000, 0),
            status: EmployeeStatus::Active,
            role: Role::Employee,
        }
    }

    #[test]
    fn test_base_salary_must_be_positive_and_bounded() {
        let mut employee = create_test_employee(EmployeeCategory::Staff);
        assert!(employee.validate_base_salary().is_ok());

        employee.base_salary = MAX_BASE_SALARY;
        assert!(employee.validate_base_salary().is_ok());

        for salary in [Decimal::ZERO, Decimal::new(-1, 0), Decimal::MAX - Decimal::new(100, 0)] {
            employee.base_salary = salary;
            match employee.validate_base_salary() {
                Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "base_salary"),
                other => panic!("Expected InvalidInput for {}, got {:?}", salary, other),
            }
        }
    }

    #[test]
    fn test_deserialize_staff_employee() {
        let json = r#"{
            "id": "E001",
            "name": "Asha Rao",
            "category": "S001",
            "base_salary": "30000",
            "status": "active"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.category, EmployeeCategory::Staff);
        assert_eq!(employee.base_salary, Decimal::new(30000, 0));
        assert_eq!(employee.role, Role::Employee);
        assert!(employee.is_active());
    }

    #[test]
    fn test_deserialize_unknown_category_fails() {
        let json = r#"{
            "id": "E002",
            "name": "Unknown",
            "category": "X999",
            "base_salary": "1000",
            "status": "active"
        }"#;

        assert!(serde_json::from_str::<Employee>(json).is_err());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "w001".parse::<EmployeeCategory>().unwrap(),
            EmployeeCategory::Worker
        );
        assert!("Z001".parse::<EmployeeCategory>().is_err());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Hr).unwrap(), "\"HR\"");
        assert_eq!(serde_json::to_string(&Role::Md).unwrap(), "\"MD\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"Admin\"");
    }

    #[test]
    fn test_blocked_employee_is_not_active() {
        let mut employee = create_test_employee(EmployeeCategory::Worker);
        employee.status = EmployeeStatus::Blocked;
        assert!(!employee.is_active());
    }

    #[test]
    fn test_as_actor_carries_role() {
        let mut employee = create_test_employee(EmployeeCategory::Staff);
        employee.role = Role::Admin;
        let actor = employee.as_actor();
        assert_eq!(actor.employee_id, "E001");
        assert_eq!(actor.role, Role::Admin);
    }
}
