//! Configuration loading and management for the leave and payroll engine.
//!
//! This module provides functionality to load the leave catalog, employee
//! category rules and payroll rules from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use leave_payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Rest day: {}", config.payroll().rest_day);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AllowanceRules, CategoriesConfig, CategoryRule, EngineConfig, LeaveCatalogConfig,
    PayrollConfig, PayrollRules, ProfessionalTaxRules, RetirementFundRules,
};
