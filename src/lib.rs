//! Leave and Payroll Accounting Engine
//!
//! This crate tracks leave applications through their approval lifecycle,
//! keeps a per-employee yearly balance ledger, and computes monthly payroll
//! from base salary, attendance and approved leave, with an audit trace for
//! every payroll record.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod leave;
pub mod models;
pub mod payroll;
pub mod store;
