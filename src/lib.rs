//! Payroll application library
//!
//! Salary adjustments and rating-tiered bonuses over an SQLite employee
//! directory, plus the bootstrap shared by the server and CLI binaries.

pub mod app;
pub mod modules;

pub use modules::compensation::{
    BonusCalculator, BonusLine, CompensationError, Employee, OperationOutcome, OutcomeKind,
    SalaryAdjuster,
};
