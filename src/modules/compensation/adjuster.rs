use payroll_db::{DbError, Executor, SqlValue, Store};
use rust_decimal::Decimal;

use super::directory::fetch_salary;
use super::error::CompensationError;
use super::models::{to_currency, OperationOutcome};

const UPDATE_SALARY: &str = "UPDATE employees SET salary = ?1 WHERE employee_id = ?2";

/// Applies a percentage change to one employee's salary.
///
/// The read, the negativity check, and the write run in a single store
/// transaction. An [`OperationOutcome::UnknownFailure`] means the update did
/// not land on exactly one row; retry the whole call, not just the write.
pub struct SalaryAdjuster<S> {
    store: S,
}

impl<S: Store> SalaryAdjuster<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Raise (or, with a negative percentage, cut) a salary.
    ///
    /// Only store failures and arithmetic overflow are returned as `Err`.
    pub fn apply(
        &self,
        employee_id: i64,
        percentage_increase: Decimal,
    ) -> Result<OperationOutcome, CompensationError> {
        let outcome = self
            .store
            .transaction(|tx| adjust(tx, employee_id, percentage_increase))?;
        let outcome = outcome.ok_or(CompensationError::Overflow {
            employee_id,
            percentage: percentage_increase,
        })?;

        match &outcome {
            OperationOutcome::Success { new_salary, .. } => {
                tracing::info!(employee_id, %percentage_increase, %new_salary, "salary updated");
            }
            OperationOutcome::NotFound { .. } => {
                tracing::info!(employee_id, "salary adjustment skipped: employee not found");
            }
            OperationOutcome::WouldBeNegative {
                current_salary,
                rejected_salary,
                ..
            } => {
                tracing::info!(
                    employee_id,
                    %percentage_increase,
                    %current_salary,
                    %rejected_salary,
                    "salary adjustment rejected: result would be negative"
                );
            }
            OperationOutcome::UnknownFailure { rows_affected, .. } => {
                tracing::warn!(employee_id, rows_affected, "salary update affected an unexpected number of rows");
            }
        }

        Ok(outcome)
    }
}

/// `None` signals overflow; the transaction still commits since nothing
/// has been written at that point.
fn adjust(
    tx: &dyn Executor,
    employee_id: i64,
    percentage_increase: Decimal,
) -> Result<Option<OperationOutcome>, DbError> {
    let Some(current_salary) = fetch_salary(tx, employee_id)? else {
        return Ok(Some(OperationOutcome::NotFound { employee_id }));
    };

    let Some(new_salary) = adjusted_salary(current_salary, percentage_increase) else {
        return Ok(None);
    };

    if new_salary < Decimal::ZERO {
        return Ok(Some(OperationOutcome::WouldBeNegative {
            employee_id,
            current_salary,
            rejected_salary: new_salary,
        }));
    }

    let rows_affected = tx.execute(
        UPDATE_SALARY,
        &[
            SqlValue::Decimal(new_salary),
            SqlValue::Integer(employee_id),
        ],
    )?;

    Ok(Some(if rows_affected == 1 {
        OperationOutcome::Success {
            employee_id,
            new_salary,
        }
    } else {
        OperationOutcome::UnknownFailure {
            employee_id,
            rows_affected,
        }
    }))
}

/// `salary * (1 + percentage / 100)` at stored precision.
pub fn adjusted_salary(salary: Decimal, percentage_increase: Decimal) -> Option<Decimal> {
    let factor = percentage_increase
        .checked_div(Decimal::ONE_HUNDRED)?
        .checked_add(Decimal::ONE)?;
    salary.checked_mul(factor).map(to_currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::compensation::testing::{d, seeded_store, stored_salary};
    use crate::modules::compensation::models::OutcomeKind;
    use payroll_db::{Row, SqliteStore};
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn raise_is_applied_and_reported() {
        let store = seeded_store();
        let outcome = SalaryAdjuster::new(store.clone())
            .apply(1, d("10.00"))
            .unwrap();

        assert_eq!(
            outcome,
            OperationOutcome::Success {
                employee_id: 1,
                new_salary: d("82500.00"),
            }
        );
        assert_eq!(
            outcome.message(),
            "Success: Salary for Employee ID 1 updated to 82500.00."
        );
        assert_eq!(stored_salary(&store, 1), "82500.00");
    }

    #[test]
    fn cut_below_zero_is_rejected_without_writing() {
        let store = seeded_store();
        let outcome = SalaryAdjuster::new(store.clone())
            .apply(2, d("-150.00"))
            .unwrap();

        assert_eq!(outcome.kind(), OutcomeKind::WouldBeNegative);
        assert_eq!(
            outcome.message(),
            "Error: Calculated new salary would be negative. Update aborted."
        );
        assert_eq!(outcome.new_salary(), None);
        assert_eq!(stored_salary(&store, 2), "85000.00");
    }

    #[test]
    fn unknown_employee_is_not_found() {
        let store = seeded_store();
        let outcome = SalaryAdjuster::new(store.clone())
            .apply(999, d("5.00"))
            .unwrap();

        assert_eq!(outcome, OperationOutcome::NotFound { employee_id: 999 });
        assert!(outcome.message().contains("999"));
        assert_eq!(stored_salary(&store, 1), "75000.00");
        assert_eq!(stored_salary(&store, 2), "85000.00");
        assert_eq!(stored_salary(&store, 3), "63000.00");
    }

    #[test]
    fn full_cut_to_zero_is_allowed() {
        let store = seeded_store();
        let outcome = SalaryAdjuster::new(store.clone())
            .apply(3, d("-100"))
            .unwrap();

        assert_eq!(outcome.new_salary(), Some(d("0.00")));
        assert_eq!(stored_salary(&store, 3), "0.00");
    }

    #[rstest]
    #[case("75000.00", "10.00", Some("82500.00"))]
    #[case("75000.00", "0", Some("75000.00"))]
    #[case("85000.00", "-150.00", Some("-42500.00"))]
    #[case("63000.00", "3.333", Some("65099.79"))]
    #[case("0.01", "50", Some("0.02"))]
    #[case("79228162514264337593543950335", "100", None)]
    fn adjusted_salary_cases(
        #[case] salary: &str,
        #[case] percentage: &str,
        #[case] expected: Option<&str>,
    ) {
        let result = adjusted_salary(d(salary), d(percentage));
        assert_eq!(result.map(|v| v.to_string()), expected.map(String::from));
    }

    #[test]
    fn overflow_is_an_error_and_writes_nothing() {
        let store = seeded_store();
        let err = SalaryAdjuster::new(store.clone())
            .apply(1, Decimal::MAX)
            .unwrap_err();

        assert!(matches!(err, CompensationError::Overflow { employee_id: 1, .. }));
        assert_eq!(stored_salary(&store, 1), "75000.00");
    }

    /// Store whose updates report a fixed row count, to exercise the
    /// affected-row check.
    struct SkewedStore {
        inner: SqliteStore,
        reported_rows: usize,
        updates: AtomicUsize,
    }

    impl Executor for SkewedStore {
        fn query(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<Row>, DbError> {
            self.inner.query(statement, params)
        }

        fn execute(&self, _statement: &str, _params: &[SqlValue]) -> Result<usize, DbError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            Ok(self.reported_rows)
        }
    }

    impl Store for SkewedStore {
        fn transaction<T, F>(&self, work: F) -> Result<T, DbError>
        where
            F: FnOnce(&dyn Executor) -> Result<T, DbError>,
        {
            work(self)
        }
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    fn unexpected_row_count_is_unknown_failure(#[case] reported_rows: usize) {
        let store = SkewedStore {
            inner: seeded_store(),
            reported_rows,
            updates: AtomicUsize::new(0),
        };
        let adjuster = SalaryAdjuster::new(store);

        let outcome = adjuster.apply(1, d("10.00")).unwrap();

        assert_eq!(
            outcome,
            OperationOutcome::UnknownFailure {
                employee_id: 1,
                rows_affected: reported_rows,
            }
        );
        assert_eq!(
            outcome.message(),
            "Error: Salary update failed for an unknown reason."
        );
        assert_eq!(adjuster.store.updates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rejected_adjustments_never_issue_a_write() {
        let store = SkewedStore {
            inner: seeded_store(),
            reported_rows: 1,
            updates: AtomicUsize::new(0),
        };
        let adjuster = SalaryAdjuster::new(store);

        adjuster.apply(2, d("-150.00")).unwrap();
        adjuster.apply(999, d("5.00")).unwrap();

        assert_eq!(adjuster.store.updates.load(Ordering::SeqCst), 0);
    }
}
