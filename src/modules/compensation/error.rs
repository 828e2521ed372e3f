use payroll_db::DbError;
use payroll_http::error::AppError;
use thiserror::Error;

/// Failures of the compensation operations that are not business outcomes.
#[derive(Debug, Error)]
pub enum CompensationError {
    #[error(transparent)]
    Store(#[from] DbError),

    /// The adjusted salary does not fit the fixed-point range.
    #[error("salary adjustment of {percentage}% for employee {employee_id} overflows")]
    Overflow {
        employee_id: i64,
        percentage: rust_decimal::Decimal,
    },
}

impl From<CompensationError> for AppError {
    fn from(err: CompensationError) -> Self {
        match err {
            CompensationError::Overflow { .. } => {
                AppError::validation(Vec::new(), err.to_string())
            }
            CompensationError::Store(_) => AppError::Internal(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rust_decimal::Decimal;

    #[test]
    fn store_failures_are_internal_errors() {
        let error = AppError::from(CompensationError::Store(DbError::Poisoned));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(error, AppError::Internal(_)));
    }

    #[test]
    fn overflow_is_a_validation_error() {
        let error = AppError::from(CompensationError::Overflow {
            employee_id: 7,
            percentage: Decimal::MAX,
        });
        assert_eq!(error.status(), StatusCode::UNPROCESSABLE_ENTITY);
        match error {
            AppError::Validation { code, message, .. } => {
                assert_eq!(code, "validation_error");
                assert!(message.contains("employee 7"));
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }
}
