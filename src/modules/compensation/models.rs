use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Fractional digits kept for every stored or reported amount.
pub const CURRENCY_SCALE: u32 = 2;

/// Round to the stored precision, half away from zero, and pad to exactly
/// two fractional digits so `82500` renders as `82500.00`.
pub fn to_currency(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(CURRENCY_SCALE);
    rounded
}

/// Employee as listed in the directory, joined with its department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub salary: Decimal,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
}

/// Discriminant of [`OperationOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    NotFound,
    WouldBeNegative,
    Success,
    UnknownFailure,
}

/// Result of a salary adjustment.
///
/// Every variant is an expected outcome that callers branch on; none of
/// them is an error. The message for each variant is fixed and callers
/// display it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// No employee row matched the identifier. Nothing was written.
    NotFound { employee_id: i64 },
    /// The computed salary was below zero. Nothing was written.
    WouldBeNegative {
        employee_id: i64,
        current_salary: Decimal,
        rejected_salary: Decimal,
    },
    /// Exactly one row was updated to `new_salary`.
    Success { employee_id: i64, new_salary: Decimal },
    /// The update touched zero or several rows. Retry the whole adjustment.
    UnknownFailure { employee_id: i64, rows_affected: usize },
}

impl OperationOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            OperationOutcome::NotFound { .. } => OutcomeKind::NotFound,
            OperationOutcome::WouldBeNegative { .. } => OutcomeKind::WouldBeNegative,
            OperationOutcome::Success { .. } => OutcomeKind::Success,
            OperationOutcome::UnknownFailure { .. } => OutcomeKind::UnknownFailure,
        }
    }

    pub fn employee_id(&self) -> i64 {
        match self {
            OperationOutcome::NotFound { employee_id }
            | OperationOutcome::WouldBeNegative { employee_id, .. }
            | OperationOutcome::Success { employee_id, .. }
            | OperationOutcome::UnknownFailure { employee_id, .. } => *employee_id,
        }
    }

    /// The salary now stored, only on success.
    pub fn new_salary(&self) -> Option<Decimal> {
        match self {
            OperationOutcome::Success { new_salary, .. } => Some(*new_salary),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind() == OutcomeKind::Success
    }

    pub fn message(&self) -> String {
        match self {
            OperationOutcome::NotFound { employee_id } => {
                format!("Error: Employee with ID {employee_id} not found.")
            }
            OperationOutcome::WouldBeNegative { .. } => {
                "Error: Calculated new salary would be negative. Update aborted.".to_string()
            }
            OperationOutcome::Success {
                employee_id,
                new_salary,
            } => format!("Success: Salary for Employee ID {employee_id} updated to {new_salary}."),
            OperationOutcome::UnknownFailure { .. } => {
                "Error: Salary update failed for an unknown reason.".to_string()
            }
        }
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl Serialize for OperationOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("OperationOutcome", 4)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("employee_id", &self.employee_id())?;
        state.serialize_field("message", &self.message())?;
        state.serialize_field("new_salary", &self.new_salary())?;
        state.end()
    }
}

/// One row of a bulk bonus report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusLine {
    pub employee_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub salary: Decimal,
    pub rating: i64,
    pub bonus: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[rstest]
    #[case("82500", "82500.00")]
    #[case("82500.000", "82500.00")]
    #[case("0.005", "0.01")]
    #[case("-0.005", "-0.01")]
    #[case("-0.004", "0.00")]
    #[case("12374.995", "12375.00")]
    fn currency_rounding(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_currency(d(input)).to_string(), expected);
    }

    #[test]
    fn messages_match_the_fixed_wording() {
        assert_eq!(
            OperationOutcome::NotFound { employee_id: 999 }.message(),
            "Error: Employee with ID 999 not found."
        );
        assert_eq!(
            OperationOutcome::Success {
                employee_id: 1,
                new_salary: d("82500.00"),
            }
            .to_string(),
            "Success: Salary for Employee ID 1 updated to 82500.00."
        );
        assert_eq!(
            OperationOutcome::UnknownFailure {
                employee_id: 1,
                rows_affected: 0,
            }
            .message(),
            "Error: Salary update failed for an unknown reason."
        );
    }

    #[test]
    fn outcome_serializes_kind_message_and_salary() {
        let outcome = OperationOutcome::WouldBeNegative {
            employee_id: 2,
            current_salary: d("85000.00"),
            rejected_salary: d("-42500.00"),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "would_be_negative");
        assert_eq!(json["employee_id"], 2);
        assert_eq!(
            json["message"],
            "Error: Calculated new salary would be negative. Update aborted."
        );
        assert!(json["new_salary"].is_null());
        assert!(!outcome.is_success());
    }
}
