use payroll_db::{DbError, Executor};
use rust_decimal::Decimal;

use super::directory::{fetch_salary, list_employees};
use super::models::{to_currency, BonusLine};

/// Bonus rate for a performance rating. Ratings outside 2..=4 earn nothing.
pub fn bonus_rate(performance_rating: i64) -> Decimal {
    match performance_rating {
        4 => Decimal::new(15, 2),
        3 => Decimal::new(10, 2),
        2 => Decimal::new(5, 2),
        _ => Decimal::ZERO,
    }
}

/// Bonus for a known salary, at stored precision.
pub fn bonus_for(salary: Decimal, performance_rating: i64) -> Decimal {
    to_currency(salary * bonus_rate(performance_rating))
}

/// Read-only, rating-tiered bonus calculation.
///
/// Missing employees earn `0.00` rather than an error.
pub struct BonusCalculator<E> {
    executor: E,
}

impl<E: Executor> BonusCalculator<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn compute(&self, employee_id: i64, performance_rating: i64) -> Result<Decimal, DbError> {
        let Some(salary) = fetch_salary(&self.executor, employee_id)? else {
            tracing::debug!(employee_id, "no salary on record; bonus defaults to zero");
            return Ok(to_currency(Decimal::ZERO));
        };

        let bonus = bonus_for(salary, performance_rating);
        tracing::debug!(
            employee_id,
            performance_rating,
            rate = %bonus_rate(performance_rating),
            %bonus,
            "bonus computed"
        );
        Ok(bonus)
    }

    /// Apply one rating across the whole directory in a single read.
    pub fn report(&self, performance_rating: i64) -> Result<Vec<BonusLine>, DbError> {
        let lines: Vec<BonusLine> = list_employees(&self.executor)?
            .into_iter()
            .map(|employee| BonusLine {
                bonus: bonus_for(employee.salary, performance_rating),
                employee_id: employee.employee_id,
                first_name: employee.first_name,
                last_name: employee.last_name,
                salary: employee.salary,
                rating: performance_rating,
            })
            .collect();

        tracing::debug!(performance_rating, employees = lines.len(), "bonus report computed");
        Ok(lines)
    }
}
