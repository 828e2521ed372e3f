//! Reads over the employee directory shared by both operations.

use payroll_db::{DbError, Executor, Row, SqlValue};
use rust_decimal::Decimal;

use super::models::Employee;

const SALARY_BY_ID: &str = "SELECT salary FROM employees WHERE employee_id = ?1";

const EMPLOYEES_WITH_DEPARTMENT: &str = "SELECT e.employee_id, e.first_name, e.last_name, \
            e.salary, e.department_id, d.department_name \
     FROM employees e \
     LEFT JOIN departments d ON d.department_id = e.department_id \
     ORDER BY e.employee_id";

/// Current salary of one employee, `None` when no row matches.
pub fn fetch_salary<E>(executor: &E, employee_id: i64) -> Result<Option<Decimal>, DbError>
where
    E: Executor + ?Sized,
{
    let rows = executor.query(SALARY_BY_ID, &[SqlValue::Integer(employee_id)])?;
    rows.first().map(|row| row.get_decimal("salary")).transpose()
}

/// Every employee with its department name, ordered by identifier.
pub fn list_employees<E>(executor: &E) -> Result<Vec<Employee>, DbError>
where
    E: Executor + ?Sized,
{
    executor
        .query(EMPLOYEES_WITH_DEPARTMENT, &[])?
        .iter()
        .map(employee_from_row)
        .collect()
}

fn employee_from_row(row: &Row) -> Result<Employee, DbError> {
    Ok(Employee {
        employee_id: row.get_i64("employee_id")?,
        first_name: row.get_text("first_name")?,
        last_name: row.get_text("last_name")?,
        salary: row.get_decimal("salary")?,
        department_id: row.get_opt_i64("department_id")?,
        department_name: row.get_opt_text("department_name")?,
    })
}
