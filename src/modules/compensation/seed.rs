//! Sample departments and employees for local environments.

use payroll_db::{DbError, SqlValue, Store};

const DEPARTMENTS: &[(i64, &str)] = &[
    (1, "Engineering"),
    (2, "Sales"),
    (3, "Human Resources"),
];

/// `(id, first name, last name, salary, department)`
const EMPLOYEES: &[(i64, &str, &str, &str, i64)] = &[
    (1, "John", "Doe", "75000.00", 1),
    (2, "Jane", "Smith", "85000.00", 2),
    (3, "Emily", "Johnson", "63000.00", 3),
];

/// Insert the sample rows when the employees table is empty.
///
/// Returns the number of employees inserted; zero when data already exists.
pub fn seed_sample_data<S: Store>(store: &S) -> Result<usize, DbError> {
    store.transaction(|tx| {
        let existing = tx.query("SELECT 1 FROM employees LIMIT 1", &[])?;
        if !existing.is_empty() {
            return Ok(0);
        }

        for (id, name) in DEPARTMENTS {
            tx.execute(
                "INSERT OR IGNORE INTO departments (department_id, department_name) VALUES (?1, ?2)",
                &[SqlValue::Integer(*id), SqlValue::from(*name)],
            )?;
        }

        for (id, first_name, last_name, salary, department_id) in EMPLOYEES {
            tx.execute(
                "INSERT INTO employees (employee_id, first_name, last_name, salary, department_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    SqlValue::Integer(*id),
                    SqlValue::from(*first_name),
                    SqlValue::from(*last_name),
                    SqlValue::from(*salary),
                    SqlValue::Integer(*department_id),
                ],
            )?;
        }

        Ok(EMPLOYEES.len())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::compensation::testing::migrated_store;
    use payroll_db::Executor;

    #[test]
    fn seeding_is_idempotent() {
        let store = migrated_store();

        assert_eq!(seed_sample_data(&store).unwrap(), 3);
        assert_eq!(seed_sample_data(&store).unwrap(), 0);

        let rows = store.query("SELECT employee_id FROM employees", &[]).unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn employees_reference_existing_departments() {
        let store = migrated_store();
        seed_sample_data(&store).unwrap();

        let orphans = store
            .query(
                "SELECT e.employee_id FROM employees e \
                 LEFT JOIN departments d ON d.department_id = e.department_id \
                 WHERE d.department_id IS NULL",
                &[],
            )
            .unwrap();
        assert!(orphans.is_empty());
    }
}
