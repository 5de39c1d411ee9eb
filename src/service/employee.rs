use sqlx::SqlitePool;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::model::employee::Employee;

pub async fn list_employees(pool: &SqlitePool) -> AppResult<Vec<Employee>> {
    let employees = sqlx::query_as::<_, Employee>("SELECT id, full_name FROM employees ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(employees)
}

pub async fn find_employee(pool: &SqlitePool, id: i64) -> AppResult<Option<Employee>> {
    let employee =
        sqlx::query_as::<_, Employee>("SELECT id, full_name FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(employee)
}

pub async fn create_employee(pool: &SqlitePool, full_name: &str) -> AppResult<Employee> {
    let full_name = full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::validation("Il nome non può essere vuoto."));
    }

    let id = sqlx::query("INSERT INTO employees (full_name) VALUES (?)")
        .bind(full_name)
        .execute(pool)
        .await?
        .last_insert_rowid();

    info!(employee_id = id, "Employee created");
    Ok(Employee {
        id,
        full_name: full_name.to_string(),
    })
}

/// Removes the employee together with all of their attendance records.
pub async fn delete_employee(pool: &SqlitePool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Utente non trovato."));
    }

    info!(employee_id = id, "Employee deleted");
    Ok(())
}

/// Inserts `names` only when no employee exists yet. Returns how many were added.
pub async fn seed_employees(pool: &SqlitePool, names: &[&str]) -> AppResult<usize> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for name in names {
        sqlx::query("INSERT INTO employees (full_name) VALUES (?)")
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    info!(count = names.len(), "Seeded default employees");
    Ok(names.len())
}
